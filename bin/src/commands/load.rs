//! Load commands: daily, history and auto.
//!
//! Each command opens the client, validator and store, resolves its range,
//! walks it with the shared coordinator and closes the store.

use crate::config::AppConfig;
use crate::display::{ProgressObserver, run_summary};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use saleflow_lib::prelude::*;
use std::time::Instant;
use tracing::{error, info, warn};

/// Options for a historical import.
#[derive(Debug, Clone, Default)]
pub(crate) struct HistoryOptions {
    pub(crate) start: Option<NaiveDate>,
    pub(crate) end: Option<NaiveDate>,
    pub(crate) min_date: Option<NaiveDate>,
    pub(crate) dry_run: bool,
}

/// Open collaborators for one run.
///
/// Dropping without [`Services::close`] (Ctrl-C drops the running command)
/// still closes the store, with a warning.
struct Services {
    client: SalesClient,
    validator: SalesValidator,
    store: Option<SalesStore>,
}

impl Services {
    fn open(config: &AppConfig) -> Result<Self> {
        let client =
            SalesClient::new(config.client_config()).context("Failed to create HTTP client")?;
        let store = SalesStore::open(&config.db_path)
            .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;

        Ok(Self {
            client,
            validator: SalesValidator::new(),
            store: Some(store),
        })
    }

    fn store(&self) -> Result<&SalesStore> {
        self.store.as_ref().context("Database is already closed")
    }

    async fn run<R: RangeResolver>(
        &self,
        resolver: &R,
        observer: Option<&ProgressObserver>,
    ) -> Result<RangeOutcome> {
        let mut coordinator = PipelineCoordinator::new(&self.client, &self.validator, self.store()?);
        if let Some(observer) = observer {
            coordinator = coordinator.with_observer(observer);
        }
        Ok(coordinator.run(resolver).await?)
    }

    /// Closes the store; a failure is logged, never propagated.
    fn close(mut self) {
        if let Some(store) = self.store.take() {
            close_store(store);
        }
    }
}

impl Drop for Services {
    fn drop(&mut self) {
        if let Some(store) = self.store.take() {
            warn!("load interrupted, closing database");
            close_store(store);
        }
    }
}

fn close_store(store: SalesStore) {
    if let Err(e) = store.close() {
        error!(error = %e, "failed to close database");
    }
}

/// Loads yesterday's sales. Returns true if anything was stored.
pub(crate) async fn daily(config: &AppConfig, quiet: bool) -> Result<bool> {
    let services = Services::open(config)?;
    let outcome = run_daily(&services, quiet).await;
    services.close();
    outcome
}

/// Imports history. Returns true if anything was stored, or for a dry run.
pub(crate) async fn history(config: &AppConfig, options: &HistoryOptions, quiet: bool) -> Result<bool> {
    if options.dry_run {
        return dry_run(config, options, quiet).await;
    }

    let services = Services::open(config)?;
    let outcome = run_history(&services, config, options, quiet).await;
    services.close();
    outcome
}

/// Picks history or daily from the number of stored rows.
pub(crate) async fn auto(config: &AppConfig, quiet: bool) -> Result<bool> {
    let services = Services::open(config)?;

    let total = match services.store()?.total_records() {
        Ok(total) => total,
        Err(e) => {
            services.close();
            return Err(e).context("Failed to count stored records");
        }
    };
    let mode = RunMode::select(total, config.auto_history_threshold);
    info!(
        total,
        threshold = config.auto_history_threshold,
        %mode,
        "auto mode selected"
    );

    let outcome = match mode {
        RunMode::History => {
            run_history(&services, config, &HistoryOptions::default(), quiet).await
        }
        RunMode::Daily => run_daily(&services, quiet).await,
    };
    services.close();
    outcome
}

async fn run_daily(services: &Services, quiet: bool) -> Result<bool> {
    let started = Instant::now();
    let outcome = services.run(&DailyStrategy::new(), None).await?;
    finish(RunMode::Daily, &outcome, started, quiet)
}

async fn run_history(
    services: &Services,
    config: &AppConfig,
    options: &HistoryOptions,
    quiet: bool,
) -> Result<bool> {
    let started = Instant::now();
    let strategy = historical_strategy(&services.client, config, options);
    let observer = ProgressObserver::new(quiet);

    let outcome = services
        .run(&strategy, Some(&observer))
        .await
        .context("Failed to resolve the history range")?;
    finish(RunMode::History, &outcome, started, quiet)
}

async fn dry_run(config: &AppConfig, options: &HistoryOptions, quiet: bool) -> Result<bool> {
    let client =
        SalesClient::new(config.client_config()).context("Failed to create HTTP client")?;
    let plan = historical_strategy(&client, config, options)
        .dry_run()
        .await
        .context("Failed to resolve the history range")?;

    if !quiet {
        println!("Dry run: would load {plan}");
    }
    Ok(true)
}

fn historical_strategy<'a>(
    client: &'a SalesClient,
    config: &AppConfig,
    options: &HistoryOptions,
) -> HistoricalStrategy<'a, SalesClient> {
    HistoricalStrategy::new(client, options.min_date.unwrap_or(config.history_min_date))
        .with_start(options.start)
        .with_end(options.end)
}

fn finish(mode: RunMode, outcome: &RangeOutcome, started: Instant, quiet: bool) -> Result<bool> {
    let elapsed = started.elapsed();
    info!(
        %mode,
        elapsed_secs = elapsed.as_secs_f64(),
        processed = outcome.metrics.processed,
        stored = outcome.metrics.stored,
        errors = outcome.metrics.errors,
        failed_days = outcome.failed_days.len(),
        "load finished"
    );
    if !quiet {
        print!("{}", run_summary(mode, outcome, elapsed));
    }
    Ok(outcome.metrics.stored > 0)
}
