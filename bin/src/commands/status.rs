//! Store status command.

use crate::config::AppConfig;
use anyhow::{Context, Result};
use saleflow_lib::prelude::*;
use std::fmt::Write as _;
use tracing::error;

/// Prints what is stored and what `auto` would do next.
pub(crate) fn status(config: &AppConfig) -> Result<bool> {
    let store = SalesStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    let total = store.total_records();
    if let Err(e) = store.close() {
        error!(error = %e, "failed to close database");
    }
    let total = total.context("Failed to count stored records")?;

    print!("{}", status_report(config, total));
    Ok(true)
}

fn status_report(config: &AppConfig, total: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Database:        {}", config.db_path.display());
    let _ = writeln!(out, "Stored records:  {total}");
    let _ = writeln!(out, "API:             {}", config.api_url);
    let _ = writeln!(out, "History floor:   {}", config.history_min_date);
    let _ = writeln!(
        out,
        "Next auto run:   {} (threshold {})",
        RunMode::select(total, config.auto_history_threshold),
        config.auto_history_threshold
    );
    out
}
