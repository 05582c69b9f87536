//! saleflow CLI - Marketplace sales loader.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

mod commands;
mod config;
mod display;
mod logging;

use commands::load::HistoryOptions;
use config::AppConfig;

/// Exit status after Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "saleflow")]
#[command(about = "Load marketplace sales into a local database", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory containing config.env
    #[arg(short, long, global = true, default_value = "config")]
    config: PathBuf,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (warnings only, no progress or summary)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load yesterday's sales
    Daily,

    /// Import every day from the first available date through yesterday
    History {
        /// Start date (YYYY-MM-DD). Defaults to the first date with data.
        #[arg(short, long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD). Defaults to yesterday.
        #[arg(short, long)]
        end: Option<NaiveDate>,

        /// Earliest date discovery may probe (YYYY-MM-DD). Defaults to HISTORY_MIN_DATE.
        #[arg(long)]
        min_date: Option<NaiveDate>,

        /// Resolve and print the range without loading anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Run history on a near-empty database, daily otherwise (default)
    Auto,

    /// Show stored record count and the next auto mode
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = ?e, "run failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = AppConfig::load(&cli.config)?;
    let log_file = logging::init(&config.log_dir, cli.verbose, cli.quiet)?;
    info!(
        config = %cli.config.display(),
        log_file = %log_file.display(),
        db = %config.db_path.display(),
        "saleflow starting"
    );

    let command = cli.command.unwrap_or(Commands::Auto);
    let quiet = cli.quiet;

    tokio::select! {
        result = dispatch(&config, command, quiet) => {
            let success = result?;
            if !success {
                warn!("no records were stored");
            }
            Ok(if success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, stopping");
            eprintln!("Interrupted");
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
    }
}

async fn dispatch(config: &AppConfig, command: Commands, quiet: bool) -> Result<bool> {
    match command {
        Commands::Daily => commands::load::daily(config, quiet).await,
        Commands::History {
            start,
            end,
            min_date,
            dry_run,
        } => {
            let options = HistoryOptions {
                start,
                end,
                min_date,
                dry_run,
            };
            commands::load::history(config, &options, quiet).await
        }
        Commands::Auto => commands::load::auto(config, quiet).await,
        Commands::Status => commands::status::status(config),
    }
}
