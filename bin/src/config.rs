//! Runtime configuration loaded from `<config-dir>/config.env`.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use saleflow_lib::ClientConfig;
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Name of the configuration file inside the config directory.
pub(crate) const CONFIG_FILE: &str = "config.env";

const DEFAULT_API_URL: &str = "http://final-project.simulative.ru/data";
const DEFAULT_DB_PATH: &str = "marketplace.db";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_HISTORY_MIN_DATE: &str = "2020-01-01";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 45;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 15;
const DEFAULT_AUTO_HISTORY_THRESHOLD: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AppConfig {
    pub(crate) api_url: String,
    pub(crate) db_path: PathBuf,
    pub(crate) log_dir: PathBuf,
    pub(crate) history_min_date: NaiveDate,
    pub(crate) fetch_timeout: Duration,
    pub(crate) probe_timeout: Duration,
    pub(crate) auto_history_threshold: u64,
}

impl AppConfig {
    /// Reads `config.env` from `config_dir`. Process environment variables
    /// override values from the file.
    pub(crate) fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.is_file() {
            bail!(
                "Configuration file not found: {}\nCreate it with at least API_URL and DB_PATH",
                path.display()
            );
        }

        let mut file_values = HashMap::new();
        let entries = dotenv::from_path_iter(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        for entry in entries {
            let (key, value) =
                entry.with_context(|| format!("Malformed line in {}", path.display()))?;
            file_values.insert(key, value);
        }

        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_values.get(key).cloned())
        })
        .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            api_url: text("API_URL", DEFAULT_API_URL),
            db_path: PathBuf::from(text("DB_PATH", DEFAULT_DB_PATH)),
            log_dir: PathBuf::from(text("LOG_DIR", DEFAULT_LOG_DIR)),
            history_min_date: parsed(&lookup, "HISTORY_MIN_DATE", DEFAULT_HISTORY_MIN_DATE)?,
            fetch_timeout: Duration::from_secs(parsed(
                &lookup,
                "FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
            probe_timeout: Duration::from_secs(parsed(
                &lookup,
                "PROBE_TIMEOUT_SECS",
                DEFAULT_PROBE_TIMEOUT_SECS,
            )?),
            auto_history_threshold: parsed(
                &lookup,
                "AUTO_HISTORY_THRESHOLD",
                DEFAULT_AUTO_HISTORY_THRESHOLD,
            )?,
        })
    }

    pub(crate) fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            fetch_timeout: self.fetch_timeout,
            probe_timeout: self.probe_timeout,
            ..Default::default()
        }
    }
}

fn parsed<T, D>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: D) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    D: Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{key}={raw:?}: {e}"))
}
