//! HTTP client for the marketplace sales API.

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use saleflow_types::RawSale;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::parse::{ParseError, is_no_data_body, parse_sales};
use crate::url::{DEFAULT_API_URL, sales_url};

/// Longest response excerpt kept in error messages.
const BODY_EXCERPT_CHARS: usize = 200;

/// Configuration for the sales client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Sales endpoint; the date is passed as a `date` query parameter.
    pub base_url: String,
    /// Timeout for a full day's data pull.
    pub fetch_timeout: Duration,
    /// Timeout for an availability probe.
    pub probe_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            fetch_timeout: Duration::from_secs(45),
            probe_timeout: Duration::from_secs(15),
            user_agent: format!("saleflow/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Errors that can occur while pulling a day's sales.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Server returned a non-success status.
    #[error("Server error {status}: {body}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// Body could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// HTTP client for daily sales pulls and availability probes.
#[derive(Debug, Clone)]
pub struct SalesClient {
    client: Client,
    config: ClientConfig,
}

impl SalesClient {
    /// Creates a new sales client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            // Per-request timeouts are applied in fetch/probe
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(ClientConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Downloads the raw sales for one day.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout, connection failure, non-2xx status or
    /// malformed JSON.
    pub async fn try_fetch_sales(&self, date: NaiveDate) -> Result<Vec<RawSale>, DownloadError> {
        let url = sales_url(&self.config.base_url, date);
        let timeout = self.config.fetch_timeout;

        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DownloadError::ServerError {
                status: status.as_u16(),
                body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
            });
        }

        let body = response.bytes().await.map_err(|e| classify(e, timeout))?;
        Ok(parse_sales(&body)?)
    }

    /// Downloads the raw sales for one day, treating every failure as an empty day.
    ///
    /// Failures are logged and never returned.
    pub async fn fetch_sales(&self, date: NaiveDate) -> Vec<RawSale> {
        info!(%date, "fetching sales");
        match self.try_fetch_sales(date).await {
            Ok(records) if records.is_empty() => {
                warn!(%date, "no sales data");
                records
            }
            Ok(records) => {
                info!(%date, count = records.len(), "received sales");
                records
            }
            Err(e) => {
                error!(%date, error = %e, "sales fetch failed");
                Vec::new()
            }
        }
    }

    /// Checks whether the marketplace has any data for the given date.
    ///
    /// Fail-closed: request errors and timeouts count as no data.
    pub async fn has_data(&self, date: NaiveDate) -> bool {
        let url = sales_url(&self.config.base_url, date);

        let response = match self
            .client
            .get(&url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!(%date, error = %e, "probe failed, treating as no data");
                return false;
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(%date, error = %e, "probe body unreadable, treating as no data");
                return false;
            }
        };

        let has_data = status == StatusCode::OK && !is_no_data_body(&body);
        if !has_data {
            debug!(%date, status = status.as_u16(), "no data");
        }
        has_data
    }
}

/// Separates timeouts from other transport errors.
fn classify(error: reqwest::Error, timeout: Duration) -> DownloadError {
    if error.is_timeout() {
        DownloadError::Timeout(timeout)
    } else {
        DownloadError::Http(error)
    }
}
