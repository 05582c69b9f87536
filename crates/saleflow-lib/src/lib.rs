//! Marketplace sales loader.
//!
//! This is a facade crate that re-exports functionality from the saleflow
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use saleflow_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SalesClient::with_defaults()?;
//!     let validator = SalesValidator::new();
//!     let store = SalesStore::open("marketplace.db")?;
//!
//!     let coordinator = PipelineCoordinator::new(&client, &validator, &store);
//!     let outcome = coordinator.run(&DailyStrategy::new()).await?;
//!     println!("{}", outcome.metrics);
//!
//!     store.close()?;
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use saleflow_types::*;

// Re-export validation
pub use saleflow_validate::{RejectReason, Rejection, SalesValidator, Validation};

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use saleflow_fetch::{
    ClientConfig, DownloadError, NO_DATA_SENTINELS, ParseError, SalesClient, is_no_data_body,
    parse_sales,
};

// Re-export persistence
#[cfg(feature = "store")]
pub use saleflow_store::{SalesStore, StoreError};

// Re-export the pipeline
#[cfg(feature = "pipeline")]
pub use saleflow_pipeline::{
    AvailabilityProbe, DailyStrategy, DayObserver, DayOutcome, DryRunPlan, HistoricalStrategy,
    HistoryReport, PipelineCoordinator, RangeOutcome, RangeResolver, RecordValidator, RunMode,
    SalesSink, SalesSource, discover_first_available_date,
};

/// Prelude module for convenient imports.
///
/// ```
/// use saleflow_lib::prelude::*;
/// ```
pub mod prelude {
    pub use saleflow_types::{
        DailyMetrics, DateRange, DateRangeError, Gender, RawSale, Result, SaleRecord,
        SaleflowError,
    };

    pub use saleflow_validate::SalesValidator;

    #[cfg(feature = "fetch")]
    pub use saleflow_fetch::{ClientConfig, SalesClient};

    #[cfg(feature = "store")]
    pub use saleflow_store::SalesStore;

    #[cfg(feature = "pipeline")]
    pub use saleflow_pipeline::{
        DailyStrategy, HistoricalStrategy, PipelineCoordinator, RangeOutcome, RangeResolver,
        RunMode,
    };
}
