//! Relational persistence for saleflow sale records.
//!
//! [`SalesStore`] owns a SQLite connection and the `purchase` table. Batch
//! writes never propagate faults through [`SalesStore::store_batch`]; callers
//! that need the error use [`SalesStore::try_store_batch`].

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod store;

pub use store::{Result, SalesStore, StoreError};
