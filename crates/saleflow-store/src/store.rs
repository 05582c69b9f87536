//! SQLite-backed purchase table.

use rusqlite::{Connection, params};
use saleflow_types::SaleRecord;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{error, info, warn};

/// Timestamp layout used for `purchase_datetime`.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS purchase (
    purchase_id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id INTEGER NOT NULL,
    gender TEXT NOT NULL,
    product_id INTEGER NOT NULL,
    quantity REAL NOT NULL,
    price_per_item REAL NOT NULL,
    discount_per_item REAL NOT NULL,
    total_price REAL NOT NULL,
    purchase_datetime TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_purchase_datetime ON purchase(purchase_datetime);
"#;

const INSERT_SQL: &str = r#"
INSERT INTO purchase (
    client_id, gender, product_id, quantity,
    price_per_item, discount_per_item, total_price, purchase_datetime
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

/// Errors that can occur in the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database file.
    #[error("Failed to open database '{path}': {source}")]
    Open {
        /// The database path.
        path: PathBuf,
        /// The underlying SQLite error.
        source: rusqlite::Error,
    },

    /// A statement failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The connection lock was poisoned by a panicking writer.
    #[error("Database connection lock poisoned")]
    Poisoned,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Persists normalized sales into the `purchase` table.
///
/// Each batch is written in its own transaction, so a failed batch leaves
/// earlier batches in place.
#[derive(Debug)]
pub struct SalesStore {
    conn: Mutex<Connection>,
}

impl SalesStore {
    /// Opens (or creates) the database at `path` and ensures the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the schema cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "database connected");

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_tables_exist()?;
        Ok(store)
    }

    /// Opens a throwaway in-memory database with the schema in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.ensure_tables_exist()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Creates the `purchase` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails.
    pub fn ensure_tables_exist(&self) -> Result<()> {
        self.lock()?.execute_batch(SCHEMA_SQL)?;
        info!("purchase table ready");
        Ok(())
    }

    /// Inserts a batch, skipping records with non-positive quantity or total.
    ///
    /// Returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails; nothing from the batch is kept.
    pub fn try_store_batch(&self, sales: &[SaleRecord]) -> Result<usize> {
        let billable: Vec<&SaleRecord> = sales.iter().filter(|s| s.is_billable()).collect();
        if billable.is_empty() {
            return Ok(0);
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_SQL)?;
            for sale in &billable {
                stmt.execute(params![
                    sale.client_id,
                    sale.gender.as_str(),
                    sale.product_id,
                    sale.quantity,
                    sale.price_per_item,
                    sale.discount_per_item,
                    sale.total_price,
                    sale.purchased_at.format(DATETIME_FORMAT).to_string(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(billable.len())
    }

    /// Inserts a batch, logging and swallowing any storage fault.
    ///
    /// Returns the number of rows inserted, or 0 on failure.
    pub fn store_batch(&self, sales: &[SaleRecord]) -> usize {
        if sales.is_empty() {
            warn!("no sales to store");
            return 0;
        }

        info!(count = sales.len(), "storing sales");
        match self.try_store_batch(sales) {
            Ok(0) => {
                warn!("no billable sales in batch");
                0
            }
            Ok(saved) => {
                info!(saved, "sales stored in purchase table");
                saved
            }
            Err(e) => {
                error!(error = %e, "failed to store sales");
                0
            }
        }
    }

    /// Returns the number of rows in the `purchase` table.
    ///
    /// # Errors
    ///
    /// Returns an error if the count query fails.
    pub fn total_records(&self) -> Result<u64> {
        let count: i64 = self
            .lock()?
            .query_row("SELECT COUNT(*) FROM purchase", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite refuses to close (for example, unfinished statements).
    pub fn close(self) -> Result<()> {
        let conn = self.conn.into_inner().map_err(|_| StoreError::Poisoned)?;
        conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
        info!("database disconnected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use saleflow_types::Gender;

    fn sale(client_id: i64, quantity: f64, total_price: f64) -> SaleRecord {
        SaleRecord {
            client_id,
            gender: Gender::Male,
            product_id: 9,
            quantity,
            price_per_item: 10.0,
            discount_per_item: 0.0,
            total_price,
            purchased_at: NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_store_and_count() {
        let store = SalesStore::in_memory().unwrap();
        let stored = store.store_batch(&[sale(1, 1.0, 10.0), sale(2, 2.0, 20.0)]);

        assert_eq!(stored, 2);
        assert_eq!(store.total_records().unwrap(), 2);
    }

    #[test]
    fn test_non_billable_skipped() {
        let store = SalesStore::in_memory().unwrap();
        let stored = store.store_batch(&[
            sale(1, 1.0, 10.0),
            sale(2, 0.0, 0.0),
            sale(3, 1.0, 0.0),
        ]);

        assert_eq!(stored, 1);
        assert_eq!(store.total_records().unwrap(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let store = SalesStore::in_memory().unwrap();
        assert_eq!(store.store_batch(&[]), 0);
        assert_eq!(store.try_store_batch(&[]).unwrap(), 0);
    }

    #[test]
    fn test_row_contents() {
        let store = SalesStore::in_memory().unwrap();
        store.store_batch(&[sale(77, 2.0, 20.0)]);

        let conn = store.lock().unwrap();
        let (client_id, gender, when): (i64, String, String) = conn
            .query_row(
                "SELECT client_id, gender, purchase_datetime FROM purchase",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();

        assert_eq!(client_id, 77);
        assert_eq!(gender, "M");
        assert_eq!(when, "2024-01-05 12:00:00");
    }

    #[test]
    fn test_storage_fault_returns_zero() {
        let store = SalesStore::in_memory().unwrap();
        store
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE purchase")
            .unwrap();

        assert!(store.try_store_batch(&[sale(1, 1.0, 10.0)]).is_err());
        assert_eq!(store.store_batch(&[sale(1, 1.0, 10.0)]), 0);
        assert!(store.total_records().is_err());
    }

    #[test]
    fn test_on_disk_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.db");

        let store = SalesStore::open(&path).unwrap();
        store.store_batch(&[sale(1, 1.0, 10.0)]);
        store.close().unwrap();

        let reopened = SalesStore::open(&path).unwrap();
        assert_eq!(reopened.total_records().unwrap(), 1);
    }

    #[test]
    fn test_ensure_tables_is_idempotent() {
        let store = SalesStore::in_memory().unwrap();
        store.ensure_tables_exist().unwrap();
        store.ensure_tables_exist().unwrap();
        assert_eq!(store.total_records().unwrap(), 0);
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("sales.db");

        assert!(matches!(SalesStore::open(&path), Err(StoreError::Open { .. })));
    }
}
