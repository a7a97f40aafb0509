//! Database layer for bulklink.

mod schema;
mod clients;
mod schemes;
mod purchases;
mod links;
mod fulfillments;
mod orders;

pub use schema::*;
#[allow(unused_imports)]
pub use clients::*;
#[allow(unused_imports)]
pub use schemes::*;
pub use purchases::*;
pub use links::*;
pub use fulfillments::*;
#[allow(unused_imports)]
pub use orders::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Outcome of a guarded conditional update.
///
/// The redemption engine relies on the affected-row count of its conditional
/// updates: a guard that matched zero rows means another request consumed the
/// capacity after our pre-check, and the surrounding transaction must roll
/// back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalUpdate {
    /// The guarded update matched and mutated exactly one row
    Applied,
    /// The guard no longer held; nothing was written
    NoOpDueToRace,
}

impl ConditionalUpdate {
    fn from_rows(rows_affected: usize) -> Self {
        if rows_affected > 0 {
            ConditionalUpdate::Applied
        } else {
            ConditionalUpdate::NoOpDueToRace
        }
    }
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction.
    pub fn transaction(&mut self) -> DbResult<rusqlite::Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"clients".to_string()));
        assert!(tables.contains(&"product_schemes".to_string()));
        assert!(tables.contains(&"bulk_purchases".to_string()));
        assert!(tables.contains(&"patient_links".to_string()));
        assert!(tables.contains(&"patient_fulfillments".to_string()));
        assert!(tables.contains(&"order_sync".to_string()));
    }

    #[test]
    fn test_open_file_backed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bulklink.db");

        {
            let db = Database::open(&path).unwrap();
            db.conn()
                .execute(
                    "INSERT INTO clients (id, email, name) VALUES ('c1', 'a@b.c', 'Clinic')",
                    [],
                )
                .unwrap();
        }

        // Reopen and verify persistence
        let db = Database::open(&path).unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
