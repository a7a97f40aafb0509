//! Order sync state tracking.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};

/// Per-source-order sync bookkeeping.
///
/// Retried syncs consult this table: processed orders are skipped, failed
/// ones are reattempted.
#[derive(Debug, Clone)]
pub struct OrderSyncRecord {
    pub source_order_id: String,
    pub order_number: Option<String>,
    pub payload: String,
    pub payload_hash: String,
    pub processed: bool,
    pub error: Option<String>,
    pub synced_at: String,
}

impl Database {
    /// Insert or refresh the sync record for a source order.
    ///
    /// A refresh clears any previous error and resets the sync timestamp;
    /// the processed flag is only set by [`Database::mark_order_processed`].
    pub fn upsert_order_sync(
        &self,
        source_order_id: &str,
        order_number: Option<&str>,
        payload: &str,
        payload_hash: &str,
    ) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO order_sync (source_order_id, order_number, payload, payload_hash, synced_at)
            VALUES (?1, ?2, ?3, ?4, datetime('now'))
            ON CONFLICT(source_order_id) DO UPDATE SET
                order_number = excluded.order_number,
                payload = excluded.payload,
                payload_hash = excluded.payload_hash,
                error = NULL,
                synced_at = datetime('now')
            "#,
            params![source_order_id, order_number, payload, payload_hash],
        )?;
        Ok(())
    }

    /// Get the sync record for a source order.
    pub fn order_sync_record(&self, source_order_id: &str) -> DbResult<Option<OrderSyncRecord>> {
        self.conn
            .query_row(
                r#"
                SELECT source_order_id, order_number, payload, payload_hash,
                       processed, error, synced_at
                FROM order_sync
                WHERE source_order_id = ?
                "#,
                [source_order_id],
                |row| {
                    Ok(OrderSyncRecord {
                        source_order_id: row.get(0)?,
                        order_number: row.get(1)?,
                        payload: row.get(2)?,
                        payload_hash: row.get(3)?,
                        processed: row.get(4)?,
                        error: row.get(5)?,
                        synced_at: row.get(6)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Mark a source order as fully processed.
    pub fn mark_order_processed(&self, source_order_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE order_sync SET processed = 1, error = NULL WHERE source_order_id = ?",
            [source_order_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Record a per-order ingestion failure without aborting the batch.
    pub fn record_order_error(&self, source_order_id: &str, error: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE order_sync SET processed = 0, error = ?2 WHERE source_order_id = ?1",
            params![source_order_id, error],
        )?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_upsert_and_get() {
        let db = setup_db();

        db.upsert_order_sync("order-1", Some("#1001"), "{}", "hash-a")
            .unwrap();

        let record = db.order_sync_record("order-1").unwrap().unwrap();
        assert!(!record.processed);
        assert_eq!(record.order_number.as_deref(), Some("#1001"));
        assert_eq!(record.payload_hash, "hash-a");
    }

    #[test]
    fn test_mark_processed() {
        let db = setup_db();

        db.upsert_order_sync("order-1", None, "{}", "hash-a").unwrap();
        db.mark_order_processed("order-1").unwrap();

        let record = db.order_sync_record("order-1").unwrap().unwrap();
        assert!(record.processed);
        assert!(record.error.is_none());
    }

    #[test]
    fn test_error_then_refresh_clears_error() {
        let db = setup_db();

        db.upsert_order_sync("order-1", None, "{}", "hash-a").unwrap();
        db.record_order_error("order-1", "line item rejected").unwrap();

        let record = db.order_sync_record("order-1").unwrap().unwrap();
        assert_eq!(record.error.as_deref(), Some("line item rejected"));
        assert!(!record.processed);

        // A retry refreshes the payload and clears the stored error
        db.upsert_order_sync("order-1", None, "{}", "hash-b").unwrap();
        let record = db.order_sync_record("order-1").unwrap().unwrap();
        assert!(record.error.is_none());
        assert_eq!(record.payload_hash, "hash-b");
    }
}
