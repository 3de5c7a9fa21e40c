use super::SegmentStore;
use crate::error::EngineResult;
use crate::metrics::Transaction;
use chrono::{DateTime, Utc};
use rusqlite::params;

impl SegmentStore {
    // ── Transactions ──────────────────────────────────────────────

    pub fn insert_transaction(&self, t: &Transaction) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO txn (txn_id, brand_id, customer_id, ts, amount, category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &t.txn_id,
                &t.brand_id,
                &t.customer_id,
                t.timestamp.timestamp(),
                t.amount,
                &t.category,
            ],
        )?;
        Ok(())
    }

    /// All transactions for a brand with `from <= ts < to`, ordered by
    /// timestamp then id for a stable read order.
    pub fn transactions_for_window(
        &self,
        brand_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> EngineResult<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT txn_id, customer_id, ts, amount, category
             FROM txn
             WHERE brand_id = ?1 AND ts >= ?2 AND ts < ?3
             ORDER BY ts, txn_id",
        )?;
        let rows = stmt.query_map(
            params![brand_id, from.timestamp(), to.timestamp()],
            |row| {
                let ts: i64 = row.get(2)?;
                let timestamp = DateTime::<Utc>::from_timestamp(ts, 0)
                    .ok_or(rusqlite::Error::IntegralValueOutOfRange(2, ts))?;
                Ok(Transaction {
                    txn_id: row.get(0)?,
                    brand_id: brand_id.to_string(),
                    customer_id: row.get(1)?,
                    timestamp,
                    amount: row.get(3)?,
                    category: row.get(4)?,
                })
            },
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
