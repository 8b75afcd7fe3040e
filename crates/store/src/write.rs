use duckdb::params;
use logvault_core::error::{LogvaultError, Result};
use logvault_core::model::log::LogRecord;

use crate::Store;

impl Store {
    /// Inserts the whole batch inside one exclusive transaction, preserving
    /// input order; the sequence assigns ids as rows land. Either every
    /// record commits or none do: a failed insert returns before `commit`,
    /// and dropping the unfinished transaction rolls back the rows already
    /// executed. The connection guard is released on every exit path.
    pub fn insert_batch(&self, records: &[LogRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .map_err(|e| LogvaultError::Store(format!("begin tx failed: {e}")))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO logs (id, timestamp, service, level, message)
                     VALUES (nextval('logs_id_seq'), ?, ?, ?, ?)",
                )
                .map_err(|e| LogvaultError::Store(format!("prepare insert failed: {e}")))?;

            for record in records {
                stmt.execute(params![
                    record.timestamp,
                    record.service,
                    record.level,
                    record.message,
                ])
                .map_err(|e| LogvaultError::Store(format!("insert log failed: {e}")))?;
            }
        }

        tx.commit()
            .map_err(|e| LogvaultError::Store(format!("commit failed: {e}")))?;

        tracing::debug!(count = records.len(), "log batch committed");
        Ok(records.len())
    }
}
