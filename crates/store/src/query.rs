use duckdb::params;
use logvault_core::dimension::Dimension;
use logvault_core::error::{LogvaultError, Result};
use logvault_core::model::log::LogRecord;
use logvault_core::query::{AggregateRow, Page};

use crate::Store;
use crate::db::scalar_usize;

impl Store {
    /// One bounded slice of stored records, newest timestamp first.
    ///
    /// The row count and the slice are two independent reads, not one
    /// snapshot: a writer landing between them can make `total_pages`
    /// disagree with the rows returned. Accepted weak-consistency property.
    pub fn page(&self, page: u32, page_size: u32) -> Result<Page> {
        if page == 0 || page_size == 0 {
            return Err(LogvaultError::Parse(
                "page and page size must be positive".to_string(),
            ));
        }

        let conn = self.conn();
        let total = scalar_usize(&conn, "SELECT COUNT(*) FROM logs")?;
        let total_pages = total.div_ceil(page_size as usize) as u32;
        let offset = (page as i64 - 1) * page_size as i64;

        let mut stmt = conn
            .prepare(
                "SELECT id, timestamp, service, level, message
                 FROM logs
                 ORDER BY timestamp DESC
                 LIMIT ? OFFSET ?",
            )
            .map_err(|e| LogvaultError::Store(format!("prepare page failed: {e}")))?;

        let rows = stmt
            .query_map(params![page_size as i64, offset], |row| {
                Ok(LogRecord {
                    id: Some(row.get::<_, i64>(0)?),
                    timestamp: row.get(1)?,
                    service: row.get(2)?,
                    level: row.get(3)?,
                    message: row.get(4)?,
                })
            })
            .map_err(|e| LogvaultError::Store(format!("query page failed: {e}")))?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row.map_err(|e| LogvaultError::Store(format!("map page row failed: {e}")))?);
        }

        Ok(Page {
            logs,
            total_pages,
            current_page: page,
        })
    }

    /// Grouped counts over all stored records, `count` descending. The GROUP
    /// BY column comes from the `Dimension` enum's fixed mapping, never from
    /// caller text. Ties share a count and their relative order is whatever
    /// the store yields.
    pub fn aggregate(&self, dimension: Dimension) -> Result<Vec<AggregateRow>> {
        let column = dimension.column();
        let sql = format!(
            "SELECT {column},
                    COUNT(*) AS count,
                    COUNT(CASE WHEN level IN ('ERROR', 'CRITICAL') THEN 1 END) AS error_count
             FROM logs
             GROUP BY {column}
             ORDER BY count DESC"
        );

        let conn = self.conn();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| LogvaultError::Store(format!("prepare aggregate failed: {e}")))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(AggregateRow {
                    key: row.get::<_, String>(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                    error_count: row.get::<_, i64>(2)? as u64,
                })
            })
            .map_err(|e| LogvaultError::Store(format!("query aggregate failed: {e}")))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(
                row.map_err(|e| LogvaultError::Store(format!("map aggregate row failed: {e}")))?,
            );
        }
        Ok(out)
    }
}
