//! Database sink backed by a local libsql file.

use std::path::Path;

use anyhow::{Context, Result};
use watchpost::persist::ResultSink;
use watchpost::CheckResult;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS check_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    monitor_id TEXT NOT NULL,
    outcome TEXT NOT NULL,
    raw_value TEXT,
    detail TEXT,
    timestamp TEXT NOT NULL,
    latency_ms INTEGER
)";

const INSERT_RESULT: &str = "INSERT INTO check_results
    (monitor_id, outcome, raw_value, detail, timestamp, latency_ms)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// Writes one row per completed check result
pub struct DatabaseSink {
    conn: libsql::Connection,
}

impl DatabaseSink {
    /// Open (or create) the database file and ensure the results table
    /// exists
    pub async fn open(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .with_context(|| format!("cannot open database {}", path.display()))?;
        let conn = db.connect().context("cannot connect to database")?;
        conn.execute(CREATE_TABLE, ())
            .await
            .context("cannot create check_results table")?;

        Ok(Self { conn })
    }
}

#[async_trait::async_trait]
impl ResultSink for DatabaseSink {
    async fn record(&self, result: &CheckResult) -> Result<()> {
        self.conn
            .execute(
                INSERT_RESULT,
                libsql::params![
                    result.monitor_id.clone(),
                    result.outcome.to_string(),
                    result.raw_value.clone(),
                    result.detail.clone(),
                    result.timestamp.to_rfc3339(),
                    result.latency_ms.map(|ms| ms as i64),
                ],
            )
            .await
            .context("cannot insert check result")?;

        Ok(())
    }

    fn name(&self) -> &str {
        "database"
    }
}
