//! Result persistence boundary.
//!
//! The engine forwards every completed check result to a set of sinks.
//! Sinks are thin I/O wrappers; a sink error is logged by the engine and
//! never fails the run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;

use crate::result::CheckResult;

/// Destination for completed check results
#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist one result
    async fn record(&self, result: &CheckResult) -> Result<()>;

    /// Short name used in log messages
    fn name(&self) -> &str;
}

/// Appends one JSON object per line to an output file
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ResultSink for FileSink {
    async fn record(&self, result: &CheckResult) -> Result<()> {
        let mut line = serde_json::to_string(result)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("cannot open output file {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("cannot write to output file {}", self.path.display()))?;

        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{CheckOutcome, CheckResult};

    #[tokio::test]
    async fn file_sink_appends_one_json_line_per_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        let sink = FileSink::new(&path);

        sink.record(&CheckResult::success("web", "200")).await.unwrap();
        sink.record(&CheckResult::unreachable("api", "connection refused")).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: CheckResult = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.monitor_id, "web");
        assert_eq!(first.outcome, CheckOutcome::Success);

        let second: CheckResult = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.outcome, CheckOutcome::Unreachable);
    }
}
