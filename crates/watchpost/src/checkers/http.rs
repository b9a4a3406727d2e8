//! HTTP/HTTPS reachability checker.

use std::time::Instant;

use anyhow::Result;
use tracing::{debug, info};

use super::{require_field, CheckSettings, Checker};
use crate::error::CheckError;
use crate::monitor::Monitor;
use crate::result::CheckResult;

/// Issues a single GET against the monitor's URL and compares the
/// response status, as a decimal string, to the expected value
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new(settings: &CheckSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("watchpost/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Perform the request and return the observed status code
    async fn perform(&self, url: &str) -> Result<u16, CheckError> {
        let response = self.client.get(url).send().await.map_err(|error| {
            if error.is_timeout() {
                CheckError::Transport(format!("request to {url} timed out"))
            } else {
                CheckError::Transport(format!("request to {url} failed: {error}"))
            }
        })?;

        Ok(response.status().as_u16())
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn check(&self, monitor: &Monitor) -> Result<CheckResult, CheckError> {
        let url = require_field(monitor.definition.url.as_deref(), "url")?;
        let expected = require_field(monitor.definition.response.as_deref(), "response")?;

        info!(monitor = %monitor.id, %url, "checking URL");
        let start = Instant::now();

        let result = match self.perform(url).await {
            Ok(status) => {
                let observed = status.to_string();
                debug!(monitor = %monitor.id, %observed, %expected, "response received");

                if observed == expected {
                    CheckResult::success(&monitor.id, observed)
                } else {
                    let detail = format!("expected status {expected}, observed {observed}");
                    CheckResult::mismatch(&monitor.id, observed, detail)
                }
            }
            Err(error) => CheckResult::unreachable(&monitor.id, error.to_string()),
        };

        Ok(result.with_latency(start.elapsed().as_millis() as u64))
    }
}
