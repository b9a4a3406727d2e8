//! Engine loop.
//!
//! One pass over the discovered monitors. Each check is an independent
//! unit of work with its own definition and its own result, so checks
//! run concurrently on a bounded stream. Failures of individual checks
//! or sinks never abort the pass.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{error, info};

use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::monitor::Monitor;
use crate::persist::ResultSink;
use crate::result::CheckResult;

/// Tally of one engine pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Drives one pass of checks and forwards results to the sinks
pub struct Engine {
    dispatcher: Arc<Dispatcher>,
    sinks: Vec<Arc<dyn ResultSink>>,
    concurrency: usize,
}

impl Engine {
    pub fn new(
        dispatcher: Dispatcher,
        sinks: Vec<Arc<dyn ResultSink>>,
        concurrency: usize,
    ) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            sinks,
            concurrency: concurrency.max(1),
        }
    }

    /// Run every monitor once and persist the results.
    ///
    /// Always completes the full pass; the summary reports how the
    /// individual monitors fared.
    pub async fn run(&self, monitors: Vec<Monitor>) -> RunSummary {
        info!(monitors = monitors.len(), started = %Utc::now().to_rfc3339(), "starting check pass");

        let mut summary = RunSummary { total: monitors.len(), ..RunSummary::default() };

        let dispatcher = self.dispatcher.clone();
        let mut outcomes = stream::iter(monitors)
            .map(|monitor| {
                let dispatcher = dispatcher.clone();
                async move {
                    let outcome = dispatcher.dispatch(&monitor).await;
                    (monitor, outcome)
                }
            })
            .buffer_unordered(self.concurrency);

        while let Some((monitor, outcome)) = outcomes.next().await {
            match outcome {
                DispatchOutcome::Checked(result) => {
                    if result.outcome.is_pass() {
                        summary.passed += 1;
                        info!(monitor = %monitor.id, raw = ?result.raw_value, "check passed");
                    } else {
                        summary.failed += 1;
                        info!(
                            monitor = %monitor.id,
                            outcome = %result.outcome,
                            detail = ?result.detail,
                            "check failed"
                        );
                    }
                    self.persist(&result).await;
                }
                DispatchOutcome::Skipped { reason } => {
                    summary.skipped += 1;
                    info!(monitor = %monitor.id, %reason, "check skipped");
                }
            }
        }

        info!(
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            "check pass complete"
        );
        summary
    }

    async fn persist(&self, result: &CheckResult) {
        for sink in &self.sinks {
            if let Err(sink_error) = sink.record(result).await {
                error!(sink = sink.name(), monitor = %result.monitor_id, %sink_error, "failed to persist result");
            }
        }
    }
}
