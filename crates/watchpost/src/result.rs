//! Normalized check results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a completed check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    /// Observed value exactly equals the expected value
    Success,
    /// Check completed but the observed value differs from the expected one
    Mismatch,
    /// Target could not be reached at the transport level
    Unreachable,
    /// Credentials or key material were rejected
    AuthFailure,
    /// Session could not be established or was cut short
    ConnectionFailure,
    /// Remote host identity failed verification
    HostKeyFailure,
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckOutcome::Success => write!(f, "success"),
            CheckOutcome::Mismatch => write!(f, "mismatch"),
            CheckOutcome::Unreachable => write!(f, "unreachable"),
            CheckOutcome::AuthFailure => write!(f, "authfailure"),
            CheckOutcome::ConnectionFailure => write!(f, "connectionfailure"),
            CheckOutcome::HostKeyFailure => write!(f, "hostkeyfailure"),
        }
    }
}

impl CheckOutcome {
    /// Whether this outcome counts as a passing verdict
    pub fn is_pass(&self) -> bool {
        matches!(self, CheckOutcome::Success)
    }
}

/// Result of one check invocation, constructed once and handed to the
/// caller for persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Identifier of the monitor that was checked
    pub monitor_id: String,

    /// Verdict of the check
    pub outcome: CheckOutcome,

    /// Raw observed value (HTTP status code or disk usage percentage as
    /// text); absent when the check could not complete
    pub raw_value: Option<String>,

    /// Human-readable diagnostic; always present for non-success outcomes
    pub detail: Option<String>,

    /// When the check was performed
    pub timestamp: DateTime<Utc>,

    /// Wall time the check took, in milliseconds
    pub latency_ms: Option<u64>,
}

impl CheckResult {
    fn base(monitor_id: impl Into<String>, outcome: CheckOutcome) -> Self {
        Self {
            monitor_id: monitor_id.into(),
            outcome,
            raw_value: None,
            detail: None,
            timestamp: Utc::now(),
            latency_ms: None,
        }
    }

    /// Observed value matched the expectation
    pub fn success(monitor_id: impl Into<String>, raw_value: impl Into<String>) -> Self {
        let mut result = Self::base(monitor_id, CheckOutcome::Success);
        result.raw_value = Some(raw_value.into());
        result
    }

    /// Check completed but the observed value was not the expected one
    pub fn mismatch(
        monitor_id: impl Into<String>,
        raw_value: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let mut result = Self::base(monitor_id, CheckOutcome::Mismatch);
        result.raw_value = Some(raw_value.into());
        result.detail = Some(detail.into());
        result
    }

    /// Target could not be reached
    pub fn unreachable(monitor_id: impl Into<String>, detail: impl Into<String>) -> Self {
        let mut result = Self::base(monitor_id, CheckOutcome::Unreachable);
        result.detail = Some(detail.into());
        result
    }

    /// Build a failure result for the given outcome class
    pub fn failure(
        monitor_id: impl Into<String>,
        outcome: CheckOutcome,
        detail: impl Into<String>,
    ) -> Self {
        let mut result = Self::base(monitor_id, outcome);
        result.detail = Some(detail.into());
        result
    }

    /// Attach the observed wall time
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}
