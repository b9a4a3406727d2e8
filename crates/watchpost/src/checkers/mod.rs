//! Checker implementations.
//!
//! Each checker owns the execution logic for one check type. Transport,
//! authentication and host-key failures never escape a checker: they are
//! converted into a [`CheckResult`] variant at the boundary. The error
//! channel is reserved for definitions a checker cannot work with.

pub mod http;
pub mod ssh;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::CheckError;
use crate::monitor::Monitor;
use crate::result::CheckResult;
use crate::{DEFAULT_CHECK_TIMEOUT_SECS, DEFAULT_SSH_PORT};

pub use http::HttpChecker;
pub use ssh::SshDiskUsageChecker;

/// How to treat a remote host key that is not in the known-hosts file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKeyPolicy {
    /// Accept unknown host keys and log a warning
    #[default]
    Warn,
    /// Require known-hosts verification; unknown or mismatched keys fail
    /// the check
    Strict,
}

/// Settings shared by all checkers, fixed at engine construction
#[derive(Debug, Clone)]
pub struct CheckSettings {
    /// Deadline for one full check invocation
    pub timeout: Duration,

    /// Port used for SSH sessions
    pub ssh_port: u16,

    /// Unknown host key handling
    pub host_key_policy: HostKeyPolicy,

    /// known_hosts file consulted in strict mode
    pub known_hosts_path: Option<PathBuf>,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_CHECK_TIMEOUT_SECS),
            ssh_port: DEFAULT_SSH_PORT,
            host_key_policy: HostKeyPolicy::default(),
            known_hosts_path: None,
        }
    }
}

/// Checker trait for different types of monitoring checks
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Execute the check described by `monitor`.
    ///
    /// `Err` is returned only for definitions missing a field this
    /// checker requires ([`CheckError::Config`]); every runtime failure
    /// is reported inside the returned [`CheckResult`].
    async fn check(&self, monitor: &Monitor) -> Result<CheckResult, CheckError>;
}

/// Pull a required field out of a definition or fail with a config error
pub(crate) fn require_field<'a>(
    field: Option<&'a str>,
    name: &str,
) -> Result<&'a str, CheckError> {
    field
        .filter(|value| !value.is_empty())
        .ok_or_else(|| CheckError::Config(format!("missing required field '{name}'")))
}
