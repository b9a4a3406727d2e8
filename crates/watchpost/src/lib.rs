//! Watchpost - monitor execution engine for periodic health checks
//!
//! This library takes declarative monitor definitions (HTTP/HTTPS
//! reachability, SSH disk-usage inspection), selects the matching checker
//! through a capability registry, and produces normalized check results
//! for downstream persistence.

pub mod checkers;
pub mod discovery;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod persist;
pub mod result;
pub mod validation;

// Re-export main types
pub use checkers::{CheckSettings, Checker, HostKeyPolicy};
pub use dispatch::{CheckerKey, DispatchOutcome, Dispatcher};
pub use engine::{Engine, RunSummary};
pub use error::CheckError;
pub use monitor::{Monitor, MonitorDefinition, MonitorType};
pub use result::{CheckOutcome, CheckResult};

/// Extension a monitor definition file must carry to be discovered
pub const MONITOR_FILE_EXTENSION: &str = "mon";

/// Default deadline applied to a single check invocation, in seconds
pub const DEFAULT_CHECK_TIMEOUT_SECS: u64 = 10;

/// Default SSH port used by remote inspection checks
pub const DEFAULT_SSH_PORT: u16 = 22;
