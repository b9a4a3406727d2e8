//! Checker selection.
//!
//! Dispatch is a pure function from a monitor definition to a check
//! result, mediated by exactly one checker. Checkers are held in a
//! capability registry keyed by (type, module), so new check types are
//! registered without touching the existing ones.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::checkers::{CheckSettings, Checker, HttpChecker, SshDiskUsageChecker};
use crate::error::CheckError;
use crate::monitor::{Monitor, MonitorDefinition};
use crate::result::CheckResult;
use crate::validation::validate_definition;

/// Registry key: monitor type plus optional subtype, both lowercased
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckerKey {
    kind: String,
    module: Option<String>,
}

impl CheckerKey {
    pub fn new(kind: &str, module: Option<&str>) -> Self {
        Self {
            kind: kind.to_lowercase(),
            module: module.map(str::to_lowercase),
        }
    }

    fn for_definition(definition: &MonitorDefinition) -> Self {
        // The module field only participates in selection for ssh
        // monitors; http/https ignore it
        let module = match definition.monitor_type.to_lowercase().as_str() {
            "ssh" => definition.module.as_deref(),
            _ => None,
        };

        Self::new(&definition.monitor_type, module)
    }
}

impl std::fmt::Display for CheckerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.module {
            Some(module) => write!(f, "{}/{}", self.kind, module),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// What dispatch produced for one monitor
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A checker ran and produced a verdict
    Checked(CheckResult),
    /// No checker ran: unrecognized type, unimplemented subtype, or an
    /// unusable definition
    Skipped { reason: String },
}

/// Selects and invokes the checker matching a monitor definition
pub struct Dispatcher {
    registry: HashMap<CheckerKey, Arc<dyn Checker>>,
}

impl Dispatcher {
    /// An empty registry with no checkers
    pub fn new() -> Self {
        Self { registry: HashMap::new() }
    }

    /// A registry holding the built-in checkers: http, https and
    /// ssh/diskusage. ssh/disksize is left unregistered on purpose; it
    /// dispatches as skipped until implemented.
    pub fn with_defaults(settings: CheckSettings) -> Result<Self> {
        let http: Arc<dyn Checker> = Arc::new(HttpChecker::new(&settings)?);
        let ssh_disk_usage: Arc<dyn Checker> = Arc::new(SshDiskUsageChecker::new(settings));

        let mut dispatcher = Self::new();
        dispatcher.register(CheckerKey::new("http", None), http.clone());
        dispatcher.register(CheckerKey::new("https", None), http);
        dispatcher.register(CheckerKey::new("ssh", Some("diskusage")), ssh_disk_usage);
        Ok(dispatcher)
    }

    /// Register a checker for a (type, module) capability
    pub fn register(&mut self, key: CheckerKey, checker: Arc<dyn Checker>) {
        self.registry.insert(key, checker);
    }

    /// Select and run the checker for `monitor`.
    ///
    /// Never returns an error and never panics: an unrecognized type or
    /// an unusable definition is reported as skipped, everything else is
    /// a check result.
    pub async fn dispatch(&self, monitor: &Monitor) -> DispatchOutcome {
        let key = CheckerKey::for_definition(&monitor.definition);

        let Some(checker) = self.registry.get(&key) else {
            let reason = format!("no checker registered for monitor type '{key}'");
            warn!(monitor = %monitor.id, %reason, "skipping monitor");
            return DispatchOutcome::Skipped { reason };
        };

        if let Err(error) = validate_definition(&monitor.definition) {
            let reason = error.to_string();
            warn!(monitor = %monitor.id, %reason, "skipping monitor");
            return DispatchOutcome::Skipped { reason };
        }

        match checker.check(monitor).await {
            Ok(result) => DispatchOutcome::Checked(result),
            // Checkers contain runtime failures themselves; a residual
            // error is a definition problem surfaced late
            Err(CheckError::Config(reason)) => {
                warn!(monitor = %monitor.id, %reason, "skipping monitor");
                DispatchOutcome::Skipped { reason }
            }
            Err(error) => DispatchOutcome::Checked(CheckResult::failure(
                &monitor.id,
                error.outcome(),
                error.to_string(),
            )),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
