//! Monitor definition discovery.
//!
//! Scans a directory for `.mon` files and parses each one as a JSON
//! monitor definition. A single malformed file is logged and skipped;
//! the remaining monitors still run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::monitor::{Monitor, MonitorDefinition};
use crate::MONITOR_FILE_EXTENSION;

/// Outcome of scanning a monitor directory
#[derive(Debug, Default)]
pub struct DiscoveredMonitors {
    /// Monitors whose definition files parsed cleanly
    pub monitors: Vec<Monitor>,

    /// Definition files that could not be read or parsed, with the
    /// reason each one was skipped
    pub errors: Vec<(PathBuf, String)>,
}

/// Scan `dir` for monitor definition files.
///
/// Fails only if the directory itself cannot be read; per-file problems
/// are collected in the returned [`DiscoveredMonitors::errors`].
pub fn discover_monitors(dir: &Path) -> Result<DiscoveredMonitors> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("cannot read monitor directory {}", dir.display()))?;

    let mut discovered = DiscoveredMonitors::default();

    for entry in entries {
        let entry = entry.with_context(|| format!("cannot scan {}", dir.display()))?;
        let path = entry.path();

        if !path.is_file() || path.extension().map(|ext| ext != MONITOR_FILE_EXTENSION).unwrap_or(true) {
            continue;
        }

        info!(file = %path.display(), "reading monitor");
        match load_definition(&path) {
            Ok(monitor) => discovered.monitors.push(monitor),
            Err(reason) => {
                warn!(file = %path.display(), %reason, "skipping malformed monitor definition");
                discovered.errors.push((path, reason));
            }
        }
    }

    // Directory scan order is filesystem-dependent; keep runs comparable
    discovered.monitors.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(discovered)
}

fn load_definition(path: &Path) -> Result<Monitor, String> {
    let id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| "definition file has no name".to_string())?;

    let raw = std::fs::read_to_string(path).map_err(|error| error.to_string())?;
    let definition: MonitorDefinition =
        serde_json::from_str(&raw).map_err(|error| error.to_string())?;

    Ok(Monitor::new(id, definition))
}
