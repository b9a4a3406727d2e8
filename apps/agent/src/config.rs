//! Global agent configuration.
//!
//! Loaded once at startup; this is the only file whose absence is fatal.
//! Everything the engine needs (monitor directory, output destinations,
//! check settings) is explicit here rather than ambient state.

use std::time::Duration;
use std::{fmt, fs, path};

use serde::{Deserialize, Serialize};
use watchpost::{CheckSettings, HostKeyPolicy};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read configuration file {0}: {1}")]
    ReadFailed(path::PathBuf, std::io::Error),
    #[error("cannot parse configuration file {0}: {1}")]
    ParseFailed(path::PathBuf, toml::de::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned for `*.mon` monitor definition files
    pub monitor_dir: path::PathBuf,

    #[serde(default)]
    pub output: Output,

    #[serde(default)]
    pub checks: Checks,
}

/// Where completed check results are written; both destinations may be
/// enabled at once, neither is required
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Output {
    /// JSONL output file, one result per line
    #[serde(default)]
    pub file: Option<path::PathBuf>,

    /// Local libsql database file
    #[serde(default)]
    pub database: Option<path::PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Checks {
    /// Deadline for a single check invocation, in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// How many checks may run at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Port used for SSH sessions
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,

    /// "warn" accepts unknown host keys with a logged warning; "strict"
    /// requires a known_hosts entry
    #[serde(default)]
    pub host_key_policy: HostKeyPolicy,

    /// known_hosts file consulted for host key verification
    #[serde(default)]
    pub known_hosts: Option<path::PathBuf>,
}

fn default_timeout_seconds() -> u64 {
    watchpost::DEFAULT_CHECK_TIMEOUT_SECS
}

fn default_concurrency() -> usize {
    4
}

fn default_ssh_port() -> u16 {
    watchpost::DEFAULT_SSH_PORT
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            concurrency: default_concurrency(),
            ssh_port: default_ssh_port(),
            host_key_policy: HostKeyPolicy::default(),
            known_hosts: None,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Configuration:")?;
        writeln!(f, "  Monitor Directory: {}", self.monitor_dir.display())?;
        writeln!(f, "  Output")?;
        match &self.output.file {
            Some(file) => writeln!(f, "    File: {}", file.display())?,
            None => writeln!(f, "    File: disabled")?,
        }
        match &self.output.database {
            Some(database) => writeln!(f, "    Database: {}", database.display())?,
            None => writeln!(f, "    Database: disabled")?,
        }
        writeln!(f, "  Checks")?;
        writeln!(f, "    Timeout: {}s", self.checks.timeout_seconds)?;
        writeln!(f, "    Concurrency: {}", self.checks.concurrency)?;
        writeln!(f, "    SSH Port: {}", self.checks.ssh_port)?;
        writeln!(f, "    Host Key Policy: {:?}", self.checks.host_key_policy)?;

        Ok(())
    }
}

impl Config {
    /// Read and parse the configuration file.
    ///
    /// There is no fallback: a missing or unparseable file halts the
    /// agent before any monitor runs.
    pub fn from_file(path: impl AsRef<path::Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|error| Error::ReadFailed(path.to_path_buf(), error))?;
        toml::from_str(&raw).map_err(|error| Error::ParseFailed(path.to_path_buf(), error))
    }

    /// Check settings handed to the engine's checkers
    pub fn check_settings(&self) -> CheckSettings {
        CheckSettings {
            timeout: Duration::from_secs(self.checks.timeout_seconds),
            ssh_port: self.checks.ssh_port,
            host_key_policy: self.checks.host_key_policy,
            known_hosts_path: self.checks.known_hosts.clone(),
        }
    }
}
