//! SSH disk-usage checker.
//!
//! One invocation walks a fixed sequence: load the PEM private key, open
//! and authenticate an SSH session, run a `df`-based usage inspection
//! scoped to the monitored folder, and release the session. The libssh2
//! session is blocking, so the whole sequence runs on the blocking pool
//! with a deadline imposed from the async side. The session is owned by
//! the blocking function's scope and therefore released on every exit
//! path.

use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ssh2::{KnownHostFileKind, Session};
use tracing::{debug, info, warn};

use super::{require_field, CheckSettings, Checker, HostKeyPolicy};
use crate::error::CheckError;
use crate::monitor::Monitor;
use crate::result::{CheckOutcome, CheckResult};

/// Inspects the disk usage of a folder's filesystem on a remote host
/// over SSH, authenticating with a PEM-encoded private key
pub struct SshDiskUsageChecker {
    settings: CheckSettings,
}

/// Owned inputs handed to the blocking session function
struct SessionParams {
    hostname: String,
    folder: String,
    private_key: PathBuf,
    user: String,
    port: u16,
    io_timeout: Duration,
    host_key_policy: HostKeyPolicy,
    known_hosts_path: Option<PathBuf>,
}

impl SshDiskUsageChecker {
    pub fn new(settings: CheckSettings) -> Self {
        Self { settings }
    }

    /// Decide the verdict from the trimmed command output.
    ///
    /// Without a configured maximum the check only reports the observed
    /// value. With one, the percentage is parsed and compared.
    fn interpret(monitor_id: &str, raw: String, max_usage: Option<u8>) -> CheckResult {
        let Some(max) = max_usage else {
            return CheckResult::success(monitor_id, raw);
        };

        match parse_usage_percent(&raw) {
            Ok(percent) if percent <= max => CheckResult::success(monitor_id, raw),
            Ok(percent) => {
                let detail = format!("disk usage {percent}% exceeds maximum {max}%");
                CheckResult::mismatch(monitor_id, raw, detail)
            }
            Err(error) => CheckResult::mismatch(monitor_id, raw, error.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl Checker for SshDiskUsageChecker {
    async fn check(&self, monitor: &Monitor) -> Result<CheckResult, CheckError> {
        let definition = &monitor.definition;
        let params = SessionParams {
            hostname: require_field(definition.hostname.as_deref(), "hostname")?.to_string(),
            folder: require_field(definition.folder.as_deref(), "folder")?.to_string(),
            private_key: PathBuf::from(require_field(
                definition.private_key.as_deref(),
                "privatekey",
            )?),
            user: require_field(definition.user.as_deref(), "user")?.to_string(),
            port: self.settings.ssh_port,
            io_timeout: self.settings.timeout,
            host_key_policy: self.settings.host_key_policy,
            known_hosts_path: self.settings.known_hosts_path.clone(),
        };

        info!(
            monitor = %monitor.id,
            host = %params.hostname,
            folder = %params.folder,
            "checking disk usage over SSH"
        );

        let max_usage = definition.max_usage;
        let monitor_id = monitor.id.clone();
        let start = Instant::now();

        let task = tokio::task::spawn_blocking(move || run_session(&params));
        let result = match tokio::time::timeout(self.settings.timeout, task).await {
            Err(_) => CheckResult::failure(
                &monitor.id,
                CheckOutcome::ConnectionFailure,
                format!("check timed out after {}s", self.settings.timeout.as_secs()),
            ),
            Ok(Err(join_error)) => CheckResult::failure(
                &monitor.id,
                CheckOutcome::ConnectionFailure,
                format!("check task aborted: {join_error}"),
            ),
            Ok(Ok(Ok(raw))) => Self::interpret(&monitor_id, raw, max_usage),
            Ok(Ok(Err(error))) => {
                CheckResult::failure(&monitor.id, error.outcome(), error.to_string())
            }
        };

        Ok(result.with_latency(start.elapsed().as_millis() as u64))
    }
}

/// Run the connect/execute/disconnect sequence on the blocking pool
fn run_session(params: &SessionParams) -> Result<String, CheckError> {
    let key_material = load_private_key(&params.private_key)?;
    debug!(key = %params.private_key.display(), bytes = key_material.len(), "private key loaded");

    let address = (params.hostname.as_str(), params.port)
        .to_socket_addrs()
        .map_err(|error| {
            CheckError::Transport(format!("cannot resolve {}: {error}", params.hostname))
        })?
        .next()
        .ok_or_else(|| {
            CheckError::Transport(format!("no address found for {}", params.hostname))
        })?;

    let tcp = TcpStream::connect_timeout(&address, params.io_timeout).map_err(|error| {
        CheckError::Transport(format!("cannot connect to {address}: {error}"))
    })?;

    let mut session = Session::new()
        .map_err(|error| CheckError::Transport(format!("session setup failed: {error}")))?;
    session.set_timeout(params.io_timeout.as_millis() as u32);
    session.set_tcp_stream(tcp);
    session.handshake().map_err(|error| {
        CheckError::Transport(format!("SSH handshake with {} failed: {error}", params.hostname))
    })?;

    verify_host_key(&session, params)?;

    session
        .userauth_pubkey_file(&params.user, None, &params.private_key, None)
        .map_err(|error| {
            CheckError::Auth(format!(
                "remote rejected key authentication for user '{}': {error}",
                params.user
            ))
        })?;

    let command = disk_usage_command(&params.folder);
    debug!(%command, "running remote command");

    let mut channel = session
        .channel_session()
        .map_err(|error| CheckError::Transport(format!("cannot open channel: {error}")))?;
    channel
        .exec(&command)
        .map_err(|error| CheckError::Transport(format!("cannot run command: {error}")))?;

    let mut output = String::new();
    channel
        .read_to_string(&mut output)
        .map_err(|error| CheckError::Transport(format!("cannot read command output: {error}")))?;

    channel.wait_close().ok();
    session.disconnect(None, "check complete", None).ok();

    Ok(clean_output(&output))
}

/// Load and sanity-check the PEM private key before any connection is
/// opened; an unreadable or non-PEM key is an authentication failure
fn load_private_key(path: &Path) -> Result<String, CheckError> {
    let material = std::fs::read_to_string(path).map_err(|error| {
        CheckError::Auth(format!("cannot read private key {}: {error}", path.display()))
    })?;

    if !material.contains("PRIVATE KEY") {
        return Err(CheckError::Auth(format!(
            "{} is not a PEM-encoded private key",
            path.display()
        )));
    }

    Ok(material)
}

/// Check the remote host key against the configured policy
fn verify_host_key(session: &Session, params: &SessionParams) -> Result<(), CheckError> {
    let (host_key, _key_type) = session
        .host_key()
        .ok_or_else(|| CheckError::HostKey("remote offered no host key".to_string()))?;

    let lookup = lookup_known_host(session, params, host_key)?;
    host_key_decision(lookup, params.host_key_policy, &params.hostname)
}

/// Look the remote key up in the configured known_hosts file.
///
/// `None` means no lookup was possible: no file is configured, or the
/// file is unreadable in warn mode (the warn posture accepts that and
/// logs it; strict mode treats it as a verification failure).
fn lookup_known_host(
    session: &Session,
    params: &SessionParams,
    host_key: &[u8],
) -> Result<Option<ssh2::CheckResult>, CheckError> {
    let Some(path) = params.known_hosts_path.as_deref() else {
        return Ok(None);
    };

    let mut known_hosts = session
        .known_hosts()
        .map_err(|error| CheckError::HostKey(format!("known_hosts setup failed: {error}")))?;

    if let Err(error) = known_hosts.read_file(path, KnownHostFileKind::OpenSSH) {
        return match params.host_key_policy {
            HostKeyPolicy::Warn => {
                warn!(
                    host = %params.hostname,
                    file = %path.display(),
                    %error,
                    "cannot read known_hosts, accepting host key"
                );
                Ok(None)
            }
            HostKeyPolicy::Strict => Err(CheckError::HostKey(format!(
                "cannot read known_hosts {}: {error}",
                path.display()
            ))),
        };
    }

    Ok(Some(known_hosts.check_port(&params.hostname, params.port, host_key)))
}

/// Decide whether the session may proceed given the known_hosts lookup
/// and the configured policy. `None` means the key could not be looked
/// up at all.
fn host_key_decision(
    lookup: Option<ssh2::CheckResult>,
    policy: HostKeyPolicy,
    hostname: &str,
) -> Result<(), CheckError> {
    match lookup {
        Some(ssh2::CheckResult::Match) => Ok(()),
        Some(ssh2::CheckResult::NotFound) | None => match policy {
            HostKeyPolicy::Warn => {
                warn!(host = %hostname, "host key not verified, accepting");
                Ok(())
            }
            HostKeyPolicy::Strict => Err(CheckError::HostKey(format!(
                "host key for {hostname} is not verified by known_hosts"
            ))),
        },
        Some(ssh2::CheckResult::Mismatch) => Err(CheckError::HostKey(format!(
            "host key for {hostname} does not match the known_hosts entry"
        ))),
        Some(ssh2::CheckResult::Failure) => Err(CheckError::HostKey(format!(
            "host key check failed for {hostname}"
        ))),
    }
}

/// Command reporting the usage percentage of the folder's filesystem,
/// as an integer with a trailing `%`
fn disk_usage_command(folder: &str) -> String {
    format!("df {folder} | awk '{{print $5}}' | grep -v -i use")
}

/// Strip the trailing newline and surrounding whitespace the remote
/// command output carries
fn clean_output(raw: &str) -> String {
    raw.trim().to_string()
}

/// Parse a `NN%` usage string into its integer percentage
fn parse_usage_percent(raw: &str) -> Result<u8, CheckError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed);

    digits
        .parse::<u8>()
        .map_err(|_| CheckError::Protocol(format!("unexpected disk usage output: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_scopes_to_the_monitored_folder() {
        let command = disk_usage_command("/var/lib/postgres");
        assert!(command.starts_with("df /var/lib/postgres"));
        assert!(command.contains("awk"));
    }

    #[test]
    fn output_is_stripped_of_trailing_newline() {
        assert_eq!(clean_output("42%\n"), "42%");
        assert_eq!(clean_output("  7%  \n\n"), "7%");
    }

    #[test]
    fn usage_percent_parses_with_and_without_suffix() {
        assert_eq!(parse_usage_percent("42%").unwrap(), 42);
        assert_eq!(parse_usage_percent("100").unwrap(), 100);
        assert!(parse_usage_percent("df: no such file").is_err());
    }

    #[test]
    fn report_only_checks_succeed_with_the_observed_value() {
        let result = SshDiskUsageChecker::interpret("db1", "42%".to_string(), None);
        assert_eq!(result.outcome, CheckOutcome::Success);
        assert_eq!(result.raw_value.as_deref(), Some("42%"));
    }

    #[test]
    fn usage_over_the_maximum_is_a_mismatch() {
        let result = SshDiskUsageChecker::interpret("db1", "95%".to_string(), Some(90));
        assert_eq!(result.outcome, CheckOutcome::Mismatch);
        assert!(result.detail.as_deref().unwrap_or_default().contains("95%"));

        let ok = SshDiskUsageChecker::interpret("db1", "42%".to_string(), Some(90));
        assert_eq!(ok.outcome, CheckOutcome::Success);
    }

    #[test]
    fn garbage_output_with_a_maximum_is_a_mismatch() {
        let result =
            SshDiskUsageChecker::interpret("db1", "df: not found".to_string(), Some(90));
        assert_eq!(result.outcome, CheckOutcome::Mismatch);
    }

    #[test]
    fn strict_policy_rejects_an_unverifiable_host_key() {
        // No known_hosts lookup at all
        let error = host_key_decision(None, HostKeyPolicy::Strict, "db1").unwrap_err();
        assert!(matches!(error, CheckError::HostKey(_)));

        // Key absent from known_hosts
        let error =
            host_key_decision(Some(ssh2::CheckResult::NotFound), HostKeyPolicy::Strict, "db1")
                .unwrap_err();
        assert!(matches!(error, CheckError::HostKey(_)));
    }

    #[test]
    fn warn_policy_accepts_an_unverifiable_host_key() {
        assert!(host_key_decision(None, HostKeyPolicy::Warn, "db1").is_ok());
        assert!(
            host_key_decision(Some(ssh2::CheckResult::NotFound), HostKeyPolicy::Warn, "db1")
                .is_ok()
        );
    }

    #[test]
    fn a_mismatched_host_key_fails_under_either_policy() {
        for policy in [HostKeyPolicy::Warn, HostKeyPolicy::Strict] {
            let error = host_key_decision(Some(ssh2::CheckResult::Mismatch), policy, "db1")
                .unwrap_err();
            assert!(matches!(error, CheckError::HostKey(_)));
        }
    }

    #[test]
    fn a_matching_host_key_passes_under_either_policy() {
        for policy in [HostKeyPolicy::Warn, HostKeyPolicy::Strict] {
            assert!(host_key_decision(Some(ssh2::CheckResult::Match), policy, "db1").is_ok());
        }
    }

    #[test]
    fn non_pem_key_material_is_an_auth_failure() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not a key at all").unwrap();

        let error = load_private_key(file.path()).unwrap_err();
        assert!(matches!(error, CheckError::Auth(_)));
    }

    #[test]
    fn missing_key_file_is_an_auth_failure() {
        let error = load_private_key(Path::new("/nonexistent/key.pem")).unwrap_err();
        assert!(matches!(error, CheckError::Auth(_)));
    }
}
