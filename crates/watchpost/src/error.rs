//! Error taxonomy for check execution.
//!
//! Errors local to one checker invocation are contained: the engine loop
//! converts them into a result variant (or a skip, for definition
//! problems) and carries on with the remaining monitors.

use thiserror::Error;

use crate::result::CheckOutcome;

/// Failure classes a check invocation can produce
#[derive(Debug, Error)]
pub enum CheckError {
    /// Network-level failure: unreachable target, refused connection,
    /// protocol negotiation failure, or an exceeded deadline
    #[error("transport failure: {0}")]
    Transport(String),

    /// Credentials or key material rejected, or the key file itself is
    /// unreadable / not PEM
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Remote host identity could not be verified
    #[error("host key verification failed: {0}")]
    HostKey(String),

    /// The remote side answered with something we cannot interpret
    #[error("malformed response: {0}")]
    Protocol(String),

    /// The monitor definition is missing a field the selected checker
    /// requires, or carries an unusable value
    #[error("invalid monitor definition: {0}")]
    Config(String),
}

impl CheckError {
    /// Map an error class to the outcome it reports as.
    ///
    /// `Config` has no outcome of its own: the dispatcher turns it into
    /// a skip before any checker runs.
    pub fn outcome(&self) -> CheckOutcome {
        match self {
            CheckError::Transport(_) => CheckOutcome::ConnectionFailure,
            CheckError::Auth(_) => CheckOutcome::AuthFailure,
            CheckError::HostKey(_) => CheckOutcome::HostKeyFailure,
            CheckError::Protocol(_) => CheckOutcome::Mismatch,
            CheckError::Config(_) => CheckOutcome::ConnectionFailure,
        }
    }
}
