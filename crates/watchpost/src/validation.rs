//! Monitor definition validation.
//!
//! Runs before a checker is invoked, so checkers see definitions whose
//! required fields are present. A violation is a config error; the
//! dispatcher reports it as a skip rather than a failed check.

use url::Url;

use crate::error::CheckError;
use crate::monitor::{MonitorDefinition, MonitorType};

/// Validate that a definition carries everything its check type needs
pub fn validate_definition(definition: &MonitorDefinition) -> Result<(), CheckError> {
    match definition.kind() {
        MonitorType::Http | MonitorType::Https => validate_http_fields(definition),
        MonitorType::Ssh => validate_ssh_fields(definition),
        // Unknown types never reach a checker; nothing to validate
        MonitorType::Other(_) => Ok(()),
    }
}

fn validate_http_fields(definition: &MonitorDefinition) -> Result<(), CheckError> {
    let url = definition
        .url
        .as_deref()
        .ok_or_else(|| CheckError::Config("http monitor is missing 'url'".to_string()))?;
    validate_url(url)?;

    match definition.response.as_deref() {
        Some(response) if !response.is_empty() => Ok(()),
        _ => Err(CheckError::Config("http monitor is missing 'response'".to_string())),
    }
}

fn validate_ssh_fields(definition: &MonitorDefinition) -> Result<(), CheckError> {
    let required = [
        ("hostname", &definition.hostname),
        ("folder", &definition.folder),
        ("privatekey", &definition.private_key),
        ("user", &definition.user),
    ];

    for (name, value) in required {
        if value.as_deref().map(str::is_empty).unwrap_or(true) {
            return Err(CheckError::Config(format!("ssh monitor is missing '{name}'")));
        }
    }

    Ok(())
}

/// Validate URL format and scheme
fn validate_url(url: &str) -> Result<(), CheckError> {
    let parsed = Url::parse(url)
        .map_err(|error| CheckError::Config(format!("invalid url '{url}': {error}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(CheckError::Config(format!("unsupported URL scheme: {scheme}"))),
    }
}
