//! Monitor definition types.
//!
//! A monitor definition is the declarative input to exactly one check
//! invocation: one JSON object per `.mon` file, immutable once loaded.

use serde::{Deserialize, Serialize};

/// Recognized monitor types, parsed case-insensitively from the
/// `monitortype` field. Unrecognized values are preserved so dispatch
/// can report them as skipped rather than failing the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorType {
    Http,
    Https,
    Ssh,
    Other(String),
}

impl MonitorType {
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "http" => MonitorType::Http,
            "https" => MonitorType::Https,
            "ssh" => MonitorType::Ssh,
            other => MonitorType::Other(other.to_string()),
        }
    }
}

/// A declarative monitor definition, wire format as found on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorDefinition {
    /// Check family: "http", "https" or "ssh" (case-insensitive)
    #[serde(rename = "monitortype")]
    pub monitor_type: String,

    /// SSH subtype ("diskusage", "disksize"); only meaningful when
    /// `monitortype` is "ssh"
    #[serde(default)]
    pub module: Option<String>,

    /// Target URL (http/https)
    #[serde(default)]
    pub url: Option<String>,

    /// Accepted for forward compatibility; does not alter connection
    /// behavior in this version
    #[serde(default)]
    pub port: Option<u16>,

    /// Expected HTTP status code, as a decimal string (http/https)
    #[serde(default)]
    pub response: Option<String>,

    /// Remote host to inspect (ssh)
    #[serde(default)]
    pub hostname: Option<String>,

    /// Filesystem path whose usage is inspected (ssh)
    #[serde(default)]
    pub folder: Option<String>,

    /// Path to a PEM-encoded private key (ssh)
    #[serde(rename = "privatekey", default)]
    pub private_key: Option<String>,

    /// Remote user to authenticate as (ssh)
    #[serde(default)]
    pub user: Option<String>,

    /// Maximum acceptable disk usage percentage; absent means the check
    /// only reports the observed value
    #[serde(rename = "maxusage", default)]
    pub max_usage: Option<u8>,

    /// Reserved for a future scheduler, parsed but not acted upon
    #[serde(default)]
    pub interval: Option<u64>,

    /// Reserved for a future scheduler, parsed but not acted upon
    #[serde(rename = "timeunit", default)]
    pub time_unit: Option<String>,
}

impl MonitorDefinition {
    /// The parsed monitor type
    pub fn kind(&self) -> MonitorType {
        MonitorType::parse(&self.monitor_type)
    }
}

/// A discovered monitor: its definition plus the identifier it reports
/// results under (the definition file stem)
#[derive(Debug, Clone)]
pub struct Monitor {
    pub id: String,
    pub definition: MonitorDefinition,
}

impl Monitor {
    pub fn new(id: impl Into<String>, definition: MonitorDefinition) -> Self {
        Self { id: id.into(), definition }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_type_parsing_is_case_insensitive() {
        assert_eq!(MonitorType::parse("HTTP"), MonitorType::Http);
        assert_eq!(MonitorType::parse("Https"), MonitorType::Https);
        assert_eq!(MonitorType::parse("ssh"), MonitorType::Ssh);
        assert_eq!(MonitorType::parse("tcp"), MonitorType::Other("tcp".to_string()));
    }

    #[test]
    fn definition_deserializes_wire_field_names() {
        let raw = r#"{
            "monitortype": "ssh",
            "module": "diskusage",
            "hostname": "db1.internal",
            "folder": "/var/lib/postgres",
            "privatekey": "/etc/watchpost/keys/db1.pem",
            "user": "monitor",
            "maxusage": 90,
            "interval": 5,
            "timeunit": "minutes"
        }"#;

        let def: MonitorDefinition = serde_json::from_str(raw).unwrap();
        assert_eq!(def.kind(), MonitorType::Ssh);
        assert_eq!(def.module.as_deref(), Some("diskusage"));
        assert_eq!(def.private_key.as_deref(), Some("/etc/watchpost/keys/db1.pem"));
        assert_eq!(def.max_usage, Some(90));
        assert_eq!(def.time_unit.as_deref(), Some("minutes"));
    }
}
