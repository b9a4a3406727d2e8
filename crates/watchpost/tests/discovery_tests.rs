//! Tests for monitor definition discovery.

use std::path::Path;

use watchpost::discovery::discover_monitors;
use watchpost::MonitorType;

fn write_http_monitor(dir: &Path, name: &str) {
    let body = format!(
        r#"{{ "monitortype": "http", "url": "http://{name}.internal/", "response": "200", "interval": 5, "timeunit": "minutes" }}"#
    );
    std::fs::write(dir.join(format!("{name}.mon")), body).unwrap();
}

#[test]
fn discovers_only_mon_files() {
    let dir = tempfile::tempdir().unwrap();
    write_http_monitor(dir.path(), "web");
    std::fs::write(dir.path().join("notes.txt"), "not a monitor").unwrap();
    std::fs::write(dir.path().join("orphan"), "{}").unwrap();

    let discovered = discover_monitors(dir.path()).unwrap();

    assert_eq!(discovered.monitors.len(), 1);
    assert_eq!(discovered.monitors[0].id, "web");
    assert!(discovered.errors.is_empty());
}

#[test]
fn one_malformed_file_does_not_abort_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    for index in 0..99 {
        write_http_monitor(dir.path(), &format!("web-{index:02}"));
    }
    std::fs::write(dir.path().join("broken.mon"), "{ this is not json").unwrap();

    let discovered = discover_monitors(dir.path()).unwrap();

    assert_eq!(discovered.monitors.len(), 99);
    assert_eq!(discovered.errors.len(), 1);
    assert!(discovered.errors[0].0.ends_with("broken.mon"));
}

#[test]
fn monitor_id_is_the_file_stem_and_order_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    write_http_monitor(dir.path(), "zeta");
    write_http_monitor(dir.path(), "alpha");

    let discovered = discover_monitors(dir.path()).unwrap();

    let ids: Vec<&str> = discovered.monitors.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "zeta"]);
    assert_eq!(discovered.monitors[0].definition.kind(), MonitorType::Http);
}

#[test]
fn missing_directory_is_an_error() {
    assert!(discover_monitors(Path::new("/nonexistent/monitors")).is_err());
}
