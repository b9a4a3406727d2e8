//! Tests for the HTTP checker against a local server.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use watchpost::{
    CheckOutcome, CheckSettings, Checker, Monitor, MonitorDefinition,
    checkers::HttpChecker,
};

/// Serve a fixed status line on an ephemeral local port
async fn serve_status(status_line: &'static str) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { break };
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    addr
}

fn http_monitor(id: &str, url: &str, expected: &str) -> Monitor {
    let definition: MonitorDefinition = serde_json::from_value(serde_json::json!({
        "monitortype": "http",
        "url": url,
        "response": expected,
    }))
    .unwrap();
    Monitor::new(id, definition)
}

fn checker() -> HttpChecker {
    let settings =
        CheckSettings { timeout: Duration::from_secs(2), ..CheckSettings::default() };
    HttpChecker::new(&settings).unwrap()
}

#[tokio::test]
async fn matching_status_is_a_success() {
    let _ = tracing_subscriber::fmt::try_init();

    let addr = serve_status("200 OK").await;
    let monitor = http_monitor("web", &format!("http://{addr}/"), "200");

    let result = checker().check(&monitor).await.unwrap();

    assert_eq!(result.outcome, CheckOutcome::Success);
    assert_eq!(result.raw_value.as_deref(), Some("200"));
    assert!(result.latency_ms.is_some());
}

#[tokio::test]
async fn unexpected_status_is_a_mismatch_with_both_values() {
    let addr = serve_status("301 Moved Permanently").await;
    let monitor = http_monitor("web", &format!("http://{addr}/"), "200");

    let result = checker().check(&monitor).await.unwrap();

    assert_eq!(result.outcome, CheckOutcome::Mismatch);
    assert_eq!(result.raw_value.as_deref(), Some("301"));
    let detail = result.detail.unwrap();
    assert!(detail.contains("200") && detail.contains("301"), "detail was: {detail}");
}

#[tokio::test]
async fn error_status_still_matches_when_expected() {
    // Expecting a 404 is a valid monitor; the comparison is exact, not
    // "is the status a success class"
    let addr = serve_status("404 Not Found").await;
    let monitor = http_monitor("web", &format!("http://{addr}/"), "404");

    let result = checker().check(&monitor).await.unwrap();
    assert_eq!(result.outcome, CheckOutcome::Success);
}

#[tokio::test]
async fn refused_connection_is_unreachable() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let monitor = http_monitor("web", &format!("http://{addr}/"), "200");
    let result = checker().check(&monitor).await.unwrap();

    assert_eq!(result.outcome, CheckOutcome::Unreachable);
    assert!(result.raw_value.is_none());
    assert!(result.detail.is_some());
}

#[tokio::test]
async fn unreachable_target_respects_the_timeout() {
    // 192.0.2.0/24 is TEST-NET-1; packets go nowhere
    let monitor = http_monitor("web", "http://192.0.2.1/", "200");

    let started = std::time::Instant::now();
    let result = checker().check(&monitor).await.unwrap();

    assert_eq!(result.outcome, CheckOutcome::Unreachable);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn missing_url_is_a_config_error() {
    let definition: MonitorDefinition =
        serde_json::from_value(serde_json::json!({ "monitortype": "http", "response": "200" }))
            .unwrap();
    let monitor = Monitor::new("web", definition);

    let error = checker().check(&monitor).await.unwrap_err();
    assert!(error.to_string().contains("url"));
}
