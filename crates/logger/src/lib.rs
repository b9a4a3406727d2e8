//! Tracing initialization for the watchpost agent.
//!
//! Logging is configured exactly once at startup from explicit inputs;
//! no other part of the workspace holds mutable logging state.

use std::env::var;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `debug` lowers the default level from INFO to DEBUG; a `RUST_LOG`
/// directive still overrides either. Setting `RUST_LOG_FORMAT=json`
/// switches to JSON output for machine-read logs.
pub fn init(debug: bool) {
    let default_level = if debug { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let env_filter =
        EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();

    let log_layer = match var("RUST_LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(log_layer).init();
}
