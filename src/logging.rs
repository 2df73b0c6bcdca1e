use chrono::Utc;
use reqwest::{Method, StatusCode};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, Level};

use crate::config::LoggingConfig;

/// Install the global subscriber. Output goes to stderr so stdout carries
/// only the operator report.
pub fn init_logging(config: &LoggingConfig, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        parse_level(&config.level)
    };

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_level(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or(Level::INFO)
}

/// One access-log line per platform call. `status` is `None` when the
/// request never produced a response.
pub fn log_api_call(method: &Method, url: &str, status: Option<StatusCode>, elapsed: Duration) {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let status = status
        .map(|s| s.as_u16().to_string())
        .unwrap_or_else(|| "-".to_string());

    info!(
        target: "access_log",
        "{} \"{}\" {} {}ms",
        timestamp,
        format_request(method, url),
        status,
        elapsed.as_millis()
    );
}

fn format_request(method: &Method, url: &str) -> String {
    format!("{} {} HTTP/1.1", method, url)
}
