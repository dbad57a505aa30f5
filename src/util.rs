use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::error::{NotifierError, NotifierResult};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub fn get_default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Builds the single HTTP client shared by every outbound call of a run.
pub fn build_http_client(timeout_secs: u64) -> NotifierResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("laketweet/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| NotifierError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Splits a comma-separated list, dropping blank entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

/// Joins a base URL and a path with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Pulls a human-readable message out of a platform error response.
///
/// Understands the common JSON error layouts (`detail`, `error`,
/// `description`, `errors[0].message`) and falls back to the raw body.
pub fn platform_error_text(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        json.get("detail")
            .or_else(|| json.get("error"))
            .or_else(|| json.get("description"))
            .or_else(|| json.pointer("/errors/0/message"))
            .and_then(Value::as_str)
            .map(String::from)
    });

    match message {
        Some(message) => format!("{status}: {message}"),
        None if body.trim().is_empty() => status.to_string(),
        None => format!("{status}: {}", body.trim()),
    }
}
