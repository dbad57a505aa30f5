//! Shared fixtures for the integration tests

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use laketweet::config::Config;
use reqwest::Client;
use serde_json::{Value, json};

pub const LAKE_ID: &str = "69c8438b-5aef-442f-a70d-e0d783ea2b38";

/// Builds a config from the given variables only, ignoring the process env.
pub fn config_from(pairs: &[(&str, String)]) -> Config {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    Config::from_lookup(|key| env.get(key).cloned())
}

/// Config with the backend pointed at `backend_uri` and no targets or alert channels.
pub fn backend_config(backend_uri: &str) -> Config {
    config_from(&[
        ("BACKEND_URL", backend_uri.to_string()),
        ("LARGE_WOOG_UUID", LAKE_ID.to_string()),
    ])
}

pub fn backend_path() -> String {
    format!("/lake/{LAKE_ID}/temperature")
}

pub fn measured_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 15, 10, 30, 0).unwrap()
}

pub fn flat_body(temperature: f64) -> Value {
    json!({
        "preciseTemperature": temperature,
        "time": "2024-07-15T10:30:00Z",
    })
}

pub fn nested_body(temperature: &str) -> Value {
    json!({
        "data": {
            "preciseTemperature": temperature,
            "time": "2024-07-15T10:30:00",
        }
    })
}

pub fn client() -> Client {
    laketweet::util::build_http_client(5).unwrap()
}
