//! Backend client for the current lake temperature
//!
//! ## Response shapes
//!
//! The backend has answered in two shapes over time. The current API returns
//! the fields at the top level:
//!
//! ```json
//! { "preciseTemperature": "23.46", "time": "2024-07-15T10:30:00Z" }
//! ```
//!
//! Older deployments nest the same fields under `data`:
//!
//! ```json
//! { "data": { "preciseTemperature": 23.46, "time": "2024-07-15T10:30:00Z" } }
//! ```
//!
//! The flat shape is preferred; `data` is only consulted when the top level
//! carries neither field.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, instrument, trace};

use crate::Measurement;
use crate::config::BackendConfig;
use crate::error::{NotifierError, NotifierResult};
use crate::util::join_url;

const TEMPERATURE_FIELD: &str = "preciseTemperature";
const TIME_FIELD: &str = "time";
const NESTED_KEY: &str = "data";

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

// `%#z` takes `+02`, `+0200` and `+02:00`
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%.f%#z"];

/// Anything that can produce the current measurement
#[async_trait]
pub trait TemperatureSource: Send + Sync {
    async fn fetch(&self) -> NotifierResult<Measurement>;
}

/// Fetches the measurement from the configured backend with a single GET
#[derive(Debug, Clone)]
pub struct TemperatureFetcher {
    client: Client,
    backend: BackendConfig,
}

impl TemperatureFetcher {
    pub fn new(client: Client, backend: BackendConfig) -> Self {
        Self { client, backend }
    }

    /// The full request URL, or a configuration error if no lake id is set.
    pub fn url(&self) -> NotifierResult<String> {
        let lake_id = self.backend.lake_id.as_deref().ok_or_else(|| {
            NotifierError::Configuration("LARGE_WOOG_UUID not defined in environment".to_string())
        })?;
        Ok(build_temperature_url(&self.backend, lake_id))
    }
}

#[async_trait]
impl TemperatureSource for TemperatureFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self) -> NotifierResult<Measurement> {
        let url = self.url()?;
        debug!("Calling {url}");

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Error while connecting to backend ({url}): {e}");
            NotifierError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await?;
        debug!("success: {} | content: {}", status.is_success(), body);

        if !status.is_success() {
            return Err(NotifierError::BadResponse {
                status: Some(status.as_u16()),
                body,
            });
        }

        parse_measurement(&body)
    }
}

/// Composes `{url}/{path with "{}" replaced}?precision=..&formatRegion=..`.
pub fn build_temperature_url(backend: &BackendConfig, lake_id: &str) -> String {
    let path = backend.path.replacen("{}", lake_id, 1);
    format!(
        "{}?precision={}&formatRegion={}",
        join_url(&backend.url, &path),
        backend.precision,
        backend.format_region
    )
}

/// Extracts a measurement from either response shape.
pub fn parse_measurement(body: &str) -> NotifierResult<Measurement> {
    let root: Value = serde_json::from_str(body).map_err(|e| NotifierError::BadResponse {
        status: None,
        body: format!("invalid JSON ({e}): {body}"),
    })?;

    let object = select_object(&root);

    let temperature = field(object, TEMPERATURE_FIELD)
        .and_then(parse_temperature)
        .ok_or_else(|| NotifierError::MissingField(TEMPERATURE_FIELD.to_string()))?;

    let timestamp = field(object, TIME_FIELD)
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .ok_or_else(|| NotifierError::MissingField(TIME_FIELD.to_string()))?;

    trace!("Successfully extracted time/temp from api ({timestamp} {temperature})");

    Ok(Measurement {
        temperature,
        timestamp,
    })
}

fn select_object(root: &Value) -> &Value {
    let has_flat_fields =
        field(root, TEMPERATURE_FIELD).is_some() || field(root, TIME_FIELD).is_some();
    if has_flat_fields {
        return root;
    }

    match root.get(NESTED_KEY) {
        Some(nested) if nested.is_object() => nested,
        _ => root,
    }
}

fn field<'a>(object: &'a Value, name: &str) -> Option<&'a Value> {
    object.get(name).filter(|value| !value.is_null())
}

fn parse_temperature(value: &Value) -> Option<f64> {
    let temperature = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    temperature.filter(|temperature| temperature.is_finite())
}

/// Parses an ISO-8601 timestamp and reads its wall-clock value as UTC.
///
/// A trailing `Z` or numeric offset is ignored: the backend always reports UTC
/// but has not always marked it consistently.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local().and_utc());
    }

    if let Some(parsed) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
    {
        return Some(parsed.naive_local().and_utc());
    }

    let naive = raw.trim_end_matches('Z');
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .map(|parsed| parsed.and_utc())
}
