pub mod alerts;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod formatter;
pub mod freshness;
pub mod orchestrator;
pub mod pagerduty;
pub mod publish;
pub mod telegram;
pub mod util;

use chrono::{DateTime, Utc};

/// A single temperature reading as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Water temperature in °C
    pub temperature: f64,

    /// When the reading was taken
    pub timestamp: DateTime<Utc>,
}
