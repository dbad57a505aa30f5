//! PagerDuty Events API v2 client
//!
//! Only the `trigger` action is used. Events with the same `dedup_key` are
//! collapsed by PagerDuty into a single incident.

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::PagerDutyConfig;
use crate::error::{NotifierError, NotifierResult};
use crate::util::platform_error_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub routing_key: String,
    pub event_action: EventAction,
    pub dedup_key: String,
    pub payload: Payload,
}

#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    pub summary: String,
    pub source: String,
    pub severity: Severity,
    pub custom_details: CustomDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomDetails {
    pub alert_body: String,
}

/// A dedup key that is unique per call (current UTC time in microseconds).
pub fn fresh_dedup_key() -> String {
    Utc::now().timestamp_micros().to_string()
}

/// Builds a critical `trigger` event.
pub fn build_event(
    config: &PagerDutyConfig,
    title: &str,
    alert_body: &str,
    dedup_key: Option<&str>,
) -> Event {
    Event {
        routing_key: config.routing_key.expose().to_string(),
        event_action: EventAction::Trigger,
        dedup_key: dedup_key.map_or_else(fresh_dedup_key, String::from),
        payload: Payload {
            summary: title.to_string(),
            source: config.source.clone(),
            severity: Severity::Critical,
            custom_details: CustomDetails {
                alert_body: alert_body.to_string(),
            },
        },
    }
}

#[derive(Debug, Clone)]
pub struct PagerDutyManager {
    client: Client,
    config: PagerDutyConfig,
}

impl PagerDutyManager {
    pub fn new(client: Client, config: PagerDutyConfig) -> Self {
        Self { client, config }
    }

    #[instrument(skip(self, alert_body))]
    pub async fn trigger(
        &self,
        title: &str,
        alert_body: &str,
        dedup_key: Option<&str>,
    ) -> NotifierResult<()> {
        let event = build_event(&self.config, title, alert_body, dedup_key);
        debug!("sending pagerduty event with dedup key {}", event.dedup_key);

        let response = self
            .client
            .post(&self.config.events_url)
            .json(&event)
            .send()
            .await
            .map_err(|e| {
                NotifierError::AlertDeliveryFailure(format!("failed to send pagerduty event: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(NotifierError::AlertDeliveryFailure(format!(
                "pagerduty event failed with {}",
                platform_error_text(status, &body)
            )));
        }

        info!("Successfully sent PagerDuty event: {body}");
        Ok(())
    }
}
