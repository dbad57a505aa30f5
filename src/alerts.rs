use reqwest::Client;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{Config, PagerDutyConfig, TelegramConfig};
use crate::orchestrator::OutcomeReport;
use crate::pagerduty::PagerDutyManager;
use crate::telegram::{Message, TelegramManager};

pub const ALERT_TITLE: &str = "laketweet failure";

/// What operators get told about a failed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    pub title: String,
    pub body: String,

    /// Paging dedup key; a fresh one is generated when absent
    pub dedup_key: Option<String>,
}

impl AlertEvent {
    /// Builds an alert for a failed report; successful reports yield `None`.
    pub fn from_report(report: &OutcomeReport) -> Option<Self> {
        if report.success {
            return None;
        }

        Some(Self {
            title: ALERT_TITLE.to_string(),
            body: report.detail.clone(),
            dedup_key: None,
        })
    }

    pub fn chat_text(&self) -> String {
        format!("Error while executing laketweet: {}", self.body)
    }
}

/// Delivery statistics of one `dispatch` call (for logging and tests)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertSummary {
    pub chat_delivered: usize,
    pub chat_failed: usize,
    pub paged: bool,
}

/// Sends alerts to the chat channel and the paging system
///
/// Both channels are best-effort and independent of each other: every
/// delivery failure is logged and swallowed.
#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    chat_ids: Vec<String>,
    telegram: Option<TelegramManager>,
    pagerduty: Option<PagerDutyManager>,
}

impl AlertDispatcher {
    pub fn new(client: Client, config: &Config) -> Self {
        Self::from_parts(client, &config.telegram, config.pagerduty.clone())
    }

    pub fn from_parts(
        client: Client,
        telegram: &TelegramConfig,
        pagerduty: Option<PagerDutyConfig>,
    ) -> Self {
        Self {
            chat_ids: telegram.chat_ids.clone(),
            telegram: telegram
                .token
                .clone()
                .map(|token| TelegramManager::new(client.clone(), token, telegram)),
            pagerduty: pagerduty.map(|config| PagerDutyManager::new(client, config)),
        }
    }

    /// Alerts about a failed report. Successful reports are ignored.
    #[instrument(skip_all)]
    pub async fn dispatch(&self, report: &OutcomeReport) -> AlertSummary {
        let Some(event) = AlertEvent::from_report(report) else {
            debug!("run succeeded, nothing to alert");
            return AlertSummary::default();
        };

        error!("Something went wrong ({})", event.body);

        let (chat_delivered, chat_failed) = self.send_chat_alert(&event).await;
        let paged = self.send_paging_alert(&event).await;

        AlertSummary {
            chat_delivered,
            chat_failed,
            paged,
        }
    }

    async fn send_chat_alert(&self, event: &AlertEvent) -> (usize, usize) {
        let Some(telegram) = &self.telegram else {
            error!("BOT_ERROR_TOKEN not defined in environment, skip sending telegram message");
            return (0, 0);
        };

        if self.chat_ids.is_empty() {
            warn!("chatlist is empty (env var: TELEGRAM_CHATLIST)");
            return (0, 0);
        }

        let text = event.chat_text();
        let mut delivered = 0;
        let mut failed = 0;

        for chat_id in &self.chat_ids {
            match telegram.send_message(&Message::new(chat_id, &text)).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    error!("{e}");
                    failed += 1;
                }
            }
        }

        info!("telegram alert delivered to {delivered} of {} chats", self.chat_ids.len());
        (delivered, failed)
    }

    async fn send_paging_alert(&self, event: &AlertEvent) -> bool {
        let Some(pagerduty) = &self.pagerduty else {
            debug!("no pagerduty routing key configured, skip paging");
            return false;
        };

        match pagerduty
            .trigger(&event.title, &event.body, event.dedup_key.as_deref())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!("{e}");
                false
            }
        }
    }
}
