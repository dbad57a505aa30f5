use reqwest::Client;
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::{Secret, TelegramConfig};
use crate::error::{NotifierError, NotifierResult};
use crate::util::{join_url, platform_error_text};

/// Telegram rejects texts longer than this many characters
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Message {
    pub chat_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disable_web_page_preview: bool,
}

impl Message {
    /// Builds a message, cutting the text down to what Telegram accepts.
    pub fn new(chat_id: impl ToString, text: impl ToString) -> Self {
        let text = text.to_string();
        let text = if text.chars().count() > MAX_MESSAGE_CHARS {
            text.chars().take(MAX_MESSAGE_CHARS).collect()
        } else {
            text
        };

        Self {
            chat_id: chat_id.to_string(),
            text,
            disable_web_page_preview: true,
        }
    }
}

/// Thin client for the Bot API `sendMessage` method
#[derive(Debug, Clone)]
pub struct TelegramManager {
    client: Client,
    token: Secret,
    api_url: String,
}

impl TelegramManager {
    pub fn new(client: Client, token: Secret, config: &TelegramConfig) -> Self {
        Self {
            client,
            token,
            api_url: config.api_url.clone(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        join_url(
            &self.api_url,
            &format!("bot{}/{}", self.token.expose(), method),
        )
    }

    #[instrument(skip(self, message), fields(chat_id = %message.chat_id))]
    pub async fn send_message(&self, message: &Message) -> NotifierResult<()> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(message)
            .send()
            .await
            .map_err(|e| {
                // the URL embeds the bot token, keep it out of the error text
                NotifierError::AlertDeliveryFailure(format!(
                    "failed to send telegram message: {}",
                    e.without_url()
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifierError::AlertDeliveryFailure(format!(
                "telegram message failed with {}",
                platform_error_text(status, &body)
            )));
        }

        info!("Successfully sent Telegram message");
        Ok(())
    }
}
