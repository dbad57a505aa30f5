use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::MastodonConfig;
use crate::error::{NotifierError, NotifierResult};
use crate::util::{join_url, platform_error_text};

use super::{PublishTarget, transport_error};

const VERIFY_PATH: &str = "api/v1/accounts/verify_credentials";
const STATUS_PATH: &str = "api/v1/statuses";

#[derive(Debug, Serialize)]
struct NewStatus<'a> {
    status: &'a str,
    visibility: &'a str,
}

/// Posts the message as a public toot on the configured instance
#[derive(Debug, Clone)]
pub struct MastodonTarget {
    client: Client,
    config: MastodonConfig,
}

impl MastodonTarget {
    pub fn new(client: Client, config: MastodonConfig) -> Self {
        Self { client, config }
    }

    #[instrument(skip(self), fields(instance = %self.config.instance_url))]
    async fn verify_credentials(&self) -> NotifierResult<()> {
        let url = join_url(&self.config.instance_url, VERIFY_PATH);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.config.access_token.expose())
            .send()
            .await
            .map_err(|e| transport_error("failed to verify mastodon credentials", e))?;

        let status = response.status();
        if status.is_success() {
            debug!("mastodon credentials verified");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifierError::AuthFailure(platform_error_text(status, &body)))
    }
}

#[async_trait]
impl PublishTarget for MastodonTarget {
    fn name(&self) -> &str {
        "mastodon"
    }

    #[instrument(skip(self, message), fields(instance = %self.config.instance_url))]
    async fn publish(&self, message: &str) -> NotifierResult<()> {
        self.verify_credentials().await?;

        debug!("tooting: `{message}`");
        let url = join_url(&self.config.instance_url, STATUS_PATH);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.access_token.expose())
            .json(&NewStatus {
                status: message,
                visibility: "public",
            })
            .send()
            .await
            .map_err(|e| transport_error("failed to send toot", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifierError::PublishFailure(platform_error_text(
                status, &body,
            )));
        }

        info!("Successfully sent toot");
        Ok(())
    }
}
