use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method};
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::config::TwitterConfig;
use crate::error::{NotifierError, NotifierResult};
use crate::util::{join_url, platform_error_text};

use super::oauth::{OAuthCredentials, authorization_header, generate_nonce};
use super::{PublishTarget, transport_error};

const VERIFY_PATH: &str = "2/users/me";
const TWEET_PATH: &str = "2/tweets";

/// Posts the message as a tweet using OAuth 1.0a user context
#[derive(Debug, Clone)]
pub struct TwitterTarget {
    client: Client,
    config: TwitterConfig,
}

impl TwitterTarget {
    pub fn new(client: Client, config: TwitterConfig) -> Self {
        Self { client, config }
    }

    fn credentials(&self) -> OAuthCredentials<'_> {
        OAuthCredentials {
            consumer_key: self.config.consumer_key.expose(),
            consumer_secret: self.config.consumer_secret.expose(),
            token: self.config.access_token.expose(),
            token_secret: self.config.access_token_secret.expose(),
        }
    }

    fn signed_request(&self, method: Method, url: &str) -> NotifierResult<reqwest::RequestBuilder> {
        let header = authorization_header(
            &self.credentials(),
            method.as_str(),
            url,
            &[],
            &generate_nonce(),
            Utc::now().timestamp(),
        )?;

        Ok(self
            .client
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, header))
    }

    #[instrument(skip(self))]
    async fn verify_credentials(&self) -> NotifierResult<()> {
        let url = join_url(&self.config.api_url, VERIFY_PATH);
        let response = self
            .signed_request(Method::GET, &url)?
            .send()
            .await
            .map_err(|e| transport_error("failed to verify twitter credentials", e))?;

        let status = response.status();
        if status.is_success() {
            debug!("twitter credentials verified");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifierError::AuthFailure(platform_error_text(status, &body)))
    }
}

#[async_trait]
impl PublishTarget for TwitterTarget {
    fn name(&self) -> &str {
        "twitter"
    }

    #[instrument(skip(self, message))]
    async fn publish(&self, message: &str) -> NotifierResult<()> {
        self.verify_credentials().await?;

        debug!("updating status with: `{message}`");
        let url = join_url(&self.config.api_url, TWEET_PATH);
        let response = self
            .signed_request(Method::POST, &url)?
            .json(&json!({ "text": message }))
            .send()
            .await
            .map_err(|e| transport_error("failed to send tweet", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifierError::PublishFailure(platform_error_text(
                status, &body,
            )));
        }

        info!("Successfully sent tweet");
        Ok(())
    }
}
