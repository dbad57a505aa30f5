//! Publish targets
//!
//! Every social platform the status message goes to implements
//! [`PublishTarget`]. Targets are enabled purely by configuration: a platform
//! whose credentials are missing simply does not appear in the list returned by
//! [`build_targets`], so nothing downstream branches on platform identity.
//!
//! ## Error contract
//!
//! - [`NotifierError::AuthFailure`] when the platform rejects the credentials
//!   during verification (before anything is posted)
//! - [`NotifierError::PublishFailure`] for everything else, carrying the
//!   platform's own error text
//!
//! A successful `publish` creates a public post. Calling it twice creates two
//! posts.

pub mod mastodon;
pub mod oauth;
pub mod twitter;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::Config;
use crate::error::{NotifierError, NotifierResult};

pub use mastodon::MastodonTarget;
pub use twitter::TwitterTarget;

#[async_trait]
pub trait PublishTarget: Send + Sync {
    /// Short identifier used in logs and reports
    fn name(&self) -> &str;

    async fn publish(&self, message: &str) -> NotifierResult<()>;
}

/// Outcome of a single `publish` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub target: String,
    pub success: bool,

    /// Empty on success, the error text otherwise
    pub detail: String,
}

impl PublishResult {
    pub fn succeeded(target: impl ToString) -> Self {
        Self {
            target: target.to_string(),
            success: true,
            detail: String::new(),
        }
    }

    pub fn failed(target: impl ToString, detail: impl ToString) -> Self {
        Self {
            target: target.to_string(),
            success: false,
            detail: detail.to_string(),
        }
    }
}

/// Builds one target per platform that has credentials configured.
pub fn build_targets(config: &Config, client: &Client) -> Vec<Box<dyn PublishTarget>> {
    let mut targets: Vec<Box<dyn PublishTarget>> = Vec::new();

    if let Some(twitter) = &config.twitter {
        targets.push(Box::new(TwitterTarget::new(client.clone(), twitter.clone())));
    }

    if let Some(mastodon) = &config.mastodon {
        targets.push(Box::new(MastodonTarget::new(
            client.clone(),
            mastodon.clone(),
        )));
    }

    debug!(
        "enabled publish targets: [{}]",
        targets
            .iter()
            .map(|target| target.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    targets
}

pub(crate) fn transport_error(action: &str, err: reqwest::Error) -> NotifierError {
    NotifierError::PublishFailure(format!("{action}: {err}"))
}
