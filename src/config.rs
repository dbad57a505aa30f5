use std::fmt;

use tracing::{trace, warn};

use crate::formatter::MessageTemplate;
use crate::util::{get_default_timeout, split_list};

const BACKEND_URL: &str = "BACKEND_URL";
const BACKEND_PATH: &str = "BACKEND_PATH";
const LAKE_UUID: &str = "LARGE_WOOG_UUID";
const LAKE_NAME: &str = "LAKE_NAME";
const HASHTAGS: &str = "HASHTAGS";
const CONSUMER_KEY: &str = "CONSUMER_KEY";
const CONSUMER_SECRET: &str = "CONSUMER_SECRET";
const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
const ACCESS_TOKEN_SECRET: &str = "ACCESS_TOKEN_SECRET";
const TWITTER_API_URL: &str = "TWITTER_API_URL";
const MASTODON_ACCESS_TOKEN: &str = "MASTODON_ACCESS_TOKEN";
const MASTODON_INSTANCE_URL: &str = "MASTODON_INSTANCE_URL";
const TELEGRAM_TOKEN: &str = "BOT_ERROR_TOKEN";
const TELEGRAM_CHATLIST: &str = "TELEGRAM_CHATLIST";
const TELEGRAM_API_URL: &str = "TELEGRAM_API_URL";
const PAGERDUTY_ROUTING_KEY: &str = "PAGERDUTY_ROUTING_KEY";
const PAGERDUTY_EVENTS_URL: &str = "PAGERDUTY_EVENTS_URL";
const PAGERDUTY_SOURCE: &str = "PAGERDUTY_SOURCE";
const HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";

fn default_backend_url() -> String {
    "https://api.woog.life".to_string()
}

fn default_backend_path() -> String {
    "lake/{}/temperature".to_string()
}

fn default_twitter_api_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_mastodon_instance_url() -> String {
    "https://mastodon.social".to_string()
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_pagerduty_events_url() -> String {
    "https://events.pagerduty.com/v2/enqueue".to_string()
}

fn default_pagerduty_source() -> String {
    "laketweet".to_string()
}

/// A credential whose value never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Process-wide configuration, built once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub template: MessageTemplate,

    /// Twitter target (disabled unless all four credentials are present)
    pub twitter: Option<TwitterConfig>,

    /// Mastodon target (disabled without an access token)
    pub mastodon: Option<MastodonConfig>,

    pub telegram: TelegramConfig,

    /// Paging (disabled without a routing key)
    pub pagerduty: Option<PagerDutyConfig>,

    /// Per-request timeout for every outbound call
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,

    /// Path template; `{}` is replaced by the lake id
    pub path: String,

    pub lake_id: Option<String>,
    pub precision: u8,
    pub format_region: String,
}

#[derive(Debug, Clone)]
pub struct TwitterConfig {
    pub consumer_key: Secret,
    pub consumer_secret: Secret,
    pub access_token: Secret,
    pub access_token_secret: Secret,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct MastodonConfig {
    pub access_token: Secret,
    pub instance_url: String,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: Option<Secret>,
    pub chat_ids: Vec<String>,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct PagerDutyConfig {
    pub routing_key: Secret,
    pub events_url: String,
    pub source: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Config {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values count as absent. Missing optional values fall back to
    /// defaults or disable the feature that needs them, with a warning.
    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let lake_id = get(LAKE_UUID);
        if lake_id.is_none() {
            warn!("{LAKE_UUID} not defined in environment");
        }

        let backend = BackendConfig {
            url: get(BACKEND_URL).unwrap_or_else(default_backend_url),
            path: get(BACKEND_PATH).unwrap_or_else(default_backend_path),
            lake_id,
            precision: 2,
            format_region: "DE".to_string(),
        };

        let defaults = MessageTemplate::default();
        let template = MessageTemplate {
            lake_name: get(LAKE_NAME).unwrap_or(defaults.lake_name),
            hashtags: get(HASHTAGS).unwrap_or(defaults.hashtags),
        };

        let twitter = match (
            get(CONSUMER_KEY),
            get(CONSUMER_SECRET),
            get(ACCESS_TOKEN),
            get(ACCESS_TOKEN_SECRET),
        ) {
            (Some(key), Some(secret), Some(token), Some(token_secret)) => Some(TwitterConfig {
                consumer_key: Secret::new(key),
                consumer_secret: Secret::new(secret),
                access_token: Secret::new(token),
                access_token_secret: Secret::new(token_secret),
                api_url: get(TWITTER_API_URL).unwrap_or_else(default_twitter_api_url),
            }),
            (None, None, None, None) => {
                warn!("no twitter credentials defined in environment, twitter target disabled");
                None
            }
            _ => {
                warn!(
                    "some twitter key/secret is not defined in environment, twitter target disabled"
                );
                None
            }
        };

        let mastodon = match get(MASTODON_ACCESS_TOKEN) {
            Some(token) => Some(MastodonConfig {
                access_token: Secret::new(token),
                instance_url: get(MASTODON_INSTANCE_URL)
                    .unwrap_or_else(default_mastodon_instance_url),
            }),
            None => {
                warn!(
                    "{MASTODON_ACCESS_TOKEN} not defined in environment, mastodon target disabled"
                );
                None
            }
        };

        let telegram = TelegramConfig {
            token: get(TELEGRAM_TOKEN).map(Secret::new),
            chat_ids: get(TELEGRAM_CHATLIST)
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            api_url: get(TELEGRAM_API_URL).unwrap_or_else(default_telegram_api_url),
        };
        if telegram.token.is_none() {
            warn!("{TELEGRAM_TOKEN} not defined in environment, telegram alerts disabled");
        }

        let pagerduty = get(PAGERDUTY_ROUTING_KEY).map(|key| PagerDutyConfig {
            routing_key: Secret::new(key),
            events_url: get(PAGERDUTY_EVENTS_URL).unwrap_or_else(default_pagerduty_events_url),
            source: get(PAGERDUTY_SOURCE).unwrap_or_else(default_pagerduty_source),
        });
        if pagerduty.is_none() {
            warn!("{PAGERDUTY_ROUTING_KEY} not defined in environment, paging disabled");
        }

        let timeout_secs = match get(HTTP_TIMEOUT_SECS) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    warn!("invalid {HTTP_TIMEOUT_SECS} `{raw}`, using default");
                    get_default_timeout()
                }
            },
            None => get_default_timeout(),
        };

        let config = Config {
            backend,
            template,
            twitter,
            mastodon,
            telegram,
            pagerduty,
            timeout_secs,
        };
        trace!("loaded config: {config:?}");
        config
    }
}
