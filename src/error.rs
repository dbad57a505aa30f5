//! Error types for a notification run

use std::fmt;

/// Result type alias for notifier operations
pub type NotifierResult<T> = Result<T, NotifierError>;

/// Errors that can occur while fetching, formatting, publishing or alerting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierError {
    /// Connection, DNS or timeout failure on an outbound request
    Network(String),

    /// The backend answered with a non-success status or an unreadable body
    BadResponse { status: Option<u16>, body: String },

    /// An expected field was absent, null or unparsable
    MissingField(String),

    /// The measurement is older than the freshness threshold
    Stale,

    /// The platform rejected the configured credentials
    AuthFailure(String),

    /// The platform call itself failed
    PublishFailure(String),

    /// An alert could not be delivered (never fatal)
    AlertDeliveryFailure(String),

    /// Required configuration is missing
    Configuration(String),
}

impl fmt::Display for NotifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifierError::Network(msg) => {
                write!(f, "Error while connecting to backend: {}", msg)
            }
            NotifierError::BadResponse {
                status: Some(status),
                body,
            } => write!(
                f,
                "Request to backend was unsuccessful ({}): {}",
                status, body
            ),
            NotifierError::BadResponse { status: None, body } => {
                write!(f, "Request to backend was unsuccessful: {}", body)
            }
            NotifierError::MissingField(field) => {
                write!(f, "backend response is missing field `{}`", field)
            }
            NotifierError::Stale => write!(f, "last timestamp is older than 115 minutes"),
            NotifierError::AuthFailure(msg) => write!(f, "Couldn't verify credentials: {}", msg),
            NotifierError::PublishFailure(msg) => write!(f, "{}", msg),
            NotifierError::AlertDeliveryFailure(msg) => {
                write!(f, "failed to deliver alert: {}", msg)
            }
            NotifierError::Configuration(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for NotifierError {}

impl From<reqwest::Error> for NotifierError {
    fn from(err: reqwest::Error) -> Self {
        NotifierError::Network(err.to_string())
    }
}
