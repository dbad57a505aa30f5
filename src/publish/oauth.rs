//! OAuth 1.0a request signing (HMAC-SHA1), as required by Twitter's user
//! context endpoints.

use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};

use crate::error::{NotifierError, NotifierResult};

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const VERSION: &str = "1.0";

static NONCE_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy)]
pub struct OAuthCredentials<'a> {
    pub consumer_key: &'a str,
    pub consumer_secret: &'a str,
    pub token: &'a str,
    pub token_secret: &'a str,
}

/// RFC 3986 percent-encoding (everything except `A-Z a-z 0-9 - . _ ~`).
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Builds the signature base string from the request method, the URL without
/// query and every signed parameter (oauth and request parameters alike).
pub fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(key, value)| (percent_encode(key), percent_encode(value)))
        .collect();
    encoded.sort();

    let parameter_string = encoded
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(&parameter_string)
    )
}

/// Signs a base string with `consumer_secret&token_secret`.
pub fn sign(
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> NotifierResult<String> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
        .map_err(|e| NotifierError::Configuration(format!("invalid signing key: {e}")))?;
    mac.update(base_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Builds the `Authorization` header value for a request.
///
/// `request_params` are query or form parameters that take part in the
/// signature; JSON bodies do not, so JSON requests pass an empty slice.
pub fn authorization_header(
    credentials: &OAuthCredentials<'_>,
    method: &str,
    url: &str,
    request_params: &[(&str, &str)],
    nonce: &str,
    timestamp: i64,
) -> NotifierResult<String> {
    let timestamp = timestamp.to_string();
    let oauth_params = [
        ("oauth_consumer_key", credentials.consumer_key),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", SIGNATURE_METHOD),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_token", credentials.token),
        ("oauth_version", VERSION),
    ];

    let mut signed_params = oauth_params.to_vec();
    signed_params.extend_from_slice(request_params);

    let base_string = signature_base_string(method, url, &signed_params);
    let signature = sign(
        &base_string,
        credentials.consumer_secret,
        credentials.token_secret,
    )?;

    let header = oauth_params
        .iter()
        .copied()
        .chain(std::iter::once(("oauth_signature", signature.as_str())))
        .map(|(key, value)| format!("{}=\"{}\"", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {header}"))
}

/// A nonce unique per process and call.
pub fn generate_nonce() -> String {
    let counter = NONCE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();

    let mut hasher = Sha1::new();
    hasher.update(nanos.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    hasher.update(counter.to_le_bytes());

    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
