//! Twitter and Mastodon targets against mocked platform APIs

use assert_matches::assert_matches;
use laketweet::config::{MastodonConfig, Secret, TwitterConfig};
use laketweet::error::NotifierError;
use laketweet::publish::{MastodonTarget, PublishTarget, TwitterTarget};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::client;

const MESSAGE: &str =
    "Der Woog hat eine Temperatur von 23.46°C (12:30 15.07.2024) #woog #wooglife #darmstadt";

fn twitter_target(api_url: String) -> TwitterTarget {
    TwitterTarget::new(
        client(),
        TwitterConfig {
            consumer_key: Secret::new("xvz1evFS4wEEPTGEFPHBog"),
            consumer_secret: Secret::new("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"),
            access_token: Secret::new("370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb"),
            access_token_secret: Secret::new("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"),
            api_url,
        },
    )
}

fn mastodon_target(instance_url: String) -> MastodonTarget {
    MastodonTarget::new(
        client(),
        MastodonConfig {
            access_token: Secret::new("m4st0d0n"),
            instance_url,
        },
    )
}

#[tokio::test]
async fn test_tweet_is_posted_after_verification() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .and(header_regex("Authorization", r#"^OAuth .*oauth_signature_method="HMAC-SHA1""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": "1", "username": "woog_life" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(header_regex("Authorization", r#"oauth_signature=""#))
        .and(body_json(json!({ "text": MESSAGE })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "1445880548472328192", "text": MESSAGE }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let target = twitter_target(mock_server.uri());

    assert_eq!(target.name(), "twitter");
    target.publish(MESSAGE).await.unwrap();
}

#[tokio::test]
async fn test_twitter_rejected_credentials_post_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "title": "Unauthorized",
            "detail": "Unauthorized",
            "status": 401
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let target = twitter_target(mock_server.uri());
    let result = target.publish(MESSAGE).await;

    assert_matches!(
        result,
        Err(NotifierError::AuthFailure(ref msg)) if msg == "401 Unauthorized: Unauthorized"
    );
}

#[tokio::test]
async fn test_duplicate_tweet_is_publish_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": "1" } })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "You are not allowed to create a Tweet with duplicate content.",
            "status": 403
        })))
        .mount(&mock_server)
        .await;

    let target = twitter_target(mock_server.uri());
    let result = target.publish(MESSAGE).await;

    assert_eq!(
        result,
        Err(NotifierError::PublishFailure(
            "403 Forbidden: You are not allowed to create a Tweet with duplicate content."
                .to_string()
        ))
    );
}

#[tokio::test]
async fn test_toot_is_posted_publicly() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/verify_credentials"))
        .and(header("Authorization", "Bearer m4st0d0n"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "42", "username": "woog" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/statuses"))
        .and(header("Authorization", "Bearer m4st0d0n"))
        .and(body_json(json!({ "status": MESSAGE, "visibility": "public" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "103704874086360371" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let target = mastodon_target(mock_server.uri());

    assert_eq!(target.name(), "mastodon");
    target.publish(MESSAGE).await.unwrap();
}

#[tokio::test]
async fn test_mastodon_invalid_token_posts_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/verify_credentials"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "error": "The access token is invalid" })),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/statuses"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let target = mastodon_target(mock_server.uri());
    let result = target.publish(MESSAGE).await;

    assert_matches!(
        result,
        Err(NotifierError::AuthFailure(ref msg)) if msg == "401 Unauthorized: The access token is invalid"
    );
}

#[tokio::test]
async fn test_mastodon_rejected_status_is_publish_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/verify_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "42" })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/statuses"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({
                "error": "Validation failed: Text character limit of 500 exceeded"
            })),
        )
        .mount(&mock_server)
        .await;

    let target = mastodon_target(mock_server.uri());
    let result = target.publish(MESSAGE).await;

    assert_matches!(
        result,
        Err(NotifierError::PublishFailure(ref msg))
            if msg == "422 Unprocessable Entity: Validation failed: Text character limit of 500 exceeded"
    );
}
