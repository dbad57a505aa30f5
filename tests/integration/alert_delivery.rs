//! Alert dispatch to Telegram chats and PagerDuty

use laketweet::alerts::{AlertDispatcher, AlertSummary};
use laketweet::orchestrator::{OutcomeReport, RunStage};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::{client, config_from};

const TOKEN: &str = "123456:ABC-DEF";

fn failed_report() -> OutcomeReport {
    OutcomeReport::failed(RunStage::Formatting, "last timestamp is older than 115 minutes")
}

#[tokio::test]
async fn test_alert_reaches_every_chat_and_pages_once() {
    let mock_server = MockServer::start().await;
    for chat_id in ["139656428", "-100200300"] {
        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .and(body_partial_json(json!({
                "chat_id": chat_id,
                "text": "Error while executing laketweet: last timestamp is older than 115 minutes",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/v2/enqueue"))
        .and(body_partial_json(json!({
            "routing_key": "R0UT1NG",
            "event_action": "trigger",
            "payload": {
                "summary": "laketweet failure",
                "source": "laketweet",
                "severity": "critical",
                "custom_details": {
                    "alert_body": "last timestamp is older than 115 minutes"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "status": "success",
            "message": "Event processed",
            "dedup_key": "1721039400000000"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config_from(&[
        ("BOT_ERROR_TOKEN", TOKEN.to_string()),
        ("TELEGRAM_CHATLIST", "139656428, -100200300".to_string()),
        ("TELEGRAM_API_URL", mock_server.uri()),
        ("PAGERDUTY_ROUTING_KEY", "R0UT1NG".to_string()),
        ("PAGERDUTY_EVENTS_URL", format!("{}/v2/enqueue", mock_server.uri())),
    ]);

    let summary = AlertDispatcher::new(client(), &config)
        .dispatch(&failed_report())
        .await;

    assert_eq!(
        summary,
        AlertSummary {
            chat_delivered: 2,
            chat_failed: 0,
            paged: true,
        }
    );
}

#[tokio::test]
async fn test_failing_chat_does_not_stop_the_others() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .and(body_partial_json(json!({ "chat_id": "1" })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .and(body_partial_json(json!({ "chat_id": "2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config_from(&[
        ("BOT_ERROR_TOKEN", TOKEN.to_string()),
        ("TELEGRAM_CHATLIST", "1,2".to_string()),
        ("TELEGRAM_API_URL", mock_server.uri()),
    ]);

    let summary = AlertDispatcher::new(client(), &config)
        .dispatch(&failed_report())
        .await;

    assert_eq!(summary.chat_delivered, 1);
    assert_eq!(summary.chat_failed, 1);
    assert!(!summary.paged);
}

#[tokio::test]
async fn test_paging_failure_is_swallowed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/enqueue"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": "invalid event",
            "message": "Event object is invalid",
            "errors": ["Length of 'routing_key' is incorrect (should be 32 characters)"]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config_from(&[
        ("PAGERDUTY_ROUTING_KEY", "short".to_string()),
        ("PAGERDUTY_EVENTS_URL", format!("{}/v2/enqueue", mock_server.uri())),
    ]);

    let summary = AlertDispatcher::new(client(), &config)
        .dispatch(&failed_report())
        .await;

    assert_eq!(summary, AlertSummary::default());
}

#[tokio::test]
async fn test_chat_list_without_token_sends_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = config_from(&[
        ("TELEGRAM_CHATLIST", "139656428".to_string()),
        ("TELEGRAM_API_URL", mock_server.uri()),
    ]);

    let summary = AlertDispatcher::new(client(), &config)
        .dispatch(&failed_report())
        .await;

    assert_eq!(summary, AlertSummary::default());
}
