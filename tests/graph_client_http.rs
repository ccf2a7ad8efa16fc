// tests/graph_client_http.rs
//! End-to-end tests of the client against a local HTTP server.

use graphdesk::{
    AccessToken, AdAccountId, AppError, CampaignId, ClientSettings, GraphClient, GraphRepository,
    PageId, PhotoUpload, RequestOptions,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{
    body_string_contains, header_regex, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "EAAintegrationtoken0001";

fn token() -> AccessToken {
    AccessToken::new(TOKEN).unwrap()
}

fn client(server: &MockServer) -> GraphClient {
    GraphClient::new(ClientSettings::unpaced(format!("{}/v19.0", server.uri()))).unwrap()
}

fn graph_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "error": {
            "message": message,
            "type": "OAuthException",
            "code": code,
            "fbtrace_id": "AbCdEf"
        }
    }))
}

#[tokio::test]
async fn token_error_is_attempted_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v19.0/me/adaccounts"))
        .respond_with(graph_error(190, "Error validating access token"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).ad_accounts(&token()).await.unwrap_err();

    assert!(err.is_token_error());
    let failure = err.graph_failure().unwrap();
    assert_eq!(failure.trace_id.as_deref(), Some("AbCdEf"));
}

#[tokio::test]
async fn server_errors_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v19.0/me"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v19.0/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "1", "name": "Shop" })))
        .expect(1)
        .mount(&server)
        .await;

    let me = client(&server)
        .make_request("me", RequestOptions::get().fields(&["id", "name"]), &token())
        .await
        .unwrap();

    assert_eq!(me["name"], "Shop");
}

#[tokio::test]
async fn retries_stop_after_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v19.0/me"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server)
        .make_request("me", RequestOptions::get(), &token())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::HttpStatus { status, .. } if status.as_u16() == 503));
}

#[tokio::test]
async fn slow_responses_hit_the_attempt_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v19.0/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "1" }))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut settings = ClientSettings::unpaced(format!("{}/v19.0", server.uri()));
    settings.retry.timeout = Duration::from_millis(100);
    settings.retry.max_attempts = 2;
    let client = GraphClient::new(settings).unwrap();

    let err = client
        .make_request("me", RequestOptions::get(), &token())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Timeout { .. }));
}

#[tokio::test]
async fn campaigns_follow_next_cursor() {
    let server = MockServer::start().await;
    let next = format!(
        "{}/v19.0/act_77/campaigns?after=c2&limit=100&access_token={}",
        server.uri(),
        TOKEN
    );

    Mock::given(method("GET"))
        .and(path("/v19.0/act_77/campaigns"))
        .and(query_param("access_token", TOKEN))
        .and(query_param_is_missing("after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "1", "name": "Spring", "status": "ACTIVE" },
                { "id": "2", "name": "Summer", "status": "PAUSED" }
            ],
            "paging": { "cursors": { "after": "c2" }, "next": next }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v19.0/act_77/campaigns"))
        .and(query_param("after", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "3", "name": "Fall", "status": "ACTIVE" }],
            "paging": { "cursors": { "before": "c2" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let campaigns = client(&server)
        .campaigns(&AdAccountId::parse("77").unwrap(), &token())
        .await
        .unwrap();

    let names: Vec<&str> = campaigns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Spring", "Summer", "Fall"]);
}

#[tokio::test]
async fn photo_upload_is_sent_as_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v19.0/555/photos"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"source\"; filename=\"banner.png\""))
        .and(body_string_contains("Grand opening"))
        .and(body_string_contains("PNGDATA"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "9001", "post_id": "555_9002" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    // The body matchers read the request as UTF-8, so the payload stays ASCII.
    let upload = PhotoUpload::new(b"PNGDATA".to_vec(), "banner.png").with_caption("Grand opening");
    let receipt = client(&server)
        .upload_photo(&PageId::parse("555").unwrap(), upload, &token())
        .await
        .unwrap();

    assert_eq!(receipt.id, "9001");
    assert_eq!(receipt.post_id.as_deref(), Some("555_9002"));
}

#[tokio::test]
async fn invalid_status_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .update_campaign_status(&CampaignId::parse("42").unwrap(), "ARCHIVED", &token())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn insights_cascade_stops_at_first_window_with_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v19.0/42/insights"))
        .and(query_param("date_preset", "last_30d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v19.0/42/insights"))
        .and(query_param("date_preset", "last_7d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "impressions": "1500", "clicks": "30", "spend": "12.40", "ctr": "2.0" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v19.0/42/insights"))
        .and(query_param("date_preset", "yesterday"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let insights = client(&server)
        .campaign_insights(&CampaignId::parse("42").unwrap(), &token())
        .await
        .unwrap();

    assert_eq!(insights.window.as_deref(), Some("last_7d"));
    assert_eq!(insights.metrics.impressions, 1500);
    assert_eq!(insights.metrics.spend, 12.40);
    assert!(!insights.no_data);
}
