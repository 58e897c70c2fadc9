//! Envelope, routing and session behaviour of the RPC endpoint.

mod common;

use axum::http::StatusCode;
use common::{OWNER_OPEN_ID, TestHarness, data, error, settings};
use folio_api::Settings;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn health_checks() {
    let harness = TestHarness::new();

    let plain = harness.server.get("/health").await;
    plain.assert_status_ok();
    plain.assert_json(&json!({ "status": "ok" }));

    let ok = harness
        .query("system.health", json!({ "timestamp": 1_700_000_000_000u64 }), None)
        .await;
    ok.assert_status_ok();
    ok.assert_json(&json!({ "result": { "data": { "json": { "ok": true } } } }));

    let negative = harness
        .query("system.health", json!({ "timestamp": -1 }), None)
        .await;
    negative.assert_status(StatusCode::BAD_REQUEST);
    let err = error(&negative);
    assert_eq!(err["data"]["code"], "BAD_REQUEST");
    assert_eq!(err["data"]["httpStatus"], 400);
    assert_eq!(err["data"]["path"], "system.health");
}

#[tokio::test]
async fn unknown_procedures_and_wrong_methods() {
    let harness = TestHarness::new();

    let missing = harness.query("booking.cancelEverything", json!({}), None).await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(error(&missing)["data"]["code"], "NOT_FOUND");

    // A query sent as a POST, and a mutation sent as a GET.
    let posted = harness.mutation("gig.listPosts", json!({}), None).await;
    posted.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error(&posted)["data"]["code"], "METHOD_NOT_SUPPORTED");

    let fetched = harness.query("auth.logout", json!(null), None).await;
    fetched.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn malformed_input_is_bad_request() {
    let harness = TestHarness::new();
    let client = harness.sign_in("client-1", "Chiamaka").await;

    let response = harness
        .mutation("booking.create", json!({ "creativeId": "seven" }), Some(&client))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let garbled = harness
        .server
        .get("/api/trpc/creative.getById")
        .add_query_param("input", "{not json")
        .await;
    garbled.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_reflects_the_session() {
    let harness = TestHarness::new();

    let anonymous = harness.query("auth.me", json!(null), None).await;
    anonymous.assert_status_ok();
    assert_eq!(data(&anonymous), json!(null));

    let session = harness.sign_in("client-1", "Chiamaka").await;
    let me = harness.query("auth.me", json!(null), Some(&session)).await;
    let me = data(&me);
    assert_eq!(me["openId"], "client-1");
    assert_eq!(me["name"], "Chiamaka");
    assert_eq!(me["role"], "user");

    // Tokens signed with another secret are ignored.
    let forged = harness
        .server
        .get("/api/trpc/auth.me")
        .add_header("cookie", "app_session_id=not-a-jwt")
        .await;
    assert_eq!(data(&forged), json!(null));
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let harness = TestHarness::new();
    let session = harness.sign_in("client-1", "Chiamaka").await;

    let response = harness
        .server
        .post("/api/trpc/auth.logout")
        .add_header("cookie", session.cookie.clone())
        .add_header("x-forwarded-proto", "https")
        .await;
    response.assert_status_ok();
    assert_eq!(data(&response), json!({ "success": true }));

    let cookie = response.cookie("app_session_id");
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
}

#[tokio::test]
async fn notify_owner_is_admin_only() {
    let notifications = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webdevtoken.v1.WebDevService/SendNotification"))
        .and(header("authorization", "Bearer forge-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&notifications)
        .await;

    let harness = TestHarness::with_settings(Settings {
        forge_api_url: Some(notifications.uri()),
        forge_api_key: Some("forge-key".into()),
        ..settings()
    });
    let input = json!({ "title": "New booking", "content": "Tunde was booked for Friday" });

    let member = harness.sign_in("client-1", "Chiamaka").await;
    let refused = harness
        .mutation("system.notifyOwner", input.clone(), Some(&member))
        .await;
    refused.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(error(&refused)["data"]["code"], "FORBIDDEN");

    let owner = harness.sign_in(OWNER_OPEN_ID, "Owner").await;
    assert_eq!(owner.user.role.as_str(), "admin");
    let sent = harness
        .mutation("system.notifyOwner", input, Some(&owner))
        .await;
    sent.assert_status_ok();
    assert_eq!(data(&sent), json!({ "success": true }));

    let blank = harness
        .mutation("system.notifyOwner", json!({ "title": " ", "content": "x" }), Some(&owner))
        .await;
    blank.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn notify_owner_reports_refusals_as_unsuccessful() {
    let notifications = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&notifications)
        .await;

    let harness = TestHarness::with_settings(Settings {
        forge_api_url: Some(notifications.uri()),
        forge_api_key: Some("forge-key".into()),
        ..settings()
    });
    let owner = harness.sign_in(OWNER_OPEN_ID, "Owner").await;
    let response = harness
        .mutation(
            "system.notifyOwner",
            json!({ "title": "Ping", "content": "Pong" }),
            Some(&owner),
        )
        .await;
    response.assert_status_ok();
    assert_eq!(data(&response), json!({ "success": false }));
}

#[tokio::test]
async fn superjson_wrapped_payloads() {
    let harness = TestHarness::new();
    let client = harness.sign_in("client-1", "Chiamaka").await;

    let query = harness
        .server
        .get("/api/trpc/system.health")
        .add_query_param("input", json!({ "json": { "timestamp": 5 } }).to_string())
        .await;
    query.assert_status_ok();
    query.assert_json(&json!({ "result": { "data": { "json": { "ok": true } } } }));

    let created = harness
        .server
        .post("/api/trpc/gig.createPost")
        .add_header("cookie", client.cookie.clone())
        .json(&json!({
            "json": {
                "title": "Lookbook",
                "description": "Two looks",
                "category": "photography",
                "budget": 100,
                "deadline": "2026-12-01",
            }
        }))
        .await;
    created.assert_status_ok();
    assert_eq!(data(&created)["title"], "Lookbook");

    // Input-less procedures as a superjson client sends them.
    let me = harness
        .server
        .get("/api/trpc/auth.me")
        .add_query_param("input", json!({ "json": null, "meta": { "values": ["undefined"] } }).to_string())
        .add_header("cookie", client.cookie.clone())
        .await;
    assert_eq!(data(&me)["openId"], "client-1");

    let missing = harness.query("booking.getById", json!({ "json": {} }), None).await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    let err = error(&missing);
    assert_eq!(err["code"], -32600);
    assert_eq!(err["data"]["code"], "BAD_REQUEST");
}
