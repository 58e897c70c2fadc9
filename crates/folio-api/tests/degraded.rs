//! Behaviour when the service runs without a database.

mod common;

use axum::http::StatusCode;
use common::{TestHarness, data};
use folio_api::session::ONE_YEAR_SECS;
use serde_json::json;

#[tokio::test]
async fn public_reads_return_empty_values() {
    let harness = TestHarness::without_database();

    let search = harness.query("creative.search", json!({}), None).await;
    search.assert_status_ok();
    assert_eq!(data(&search), json!([]));

    let rating = harness
        .query("review.getAverageRating", json!({ "creativeId": 1 }), None)
        .await;
    assert_eq!(data(&rating), json!(0.0));

    let booking = harness.query("booking.getById", json!({ "id": 1 }), None).await;
    assert_eq!(data(&booking), json!(null));

    let gigs = harness.query("gig.listPosts", json!(null), None).await;
    assert_eq!(data(&gigs), json!([]));

    harness
        .server
        .get("/health")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn sessions_cannot_resolve_a_user() {
    let harness = TestHarness::without_database();
    let token = harness
        .state
        .sessions
        .create_session_token("client-1", "Chiamaka", ONE_YEAR_SECS)
        .unwrap();
    let cookie = format!("app_session_id={token}");

    let me = harness
        .server
        .get("/api/trpc/auth.me")
        .add_header("cookie", cookie.clone())
        .await;
    assert_eq!(data(&me), json!(null));

    harness
        .server
        .post("/api/trpc/gig.createPost")
        .add_header("cookie", cookie)
        .json(&json!({
            "title": "Lookbook",
            "description": "",
            "category": "photography",
            "budget": 1,
            "deadline": "2026-12-01",
        }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
