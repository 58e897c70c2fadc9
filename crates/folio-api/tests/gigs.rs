mod common;

use axum::http::StatusCode;
use common::{TestHarness, data};
use serde_json::json;

fn post(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "description": "Two looks, one location",
        "category": "photography",
        "budget": 150_000,
        "deadline": "2026-12-01",
    })
}

#[tokio::test]
async fn post_apply_and_list() {
    let harness = TestHarness::new();
    let client = harness.sign_in("client-1", "Chiamaka").await;
    let (creative, profile) = harness.creative("creative-1", "Tunde").await;

    let created = harness.mutation("gig.createPost", post("Lookbook"), Some(&client)).await;
    created.assert_status_ok();
    let created = data(&created);
    assert_eq!(created["status"], "open");
    assert_eq!(created["clientId"], client.user.id);

    let application = harness
        .mutation(
            "gig.applyForGig",
            json!({
                "gigPostId": created["id"],
                "proposedPrice": 140_000,
                "coverLetter": "Fashion is most of my work",
            }),
            Some(&creative),
        )
        .await;
    application.assert_status_ok();
    let application = data(&application);
    assert_eq!(application["status"], "pending");
    assert_eq!(application["creativeId"], profile["id"]);

    let applications = harness
        .query("gig.getApplications", json!({ "gigPostId": created["id"] }), Some(&client))
        .await;
    assert_eq!(data(&applications), json!([application]));

    let listed = harness.query("gig.listPosts", json!({}), None).await;
    let listed = data(&listed);
    assert_eq!(listed[0]["id"], created["id"]);
    assert_eq!(listed[0]["applicationsCount"], 1);
}

#[tokio::test]
async fn applying_needs_a_creative_profile() {
    let harness = TestHarness::new();
    let client = harness.sign_in("client-1", "Chiamaka").await;
    let other = harness.sign_in("client-2", "Kemi").await;
    let created = harness.mutation("gig.createPost", post("Lookbook"), Some(&client)).await;

    harness
        .mutation(
            "gig.applyForGig",
            json!({ "gigPostId": data(&created)["id"], "proposedPrice": 10 }),
            Some(&other),
        )
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_posts_pages_newest_first() {
    let harness = TestHarness::new();
    let client = harness.sign_in("client-1", "Chiamaka").await;
    for title in ["First", "Second", "Third"] {
        harness
            .mutation("gig.createPost", post(title), Some(&client))
            .await
            .assert_status_ok();
    }

    let page = harness
        .query("gig.listPosts", json!({ "limit": 2, "offset": 1 }), None)
        .await;
    let titles: Vec<_> = data(&page)
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);

    // Input may be omitted entirely.
    let all = harness.server.get("/api/trpc/gig.listPosts").await;
    all.assert_status_ok();
    assert_eq!(data(&all).as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn zero_limit_uses_the_default_page() {
    let harness = TestHarness::new();
    let client = harness.sign_in("client-1", "Chiamaka").await;
    for title in ["First", "Second", "Third"] {
        harness
            .mutation("gig.createPost", post(title), Some(&client))
            .await
            .assert_status_ok();
    }

    let response = harness
        .query("gig.listPosts", json!({ "limit": 0 }), None)
        .await;
    response.assert_status_ok();
    assert_eq!(data(&response).as_array().unwrap().len(), 3);
}
