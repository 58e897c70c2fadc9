//! Shared harness for the folio-api integration tests.

#![allow(dead_code)] // Not every test file uses every helper

use std::sync::Arc;

use axum_test::{TestResponse, TestServer};
use serde_json::{Value, json};
use tempfile::TempDir;

use folio_api::session::ONE_YEAR_SECS;
use folio_api::{AppState, AppStateInner, Settings, router};
use folio_db::Database;
use folio_db::models::IdentityFields;
use folio_types::models::User;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const APP_ID: &str = "folio-test";
pub const OWNER_OPEN_ID: &str = "owner-open-id";

/// A signed-in test user and the `Cookie` header value that authenticates them.
pub struct Session {
    pub user: User,
    pub cookie: String,
}

pub struct TestHarness {
    pub server: TestServer,
    pub state: AppState,
    /// Keeps the on-disk database alive for the test's duration.
    pub _temp_dir: Option<TempDir>,
}

pub fn settings() -> Settings {
    Settings {
        app_id: APP_ID.into(),
        jwt_secret: Some(JWT_SECRET.into()),
        owner_open_id: Some(OWNER_OPEN_ID.into()),
        ..Settings::default()
    }
}

impl TestHarness {
    /// Fresh on-disk database, no external collaborators configured.
    pub fn new() -> Self {
        Self::with_settings(settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open(&temp_dir.path().join("folio.db")).expect("Failed to open database");
        Self::build(Some(db), settings, Some(temp_dir))
    }

    /// No database at all.
    pub fn without_database() -> Self {
        Self::build(None, settings(), None)
    }

    fn build(db: Option<Database>, settings: Settings, temp_dir: Option<TempDir>) -> Self {
        let state: AppState =
            Arc::new(AppStateInner::new(db, settings).expect("Failed to build app state"));
        let server = TestServer::new(router(state.clone())).expect("Failed to create test server");
        Self {
            server,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Creates (or refreshes) a local user and mints their session cookie.
    pub async fn sign_in(&self, open_id: &str, name: &str) -> Session {
        self.state
            .sign_in(
                open_id,
                Some(IdentityFields {
                    name: Some(name.into()),
                    email: Some(format!("{open_id}@example.com")),
                    login_method: Some("email".into()),
                }),
            )
            .await
            .expect("Failed to upsert user");

        let lookup = open_id.to_string();
        let user = self
            .state
            .db(move |db| db.get_user_by_open_id(&lookup))
            .await
            .expect("Failed to load user")
            .expect("User missing after upsert");

        let token = self
            .state
            .sessions
            .create_session_token(open_id, name, ONE_YEAR_SECS)
            .expect("Failed to sign session");

        Session {
            user,
            cookie: format!("app_session_id={token}"),
        }
    }

    /// Signs in and creates a creative profile; returns the session and profile JSON.
    pub async fn creative(&self, open_id: &str, name: &str) -> (Session, Value) {
        let session = self.sign_in(open_id, name).await;
        let profile = self
            .mutation(
                "creative.updateProfile",
                json!({
                    "businessName": format!("{name} Studio"),
                    "categories": ["photography"],
                    "location": "Lagos",
                    "basePrice": 50_000,
                }),
                Some(&session),
            )
            .await;
        profile.assert_status_ok();
        let profile = data(&profile);
        (session, profile)
    }

    pub async fn query(&self, procedure: &str, input: Value, session: Option<&Session>) -> TestResponse {
        let mut request = self
            .server
            .get(&format!("/api/trpc/{procedure}"))
            .add_query_param("input", input.to_string());
        if let Some(session) = session {
            request = request.add_header("cookie", session.cookie.clone());
        }
        request.await
    }

    pub async fn mutation(&self, procedure: &str, input: Value, session: Option<&Session>) -> TestResponse {
        let mut request = self.server.post(&format!("/api/trpc/{procedure}")).json(&input);
        if let Some(session) = session {
            request = request.add_header("cookie", session.cookie.clone());
        }
        request.await
    }

    /// Books `creative_profile_id` as `client` with fixed times and prices.
    pub async fn book(&self, client: &Session, creative_profile_id: i64) -> Value {
        let response = self
            .mutation(
                "booking.create",
                json!({
                    "creativeId": creative_profile_id,
                    "serviceType": "Portrait session",
                    "description": "Outdoor, golden hour",
                    "bookingDate": "2026-11-20",
                    "startTime": "16:00",
                    "endTime": "18:30",
                    "location": "Lekki",
                    "totalPrice": 80_000,
                    "depositAmount": 20_000,
                }),
                Some(client),
            )
            .await;
        response.assert_status_ok();
        data(&response)
    }
}

/// `result.data.json` of a successful RPC response.
pub fn data(response: &TestResponse) -> Value {
    let body: Value = response.json();
    body["result"]["data"]["json"].clone()
}

/// `error.json` of a failed RPC response: `message`, numeric `code`, and
/// `data.{code, httpStatus, path}`.
pub fn error(response: &TestResponse) -> Value {
    let body: Value = response.json();
    body["error"]["json"].clone()
}
