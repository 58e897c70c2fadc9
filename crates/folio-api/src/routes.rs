use axum::Json;
use axum::Router;
use axum::routing::get;
use serde_json::{Value, json};

use crate::oauth::oauth_callback;
use crate::rpc;
use crate::state::AppState;

/// Every HTTP route the service exposes. Cross-cutting layers (CORS, tracing,
/// body limits) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/trpc/{procedure}", get(rpc::query).post(rpc::mutation))
        .route("/api/oauth/callback", get(oauth_callback))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
