//! `/api/trpc/{procedure}`: one HTTP path for every procedure. Queries are
//! GETs with the input JSON in `?input=`, mutations are POSTs with a JSON
//! body. Payloads travel in the tRPC superjson wrapping (`{"json": ...}`);
//! unwrapped inputs are accepted too.

use std::future::Future;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use folio_types::api::SuccessResponse;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::procedures::{
    ai, availability, bookings, creative, deliverables, gigs, messaging, payments, portfolio,
    reviews, system,
};
use crate::session::cleared_session_cookie;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Query,
    Mutation,
}

impl ProcedureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

/// Kind of every registered procedure; `None` for unknown paths.
pub fn procedure_kind(path: &str) -> Option<ProcedureKind> {
    use ProcedureKind::{Mutation, Query};

    let kind = match path {
        "system.health"
        | "auth.me"
        | "creative.getProfile"
        | "creative.getById"
        | "creative.search"
        | "booking.getMyBookings"
        | "booking.getCreativeBookings"
        | "booking.getById"
        | "messaging.getConversations"
        | "messaging.getMessages"
        | "deliverable.getByBooking"
        | "review.getCreativeReviews"
        | "review.getAverageRating"
        | "gig.listPosts"
        | "gig.getApplications"
        | "portfolio.getCreativePortfolio"
        | "payment.getTransactions"
        | "availability.getCreativeAvailability" => Query,

        "system.notifyOwner"
        | "auth.logout"
        | "creative.updateProfile"
        | "booking.create"
        | "booking.updateStatus"
        | "messaging.sendMessage"
        | "messaging.startConversation"
        | "deliverable.upload"
        | "review.create"
        | "gig.createPost"
        | "gig.applyForGig"
        | "portfolio.addItem"
        | "payment.initiatePayment"
        | "availability.addAvailability"
        | "ai.generatePricingSuggestion"
        | "ai.generateCaption"
        | "ai.generateResponseTemplate"
        | "ai.generateProfileBio"
        | "ai.generateServiceDescription"
        | "ai.analyzeProfile" => Mutation,

        _ => return None,
    };
    Some(kind)
}

#[derive(Debug, Deserialize)]
pub struct RpcQuery {
    pub input: Option<String>,
}

pub async fn query(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<RpcQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let input = match params.input.as_deref() {
        None | Some("") => Ok(Value::Null),
        Some(raw) => serde_json::from_str(raw)
            .map(unwrap_superjson)
            .map_err(|e| ApiError::BadRequest(format!("Invalid input JSON: {e}"))),
    };
    respond(state, path, ProcedureKind::Query, input, headers, jar).await
}

pub async fn mutation(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Bytes,
) -> Response {
    let input = if body.iter().all(u8::is_ascii_whitespace) {
        Ok(Value::Null)
    } else {
        serde_json::from_slice(&body)
            .map(unwrap_superjson)
            .map_err(|e| ApiError::BadRequest(format!("Invalid input JSON: {e}")))
    };
    respond(state, path, ProcedureKind::Mutation, input, headers, jar).await
}

async fn respond(
    state: AppState,
    path: String,
    kind: ProcedureKind,
    input: Result<Value, ApiError>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let mut ctx = RequestContext::resolve(&state, &headers, jar).await;

    let result = match (procedure_kind(&path), input) {
        (None, _) => Err(ApiError::NotFound(format!(
            "No \"{}\"-procedure on path \"{}\"",
            kind.as_str(),
            path
        ))),
        (Some(expected), _) if expected != kind => Err(ApiError::MethodNotSupported(format!(
            "Unsupported {} for {} procedure",
            if kind == ProcedureKind::Query { "GET" } else { "POST" },
            expected.as_str()
        ))),
        (Some(_), Err(e)) => Err(e),
        (Some(_), Ok(input)) => dispatch(&state, &mut ctx, &path, input).await,
    };

    match result {
        Ok(data) => {
            (ctx.jar, Json(json!({ "result": { "data": { "json": data } } }))).into_response()
        }
        Err(err) => {
            if err.status().is_server_error() {
                warn!("{} failed: {}", path, err);
            } else {
                debug!("{} rejected: {}", path, err);
            }
            (err.status(), ctx.jar, Json(err.body(Some(&path)))).into_response()
        }
    }
}

/// `{"json": x, "meta"?: ...}` becomes `x`. Anything else is taken as the
/// input itself.
fn unwrap_superjson(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.contains_key("json") && map.keys().all(|k| k == "json" || k == "meta") =>
        {
            map.remove("json").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Parses the input, runs the procedure and serializes its output.
async fn call<I, O, F, Fut>(input: Value, procedure: F) -> Result<Value, ApiError>
where
    I: DeserializeOwned,
    O: Serialize,
    F: FnOnce(I) -> Fut,
    Fut: Future<Output = Result<O, ApiError>>,
{
    let input = if input.is_null() { Value::Object(Map::new()) } else { input };
    let input: I = serde_json::from_value(input).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let output = procedure(input).await?;
    serde_json::to_value(output)
        .map_err(|e| ApiError::Internal(format!("failed to serialize output: {e}")))
}

/// Input shape for procedures that take none. Anything sent is ignored.
#[derive(Debug, Deserialize)]
struct NoInput {}

async fn dispatch(
    state: &AppState,
    ctx: &mut RequestContext,
    path: &str,
    input: Value,
) -> Result<Value, ApiError> {
    match path {
        // -- system / auth --
        "system.health" => call(input, system::health).await,
        "system.notifyOwner" => {
            ctx.require_admin()?;
            call(input, |i| system::notify_owner(state, i)).await
        }
        "auth.me" => {
            let user = ctx.user.clone();
            call(input, |_: NoInput| async move { Ok::<_, ApiError>(user) }).await
        }
        "auth.logout" => {
            ctx.jar = ctx.jar.clone().add(cleared_session_cookie(ctx.secure));
            call(input, |_: NoInput| async {
                Ok::<_, ApiError>(SuccessResponse { success: true })
            })
            .await
        }

        // -- creative profiles --
        "creative.getProfile" => {
            let me = ctx.require_user()?;
            call(input, |_: NoInput| creative::get_profile(state, &me)).await
        }
        "creative.getById" => call(input, |i| creative::get_by_id(state, i)).await,
        "creative.updateProfile" => {
            let me = ctx.require_user()?;
            call(input, |i| creative::update_profile(state, &me, i)).await
        }
        "creative.search" => call(input, |i| creative::search(state, i)).await,

        // -- bookings --
        "booking.create" => {
            let me = ctx.require_user()?;
            call(input, |i| bookings::create(state, &me, i)).await
        }
        "booking.getMyBookings" => {
            let me = ctx.require_user()?;
            call(input, |_: NoInput| bookings::get_my_bookings(state, &me)).await
        }
        "booking.getCreativeBookings" => {
            let me = ctx.require_user()?;
            call(input, |_: NoInput| bookings::get_creative_bookings(state, &me)).await
        }
        "booking.getById" => call(input, |i| bookings::get_by_id(state, i)).await,
        "booking.updateStatus" => {
            let me = ctx.require_user()?;
            call(input, |i| bookings::update_status(state, &me, i)).await
        }

        // -- messaging --
        "messaging.getConversations" => {
            let me = ctx.require_user()?;
            call(input, |_: NoInput| messaging::get_conversations(state, &me)).await
        }
        "messaging.getMessages" => {
            let me = ctx.require_user()?;
            call(input, |i| messaging::get_messages(state, &me, i)).await
        }
        "messaging.sendMessage" => {
            let me = ctx.require_user()?;
            call(input, |i| messaging::send_message(state, &me, i)).await
        }
        "messaging.startConversation" => {
            let me = ctx.require_user()?;
            call(input, |i| messaging::start_conversation(state, &me, i)).await
        }

        // -- deliverables --
        "deliverable.getByBooking" => call(input, |i| deliverables::get_by_booking(state, i)).await,
        "deliverable.upload" => {
            let me = ctx.require_user()?;
            call(input, |i| deliverables::upload(state, &me, i)).await
        }

        // -- reviews --
        "review.getCreativeReviews" => {
            call(input, |i| reviews::get_creative_reviews(state, i)).await
        }
        "review.getAverageRating" => call(input, |i| reviews::get_average_rating(state, i)).await,
        "review.create" => {
            let me = ctx.require_user()?;
            call(input, |i| reviews::create(state, &me, i)).await
        }

        // -- gig board --
        "gig.listPosts" => call(input, |i| gigs::list_posts(state, i)).await,
        "gig.createPost" => {
            let me = ctx.require_user()?;
            call(input, |i| gigs::create_post(state, &me, i)).await
        }
        "gig.applyForGig" => {
            let me = ctx.require_user()?;
            call(input, |i| gigs::apply_for_gig(state, &me, i)).await
        }
        "gig.getApplications" => {
            ctx.require_user()?;
            call(input, |i| gigs::get_applications(state, i)).await
        }

        // -- portfolio --
        "portfolio.getCreativePortfolio" => {
            call(input, |i| portfolio::get_creative_portfolio(state, i)).await
        }
        "portfolio.addItem" => {
            let me = ctx.require_user()?;
            call(input, |i| portfolio::add_item(state, &me, i)).await
        }

        // -- payments --
        "payment.getTransactions" => {
            let me = ctx.require_user()?;
            call(input, |_: NoInput| payments::get_transactions(state, &me)).await
        }
        "payment.initiatePayment" => {
            let me = ctx.require_user()?;
            call(input, |i| payments::initiate_payment(state, &me, i)).await
        }

        // -- availability --
        "availability.getCreativeAvailability" => {
            call(input, |i| availability::get_creative_availability(state, i)).await
        }
        "availability.addAvailability" => {
            let me = ctx.require_user()?;
            call(input, |i| availability::add_availability(state, &me, i)).await
        }

        // -- AI assist --
        "ai.generatePricingSuggestion" => {
            ctx.require_user()?;
            call(input, |i| ai::generate_pricing_suggestion(state, i)).await
        }
        "ai.generateCaption" => {
            ctx.require_user()?;
            call(input, |i| ai::generate_caption(state, i)).await
        }
        "ai.generateResponseTemplate" => {
            ctx.require_user()?;
            call(input, |i| ai::generate_response_template(state, i)).await
        }
        "ai.generateProfileBio" => {
            ctx.require_user()?;
            call(input, |i| ai::generate_profile_bio(state, i)).await
        }
        "ai.generateServiceDescription" => {
            ctx.require_user()?;
            call(input, |i| ai::generate_service_description(state, i)).await
        }
        "ai.analyzeProfile" => {
            ctx.require_user()?;
            call(input, |i| ai::analyze_profile(state, i)).await
        }

        _ => Err(ApiError::NotFound(format!("No procedure on path \"{path}\""))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_procedure_has_a_kind() {
        assert_eq!(procedure_kind("booking.getById"), Some(ProcedureKind::Query));
        assert_eq!(procedure_kind("booking.create"), Some(ProcedureKind::Mutation));
        assert_eq!(procedure_kind("ai.analyzeProfile"), Some(ProcedureKind::Mutation));
        assert_eq!(procedure_kind("booking.delete"), None);
        assert_eq!(procedure_kind("booking"), None);
    }

    #[test]
    fn superjson_inputs_are_unwrapped() {
        assert_eq!(unwrap_superjson(json!({ "json": { "id": 3 } })), json!({ "id": 3 }));
        assert_eq!(
            unwrap_superjson(json!({ "json": null, "meta": { "values": ["undefined"] } })),
            Value::Null
        );
        assert_eq!(unwrap_superjson(json!({ "id": 3 })), json!({ "id": 3 }));
        assert_eq!(
            unwrap_superjson(json!({ "json": 1, "other": 2 })),
            json!({ "json": 1, "other": 2 })
        );
    }

    #[tokio::test]
    async fn null_input_becomes_empty_object() {
        #[derive(Deserialize)]
        struct Paged {
            limit: Option<u32>,
        }
        let out = call(Value::Null, |p: Paged| async move { Ok::<_, ApiError>(p.limit) }).await.unwrap();
        assert_eq!(out, Value::Null);
    }

    #[tokio::test]
    async fn bad_input_is_bad_request() {
        #[derive(Debug, Deserialize)]
        struct Needs {
            #[allow(dead_code)]
            id: i64,
        }
        let err = call(json!({ "id": "seven" }), |_: Needs| async { Ok::<_, ApiError>(()) })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }
}
