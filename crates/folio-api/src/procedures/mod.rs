//! Procedure implementations, one module per router namespace. Each takes the
//! app state, the authenticated caller where the procedure needs one, and its
//! typed input.

pub mod ai;
pub mod availability;
pub mod bookings;
pub mod creative;
pub mod deliverables;
pub mod gigs;
pub mod messaging;
pub mod payments;
pub mod portfolio;
pub mod reviews;
pub mod system;

use folio_types::models::{Booking, CreativeProfile};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// `(limit, offset)` with defaults applied and the limit capped. A zero limit
/// means the default page size.
pub(crate) fn page(limit: Option<u32>, offset: Option<u32>) -> (u32, u32) {
    (
        limit
            .filter(|&limit| limit > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE),
        offset.unwrap_or(0),
    )
}

/// The caller's creative profile; writes that act on it fail without one.
pub(crate) async fn require_profile(
    state: &AppState,
    user_id: i64,
) -> Result<CreativeProfile, ApiError> {
    state
        .db(move |db| db.get_profile_by_user(user_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Creative profile"))
}

pub(crate) async fn load_booking(state: &AppState, booking_id: i64) -> Result<Booking, ApiError> {
    state
        .db(move |db| db.get_booking(booking_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Booking"))
}

/// User id behind a creative profile id, if the profile exists.
pub(crate) async fn profile_owner(
    state: &AppState,
    profile_id: i64,
) -> Result<Option<i64>, ApiError> {
    let profile = state.db(move |db| db.get_profile(profile_id)).await?;
    Ok(profile.map(|p| p.user_id))
}

pub(crate) fn require_non_negative(field: &str, amount: i64) -> Result<(), ApiError> {
    if amount < 0 {
        return Err(ApiError::BadRequest(format!("{field} cannot be negative")));
    }
    Ok(())
}
