use folio_db::models::NewAvailabilitySlot;
use folio_types::api::{AddAvailabilityInput, CreativeIdInput};
use folio_types::models::{AvailabilitySlot, User};

use super::bookings::booking_duration_minutes;
use super::require_profile;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_creative_availability(
    state: &AppState,
    input: CreativeIdInput,
) -> Result<Vec<AvailabilitySlot>, ApiError> {
    state
        .db_or_default(move |db| db.get_availability(input.creative_id))
        .await
}

pub async fn add_availability(
    state: &AppState,
    me: &User,
    input: AddAvailabilityInput,
) -> Result<AvailabilitySlot, ApiError> {
    // Same clock rules as bookings.
    booking_duration_minutes(&input.start_time, &input.end_time)?;
    let profile = require_profile(state, me.id).await?;

    let slot = NewAvailabilitySlot {
        creative_id: profile.id,
        date: input.date,
        start_time: input.start_time,
        end_time: input.end_time,
    };
    state.db(move |db| db.insert_availability(&slot)).await
}
