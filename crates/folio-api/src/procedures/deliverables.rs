use tracing::info;

use folio_db::models::NewDeliverable;
use folio_types::api::{BookingIdInput, UploadDeliverableInput};
use folio_types::models::{Deliverable, User};

use super::{load_booking, profile_owner, require_non_negative};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_by_booking(
    state: &AppState,
    input: BookingIdInput,
) -> Result<Vec<Deliverable>, ApiError> {
    state
        .db_or_default(move |db| db.get_booking_deliverables(input.booking_id))
        .await
}

/// Only the booked creative can attach files to a booking.
pub async fn upload(
    state: &AppState,
    me: &User,
    input: UploadDeliverableInput,
) -> Result<Deliverable, ApiError> {
    require_non_negative("fileSize", input.file_size)?;

    let booking = load_booking(state, input.booking_id).await?;
    if profile_owner(state, booking.creative_id).await? != Some(me.id) {
        return Err(ApiError::not_owner());
    }

    let deliverable = NewDeliverable {
        booking_id: booking.id,
        creative_id: booking.creative_id,
        client_id: booking.client_id,
        title: input.title,
        description: input.description,
        file_url: input.file_url,
        file_type: input.file_type,
        file_size: input.file_size,
    };
    let stored = state.db(move |db| db.insert_deliverable(&deliverable)).await?;
    info!("Deliverable {} uploaded to booking {}", stored.id, stored.booking_id);
    Ok(stored)
}
