use tracing::info;

use folio_db::is_unique_violation;
use folio_db::models::NewReview;
use folio_types::api::{CreateReviewInput, CreativeIdInput};
use folio_types::models::{BookingStatus, Review, User};

use super::load_booking;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_creative_reviews(
    state: &AppState,
    input: CreativeIdInput,
) -> Result<Vec<Review>, ApiError> {
    state
        .db_or_default(move |db| db.get_creative_reviews(input.creative_id))
        .await
}

pub async fn get_average_rating(state: &AppState, input: CreativeIdInput) -> Result<f64, ApiError> {
    state
        .db_or_default(move |db| db.get_average_rating(input.creative_id))
        .await
}

/// The booking's client reviews a completed booking once; the profile's
/// rating summary is recomputed afterwards.
pub async fn create(
    state: &AppState,
    me: &User,
    input: CreateReviewInput,
) -> Result<Review, ApiError> {
    if !(1..=5).contains(&input.rating) {
        return Err(ApiError::BadRequest("rating must be between 1 and 5".into()));
    }

    let booking = load_booking(state, input.booking_id).await?;
    if booking.client_id != me.id {
        return Err(ApiError::not_owner());
    }
    if booking.creative_id != input.creative_id {
        return Err(ApiError::BadRequest("creativeId does not match the booking".into()));
    }
    if booking.status != BookingStatus::Completed {
        return Err(ApiError::BadRequest("Only completed bookings can be reviewed".into()));
    }

    let review = NewReview {
        booking_id: booking.id,
        reviewer_id: me.id,
        creative_id: booking.creative_id,
        rating: input.rating,
        title: input.title,
        comment: input.comment,
    };
    // The UNIQUE booking_id column decides between concurrent submissions.
    let Some((stored, (average, total))) = state
        .db(move |db| {
            let stored = match db.insert_review(&review) {
                Ok(stored) => stored,
                Err(e) if is_unique_violation(&e) => return Ok(None),
                Err(e) => return Err(e),
            };
            let summary = db.refresh_profile_rating(stored.creative_id)?;
            Ok(Some((stored, summary)))
        })
        .await?
    else {
        return Err(ApiError::Conflict("This booking has already been reviewed".into()));
    };
    info!(
        "Review {} on creative {}: average now {:.2} over {}",
        stored.id, stored.creative_id, average, total
    );
    Ok(stored)
}
