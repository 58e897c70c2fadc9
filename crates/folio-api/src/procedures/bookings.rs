use chrono::NaiveTime;
use tracing::info;

use folio_db::models::NewBooking;
use folio_types::api::{CreateBookingInput, IdInput, UpdateBookingStatusInput};
use folio_types::models::{Booking, User};

use super::{load_booking, profile_owner, require_non_negative};
use crate::error::ApiError;
use crate::state::AppState;

fn parse_clock(field: &str, value: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ApiError::BadRequest(format!("{field} must be a HH:mm time")))
}

/// Whole minutes from `start` to `end`, both same-day `HH:mm` clock times.
pub fn booking_duration_minutes(start: &str, end: &str) -> Result<i64, ApiError> {
    let start = parse_clock("startTime", start)?;
    let end = parse_clock("endTime", end)?;
    if end <= start {
        return Err(ApiError::BadRequest("endTime must be after startTime".into()));
    }
    Ok((end - start).num_minutes())
}

pub async fn create(
    state: &AppState,
    me: &User,
    input: CreateBookingInput,
) -> Result<Booking, ApiError> {
    let duration = booking_duration_minutes(&input.start_time, &input.end_time)?;
    require_non_negative("totalPrice", input.total_price)?;
    require_non_negative("depositAmount", input.deposit_amount)?;
    if input.deposit_amount > input.total_price {
        return Err(ApiError::BadRequest("depositAmount cannot exceed totalPrice".into()));
    }

    if profile_owner(state, input.creative_id).await?.is_none() {
        return Err(ApiError::not_found("Creative profile"));
    }

    let booking = NewBooking {
        client_id: me.id,
        creative_id: input.creative_id,
        service_type: input.service_type,
        description: input.description,
        booking_date: input.booking_date,
        start_time: input.start_time,
        end_time: input.end_time,
        duration,
        location: input.location,
        total_price: input.total_price,
        deposit_amount: input.deposit_amount,
    };
    let booking = state.db(move |db| db.insert_booking(&booking)).await?;
    info!(
        "Booking {} created by user {} for creative {}",
        booking.id, me.id, booking.creative_id
    );
    Ok(booking)
}

pub async fn get_my_bookings(state: &AppState, me: &User) -> Result<Vec<Booking>, ApiError> {
    let user_id = me.id;
    state.db_or_default(move |db| db.get_bookings_by_client(user_id)).await
}

/// Bookings made against the caller's profile; empty when they have none.
pub async fn get_creative_bookings(state: &AppState, me: &User) -> Result<Vec<Booking>, ApiError> {
    let user_id = me.id;
    state
        .db_or_default(move |db| match db.get_profile_by_user(user_id)? {
            Some(profile) => db.get_bookings_by_creative(profile.id),
            None => Ok(Vec::new()),
        })
        .await
}

pub async fn get_by_id(state: &AppState, input: IdInput) -> Result<Option<Booking>, ApiError> {
    state.db_or_default(move |db| db.get_booking(input.id)).await
}

/// Either party may set any status.
pub async fn update_status(
    state: &AppState,
    me: &User,
    input: UpdateBookingStatusInput,
) -> Result<Booking, ApiError> {
    let booking = load_booking(state, input.booking_id).await?;
    let creative_user = profile_owner(state, booking.creative_id).await?;
    if booking.client_id != me.id && creative_user != Some(me.id) {
        return Err(ApiError::not_owner());
    }

    let status = input.status;
    let updated = state
        .db(move |db| db.update_booking_status(booking.id, status))
        .await?
        .ok_or_else(|| ApiError::not_found("Booking"))?;
    info!("Booking {} is now {} (by user {})", updated.id, status, me.id);
    Ok(updated)
}
