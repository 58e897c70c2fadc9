use tracing::info;

use folio_db::models::NewTransaction;
use folio_types::api::InitiatePaymentInput;
use folio_types::models::{Transaction, User};

use super::{load_booking, profile_owner};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_transactions(state: &AppState, me: &User) -> Result<Vec<Transaction>, ApiError> {
    let user_id = me.id;
    state
        .db_or_default(move |db| db.get_transactions_by_user(user_id))
        .await
}

/// Records a pending deposit from the booking's client to its creative. No
/// money moves here.
pub async fn initiate_payment(
    state: &AppState,
    me: &User,
    input: InitiatePaymentInput,
) -> Result<Transaction, ApiError> {
    if input.amount <= 0 {
        return Err(ApiError::BadRequest("amount must be positive".into()));
    }

    let booking = load_booking(state, input.booking_id).await?;
    if booking.client_id != me.id {
        return Err(ApiError::not_owner());
    }
    let payee_id = profile_owner(state, booking.creative_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Creative profile"))?;

    let tx = NewTransaction {
        booking_id: booking.id,
        payer_id: me.id,
        payee_id,
        amount: input.amount,
        payment_method: input.payment_method,
    };
    let tx = state.db(move |db| db.insert_transaction(&tx)).await?;
    info!(
        "Transaction {} pending: {} via {} for booking {}",
        tx.id, tx.amount, tx.payment_method, booking.id
    );
    Ok(tx)
}
