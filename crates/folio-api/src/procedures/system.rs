use folio_types::api::{HealthInput, HealthResponse, NotifyOwnerInput, SuccessResponse};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn health(input: HealthInput) -> Result<HealthResponse, ApiError> {
    if !(input.timestamp >= 0.0) {
        return Err(ApiError::BadRequest("timestamp cannot be negative".into()));
    }
    Ok(HealthResponse { ok: true })
}

/// `success` is false when the notification service refused or was
/// unreachable.
pub async fn notify_owner(
    state: &AppState,
    input: NotifyOwnerInput,
) -> Result<SuccessResponse, ApiError> {
    let delivered = state.notifier.notify_owner(&input.title, &input.content).await?;
    Ok(SuccessResponse { success: delivered })
}
