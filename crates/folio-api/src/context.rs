//! Per-request caller resolution from the session cookie.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error};

use folio_types::models::{Role, User};

use crate::error::ApiError;
use crate::session::{COOKIE_NAME, is_secure_request};
use crate::state::AppState;

pub struct RequestContext {
    pub user: Option<User>,
    /// Outgoing cookies; procedures that sign the caller out edit this.
    pub jar: CookieJar,
    pub secure: bool,
}

impl RequestContext {
    /// Never fails: any problem with the session leaves the caller anonymous.
    pub async fn resolve(state: &AppState, headers: &HeaderMap, jar: CookieJar) -> Self {
        let user = match authenticate(state, &jar).await {
            Ok(user) => Some(user),
            Err(e) => {
                debug!("Anonymous request: {}", e);
                None
            }
        };
        Self {
            user,
            jar,
            secure: is_secure_request(headers),
        }
    }

    pub fn require_user(&self) -> Result<User, ApiError> {
        self.user.clone().ok_or(ApiError::Unauthorized)
    }

    pub fn require_admin(&self) -> Result<User, ApiError> {
        let user = self.require_user()?;
        if user.role != Role::Admin {
            return Err(ApiError::not_admin());
        }
        Ok(user)
    }
}

/// Verifies the session cookie and loads its user, syncing the user from the
/// identity provider on first sight.
pub async fn authenticate(state: &AppState, jar: &CookieJar) -> Result<User, ApiError> {
    let token = jar
        .get(COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Forbidden("Invalid session cookie".into()))?;

    let claims = state
        .sessions
        .verify(&token)
        .ok_or_else(|| ApiError::Forbidden("Invalid session cookie".into()))?;

    let open_id = claims.open_id.clone();
    let mut user = state.db(move |db| db.get_user_by_open_id(&open_id)).await?;

    if user.is_none() {
        let identity = state
            .identity
            .get_user_info_with_jwt(&token)
            .await
            .map_err(|e| {
                error!("Failed to sync user from identity provider: {}", e);
                ApiError::Forbidden("Failed to sync user info".into())
            })?;
        let open_id = identity
            .open_id
            .clone()
            .ok_or_else(|| ApiError::Forbidden("Failed to sync user info".into()))?;

        state.sign_in(&open_id, Some(identity.fields())).await?;
        user = state.db(move |db| db.get_user_by_open_id(&open_id)).await?;
    }

    let user = user.ok_or_else(|| ApiError::Forbidden("User not found".into()))?;
    state.sign_in(&user.open_id, None).await?;
    Ok(user)
}
