//! Signed first-party session cookie.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{debug, warn};

use folio_types::api::SessionClaims;

use crate::error::ApiError;

pub const COOKIE_NAME: &str = "app_session_id";
pub const ONE_YEAR_SECS: i64 = 60 * 60 * 24 * 365;

/// Signs and verifies HS256 session tokens. Without a secret every token is
/// rejected and none can be issued.
#[derive(Clone)]
pub struct SessionSigner {
    secret: Option<String>,
    app_id: String,
}

impl SessionSigner {
    pub fn new(secret: Option<String>, app_id: impl Into<String>) -> Self {
        let secret = secret.filter(|s| !s.is_empty());
        if secret.is_none() {
            warn!("JWT_SECRET is not set; sessions cannot be issued or verified");
        }
        Self {
            secret,
            app_id: app_id.into(),
        }
    }

    pub fn create_session_token(
        &self,
        open_id: &str,
        name: &str,
        expires_in_secs: i64,
    ) -> Result<String, ApiError> {
        let secret = self
            .secret
            .as_ref()
            .ok_or_else(|| ApiError::Internal("JWT_SECRET is not configured".into()))?;

        let claims = SessionClaims {
            open_id: open_id.to_string(),
            app_id: self.app_id.clone(),
            name: name.to_string(),
            exp: (Utc::now().timestamp() + expires_in_secs) as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("failed to sign session: {e}")))
    }

    /// Returns the claims when the token is well signed, unexpired and carries
    /// a non-empty openId, appId and name.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        let secret = self.secret.as_ref()?;
        let validation = Validation::new(Algorithm::HS256);
        let data = match decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => data,
            Err(e) => {
                warn!("Session verification failed: {}", e);
                return None;
            }
        };

        let claims = data.claims;
        if claims.open_id.is_empty() || claims.app_id.is_empty() || claims.name.is_empty() {
            debug!("Session payload missing required fields");
            return None;
        }
        Some(claims)
    }
}

/// True when the request reached the edge over HTTPS.
pub fn is_secure_request(headers: &HeaderMap) -> bool {
    headers
        .get_all("x-forwarded-proto")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::None)
        .secure(secure)
        .max_age(time::Duration::seconds(ONE_YEAR_SECS))
        .build()
}

/// Removal cookie: same attributes, already expired.
pub fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((COOKIE_NAME, ""))
        .http_only(true)
        .path("/")
        .same_site(SameSite::None)
        .secure(secure)
        .build();
    cookie.make_removal();
    cookie
}
