//! Identity provider client and the browser-facing OAuth callback.

use std::time::Duration;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use folio_db::models::IdentityFields;

use crate::session::{ONE_YEAR_SECS, is_secure_request, session_cookie};
use crate::state::AppState;

const EXCHANGE_TOKEN_PATH: &str = "/webdev.v1.WebDevAuthPublicService/ExchangeToken";
const GET_USER_INFO_PATH: &str = "/webdev.v1.WebDevAuthPublicService/GetUserInfo";
const GET_USER_INFO_WITH_JWT_PATH: &str = "/webdev.v1.WebDevAuthPublicService/GetUserInfoWithJwt";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("OAUTH_SERVER_URL is not configured")]
    NotConfigured,

    #[error("state is not a base64-encoded redirect URI")]
    InvalidState,

    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity provider returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeTokenRequest<'a> {
    client_id: &'a str,
    grant_type: &'a str,
    code: &'a str,
    redirect_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUserInfo {
    #[serde(default)]
    open_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    platforms: Vec<Value>,
}

/// Identity as reported by the provider, with the login method resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub open_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub login_method: Option<String>,
}

impl Identity {
    pub fn fields(&self) -> IdentityFields {
        IdentityFields {
            name: self.name.clone().filter(|n| !n.is_empty()),
            email: self.email.clone(),
            login_method: self.login_method.clone(),
        }
    }
}

impl From<RawUserInfo> for Identity {
    fn from(raw: RawUserInfo) -> Self {
        let login_method = derive_login_method(&raw.platforms, raw.platform.as_deref());
        Self {
            open_id: raw.open_id.filter(|id| !id.is_empty()),
            name: raw.name,
            email: raw.email,
            login_method,
        }
    }
}

/// An explicit platform wins; otherwise the best-known registered platform,
/// then the first listed one lowercased.
pub fn derive_login_method(platforms: &[Value], explicit: Option<&str>) -> Option<String> {
    if let Some(platform) = explicit.filter(|p| !p.is_empty()) {
        return Some(platform.to_string());
    }

    let names: Vec<&str> = platforms.iter().filter_map(Value::as_str).collect();
    let has = |name: &str| names.contains(&name);

    let known = if has("REGISTERED_PLATFORM_EMAIL") {
        Some("email")
    } else if has("REGISTERED_PLATFORM_GOOGLE") {
        Some("google")
    } else if has("REGISTERED_PLATFORM_APPLE") {
        Some("apple")
    } else if has("REGISTERED_PLATFORM_MICROSOFT") || has("REGISTERED_PLATFORM_AZURE") {
        Some("microsoft")
    } else if has("REGISTERED_PLATFORM_GITHUB") {
        Some("github")
    } else {
        None
    };

    known
        .map(str::to_string)
        .or_else(|| names.first().map(|first| first.to_lowercase()))
}

pub fn decode_state(state: &str) -> Result<String, IdentityError> {
    let bytes = B64.decode(state).map_err(|_| IdentityError::InvalidState)?;
    String::from_utf8(bytes).map_err(|_| IdentityError::InvalidState)
}

#[derive(Debug, Clone)]
pub struct IdentityClient {
    client: Client,
    base_url: Option<String>,
    app_id: String,
}

impl IdentityClient {
    pub fn new(base_url: Option<String>, app_id: impl Into<String>) -> Result<Self, IdentityError> {
        let base_url = base_url
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/').to_string());
        match &base_url {
            Some(url) => info!("OAuth identity provider: {}", url),
            None => warn!("OAUTH_SERVER_URL is not configured; sign-in is unavailable"),
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url,
            app_id: app_id.into(),
        })
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, IdentityError> {
        let base_url = self.base_url.as_ref().ok_or(IdentityError::NotConfigured)?;
        let response = self
            .client
            .post(format!("{base_url}{path}"))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Status { status: status.as_u16(), body });
        }
        Ok(response.json::<R>().await?)
    }

    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        state: &str,
    ) -> Result<TokenResponse, IdentityError> {
        let request = ExchangeTokenRequest {
            client_id: &self.app_id,
            grant_type: "authorization_code",
            code,
            redirect_uri: decode_state(state)?,
        };
        self.post(EXCHANGE_TOKEN_PATH, &request).await
    }

    pub async fn get_user_info(&self, access_token: &str) -> Result<Identity, IdentityError> {
        let raw: RawUserInfo = self
            .post(GET_USER_INFO_PATH, &json!({ "accessToken": access_token }))
            .await?;
        Ok(raw.into())
    }

    /// Looks the user up with a session token minted elsewhere in the project.
    pub async fn get_user_info_with_jwt(&self, jwt: &str) -> Result<Identity, IdentityError> {
        let raw: RawUserInfo = self
            .post(
                GET_USER_INFO_WITH_JWT_PATH,
                &json!({ "jwtToken": jwt, "projectId": self.app_id }),
            )
            .await?;
        Ok(raw.into())
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

fn callback_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// `GET /api/oauth/callback?code&state`: completes sign-in, sets the session
/// cookie and redirects home.
pub async fn oauth_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let (Some(code), Some(oauth_state)) = (
        query.code.filter(|c| !c.is_empty()),
        query.state.filter(|s| !s.is_empty()),
    ) else {
        return callback_error(StatusCode::BAD_REQUEST, "code and state are required");
    };

    let token = match state.identity.exchange_code_for_token(&code, &oauth_state).await {
        Ok(token) => token,
        Err(e) => {
            error!("OAuth callback failed: {}", e);
            return callback_error(StatusCode::INTERNAL_SERVER_ERROR, "OAuth callback failed");
        }
    };

    let identity = match state.identity.get_user_info(&token.access_token).await {
        Ok(identity) => identity,
        Err(e) => {
            error!("OAuth callback failed: {}", e);
            return callback_error(StatusCode::INTERNAL_SERVER_ERROR, "OAuth callback failed");
        }
    };

    let Some(open_id) = identity.open_id.clone() else {
        return callback_error(StatusCode::BAD_REQUEST, "openId missing from user info");
    };

    if let Err(e) = state.sign_in(&open_id, Some(identity.fields())).await {
        error!("OAuth callback failed: {}", e);
        return callback_error(StatusCode::INTERNAL_SERVER_ERROR, "OAuth callback failed");
    }

    let name = identity.name.as_deref().unwrap_or_default();
    let session = match state.sessions.create_session_token(&open_id, name, ONE_YEAR_SECS) {
        Ok(token) => token,
        Err(e) => {
            error!("OAuth callback failed: {}", e);
            return callback_error(StatusCode::INTERNAL_SERVER_ERROR, "OAuth callback failed");
        }
    };

    info!("{} signed in", open_id);
    let jar = jar.add(session_cookie(session, is_secure_request(&headers)));
    (StatusCode::FOUND, jar, [(header::LOCATION, "/")]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_platform_wins() {
        let platforms = vec![json!("REGISTERED_PLATFORM_GOOGLE")];
        assert_eq!(
            derive_login_method(&platforms, Some("apple")).as_deref(),
            Some("apple")
        );
    }

    #[test]
    fn known_platforms_in_priority_order() {
        let platforms = vec![
            json!("REGISTERED_PLATFORM_GITHUB"),
            json!("REGISTERED_PLATFORM_GOOGLE"),
        ];
        assert_eq!(derive_login_method(&platforms, None).as_deref(), Some("google"));

        let azure = vec![json!("REGISTERED_PLATFORM_AZURE")];
        assert_eq!(derive_login_method(&azure, Some("")).as_deref(), Some("microsoft"));
    }

    #[test]
    fn unknown_platform_is_lowercased_and_non_strings_skipped() {
        let platforms = vec![json!(7), json!("REGISTERED_PLATFORM_SSO")];
        assert_eq!(
            derive_login_method(&platforms, None).as_deref(),
            Some("registered_platform_sso")
        );
        assert_eq!(derive_login_method(&[], None), None);
    }

    #[test]
    fn state_is_base64_redirect_uri() {
        let state = B64.encode("https://folio.example.com/api/oauth/callback");
        assert_eq!(
            decode_state(&state).unwrap(),
            "https://folio.example.com/api/oauth/callback"
        );
        assert!(matches!(decode_state("%%%"), Err(IdentityError::InvalidState)));
    }
}
