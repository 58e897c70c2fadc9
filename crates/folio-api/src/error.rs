//! API error type shared by the RPC dispatcher and the plain HTTP routes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub const NOT_ADMIN_MESSAGE: &str = "You do not have required permission (10002)";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// No usable session on a procedure that needs one.
    #[error("Please login (10001)")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database not available")]
    DatabaseUnavailable,

    #[error("{0}")]
    MethodNotSupported(String),

    /// A hosted collaborator (identity provider, LLM) answered badly.
    #[error("{0}")]
    Upstream(String),

    /// Logged in full, reported to the caller as a generic message.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Ownership check failure on a row the caller does not own.
    pub fn not_owner() -> Self {
        Self::Forbidden("Unauthorized".into())
    }

    pub fn not_admin() -> Self {
        Self::Forbidden(NOT_ADMIN_MESSAGE.into())
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DatabaseUnavailable | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MethodNotSupported(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Symbolic RPC error code, as carried in `error.json.data.code`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::DatabaseUnavailable | Self::Internal(_) => "INTERNAL_SERVER_ERROR",
            Self::MethodNotSupported(_) => "METHOD_NOT_SUPPORTED",
            Self::Upstream(_) => "BAD_GATEWAY",
        }
    }

    /// JSON-RPC number for `code`, as carried in `error.json.code`.
    pub fn rpc_code(&self) -> i32 {
        match self {
            Self::BadRequest(_) => -32600,
            Self::Unauthorized => -32001,
            Self::Forbidden(_) => -32003,
            Self::NotFound(_) => -32004,
            Self::MethodNotSupported(_) => -32005,
            Self::Conflict(_) => -32009,
            Self::DatabaseUnavailable | Self::Internal(_) | Self::Upstream(_) => -32603,
        }
    }

    /// Message safe to show the caller.
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(msg) => {
                error!(error = %msg, "Internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn body(&self, path: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: Wire {
                json: ErrorBody {
                    message: self.public_message(),
                    code: self.rpc_code(),
                    data: ErrorData {
                        code: self.code(),
                        http_status: self.status().as_u16(),
                        path: path.map(str::to_string),
                    },
                },
            },
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// `{"error":{"json":{message, code, data:{code, httpStatus, path}}}}`, the
/// shape tRPC clients using the superjson transformer decode.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: Wire<ErrorBody>,
}

/// Superjson wrapping. Plain JSON values need no `meta`.
#[derive(Debug, Serialize)]
pub struct Wire<T> {
    pub json: T,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: i32,
    pub data: ErrorData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    pub code: &'static str,
    pub http_status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body(None))).into_response()
    }
}
