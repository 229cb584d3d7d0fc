use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

/// Failures a proxy route can report to its caller.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or illegal parameter; the message names it and is shown as-is.
    #[error("{0}")]
    InvalidRequest(String),

    /// Provider unreachable, non-2xx or unparsable. Only `message` reaches the caller.
    #[error("{message}")]
    Upstream {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest(message.into())
    }

    pub fn upstream(message: &'static str, source: anyhow::Error) -> Self {
        ApiError::Upstream { message, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => {
                warn!("Rejecting request: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            ApiError::Upstream { message, source } => {
                error!("{}: {:#}", message, source);
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        };
        error_response(status, &message)
    }
}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
