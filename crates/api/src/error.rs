use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use teamgate_core::error::{CoreError, DecodeError};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors. Implements [`IntoResponse`] to
/// produce consistent JSON error responses; 500s are logged server-side
/// and never echo failure details to the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `teamgate-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        AppError::Core(CoreError::Decode(err))
    }
}

impl AppError {
    /// Whether this error maps to a 5xx response.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::Internal(_) | AppError::Core(CoreError::Internal(_))
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::Decode(err) => {
                    (StatusCode::BAD_REQUEST, "DECODE_ERROR", err.to_string())
                }
                CoreError::UnknownCommand { .. } => (
                    StatusCode::BAD_REQUEST,
                    "UNKNOWN_COMMAND",
                    core.to_string(),
                ),
                CoreError::ProjectNotFound { .. } => (
                    StatusCode::BAD_REQUEST,
                    "PROJECT_NOT_FOUND",
                    core.to_string(),
                ),
                CoreError::PayloadFormat(_) => {
                    (StatusCode::BAD_REQUEST, "PAYLOAD_FORMAT", core.to_string())
                }
                CoreError::Forbidden(msg) => {
                    (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
