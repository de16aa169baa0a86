use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fleet_core::error::CoreError;
use fleet_db::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for storage
/// failures, and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `fleet_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure reported by the record store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Message returned for every 500 response.
pub const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let core = match self {
            AppError::Core(core) => core,
            AppError::Store(err) => CoreError::from(err),
            AppError::BadRequest(msg) => {
                return error_response(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg);
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                return internal_error_response();
            }
        };

        match core {
            CoreError::NotFound { entity, id } => {
                tracing::debug!(entity, id = %id, "Entity not found");
                error_response(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} not found"),
                )
            }
            CoreError::Validation(failed) => {
                let body = json!({
                    "error": failed.to_string(),
                    "code": "VALIDATION_ERROR",
                    "violations": failed.violations,
                });
                (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
            }
            CoreError::Unauthorized(msg) => {
                error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
            }
            CoreError::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "Record store unavailable");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_UNAVAILABLE",
                    "Storage is temporarily unavailable".to_string(),
                )
            }
            CoreError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal core error");
                internal_error_response()
            }
        }
    }
}

fn error_response(status: StatusCode, code: &'static str, message: String) -> Response {
    let body = json!({
        "error": message,
        "code": code,
    });
    (status, axum::Json(body)).into_response()
}

/// Generic 500 body; details stay in the server log.
pub fn internal_error_response() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}
