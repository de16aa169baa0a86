//! Bearer-token guard for the reseed endpoint.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fleet_core::error::CoreError;
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::state::AppState;

/// Proof that the caller may reseed the collection.
///
/// Outside production every request passes. In production the request must
/// carry `Authorization: Bearer <INIT_TOKEN>`; with no token configured the
/// endpoint is closed entirely.
///
/// ```ignore
/// async fn reseed(_auth: ReseedAuth, State(state): State<AppState>) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ReseedAuth;

impl FromRequestParts<AppState> for ReseedAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.config.is_production() {
            return Ok(ReseedAuth);
        }

        let expected = state.config.init_token.as_deref().ok_or_else(|| {
            tracing::warn!("Reseed rejected: INIT_TOKEN is not configured");
            AppError::Core(CoreError::Unauthorized("Reseeding is disabled".into()))
        })?;

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        if !tokens_match(token, expected) {
            tracing::warn!("Reseed rejected: token mismatch");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid token".into(),
            )));
        }

        Ok(ReseedAuth)
    }
}

/// Compare fixed-length digests so the comparison does not leak the token
/// length or a matching prefix through timing.
fn tokens_match(provided: &str, expected: &str) -> bool {
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
