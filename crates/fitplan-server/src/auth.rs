//! Shared-secret check for the `/api/workout` routes.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};

use crate::routes::{AppError, AppState};

/// Header the client puts the shared secret in.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject the request with 401 unless `x-api-key` matches the configured key.
///
/// Runs before any handler, so a rejected request never reaches the catalog
/// or the model.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match presented {
        Some(key) if keys_match(key, &state.api_key) => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "rejected request with wrong API key");
            Err(unauthorized())
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "rejected request without API key");
            Err(unauthorized())
        }
    }
}

fn unauthorized() -> AppError {
    AppError::new(StatusCode::UNAUTHORIZED, "Invalid API key")
}

/// Compare fixed-length digests so the comparison time does not depend on
/// how long a matching prefix is.
fn keys_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
