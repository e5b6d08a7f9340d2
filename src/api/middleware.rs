//! Bearer-token auth for the trigger routes.
//!
//! The worker sits behind the BaaS edge, which already verified the end
//! user; this shared secret only keeps the trigger surface from being
//! invoked directly. With no token configured (local development) the
//! middleware passes everything through. Auth failures short-circuit before
//! any row mutation.

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;

use super::error::ApiError;
use super::types::ApiContext;

pub async fn require_auth(
    Extension(ctx): Extension<ApiContext>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = ctx.auth_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match bearer {
        Some(token) if token == expected => Ok(next.run(request).await),
        _ => Err(ApiError::Unauthorized),
    }
}
