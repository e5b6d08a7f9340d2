//! Trigger-surface router.
//!
//! The four trigger routes sit behind the (optional) bearer-token check;
//! `/health` stays open for deployment probes. CORS is permissive because
//! the triggers are invoked from browser sessions going through the edge.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::endpoints;
use super::middleware;
use super::types::ApiContext;

/// Build the worker router.
pub fn api_router(ctx: ApiContext) -> Router {
    let protected = Router::new()
        .route(
            "/process-document",
            post(endpoints::documents::process_document),
        )
        .route(
            "/extract-details",
            post(endpoints::documents::extract_details),
        )
        .route("/generate-proposal", post(endpoints::proposals::generate))
        .route("/edit-proposal", post(endpoints::proposals::edit))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::require_auth))
        // Extension must be outermost so the auth middleware can read it.
        .layer(axum::Extension(ctx.clone()));

    let open = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    Router::new()
        .merge(protected)
        .merge(open)
        .layer(CorsLayer::permissive())
}
