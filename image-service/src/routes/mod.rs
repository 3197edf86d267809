use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::{self, from_fn_with_state},
    routing::post,
    Router,
};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{image_handlers::upload_image, ImageState};
use profiles_shared::auth::{auth_middleware, AuthMode};
use profiles_shared::storage::ObjectStorage;

// Logging middleware to trace all requests
async fn logging_middleware(
    req: Request,
    next: axum::middleware::Next,
) -> impl axum::response::IntoResponse {
    info!(
        "Router received request: method={}, uri={}",
        req.method(),
        req.uri()
    );
    next.run(req).await
}

/// Creates the image API router. Bodies over `max_request_bytes` are
/// answered with 413.
pub fn create_router_with_state<O>(
    state: Arc<ImageState<O>>,
    auth: AuthMode,
    prefix: &str,
    max_request_bytes: usize,
) -> Router
where
    O: ObjectStorage,
{
    info!(
        "Setting up image routes with prefix: '{}', body limit {} bytes",
        prefix, max_request_bytes
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/images", post(upload_image::<O>))
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .layer(from_fn_with_state(auth, auth_middleware))
        .with_state(state);

    let router = if prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(prefix, api_routes)
    };

    router
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
        .fallback(|req: Request| async move {
            warn!("No route matched for: {} {}", req.method(), req.uri());
            (
                axum::http::StatusCode::NOT_FOUND,
                "The requested resource was not found".to_string(),
            )
        })
}
