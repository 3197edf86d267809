use axum::{
    extract::Request,
    middleware::{self, from_fn_with_state},
    routing::get,
    Router,
};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{
    profile_handlers::{create_profile, get_my_profile, get_profile, list_profiles},
    AppState,
};
use profiles_shared::auth::{auth_middleware, AuthMode};
use profiles_shared::queue::RelocationQueue;
use profiles_shared::store::ProfileStore;

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

/// Creates the profile API router; routes are nested under `state.route_prefix`
pub fn create_router_with_state<S, Q>(state: Arc<AppState<S, Q>>, auth: AuthMode) -> Router
where
    S: ProfileStore + ?Sized,
    Q: RelocationQueue + ?Sized,
{
    let prefix = state.route_prefix.clone();
    info!("Setting up profile routes with prefix: '{}'", prefix);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/profiles",
            get(list_profiles::<S, Q>).post(create_profile::<S, Q>),
        )
        .route("/profiles/me", get(get_my_profile::<S, Q>))
        .route("/profiles/:id", get(get_profile::<S, Q>))
        .layer(from_fn_with_state(auth, auth_middleware))
        .with_state(state);

    let router = if prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(&prefix, api_routes)
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
