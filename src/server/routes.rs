//! Router configuration for the web server.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/admin/status.json", get(handlers::admin_status))
        .route(
            "/admin/newspapers/:slug/increment",
            post(handlers::increment_issue),
        )
        .route(
            "/admin/newspapers/:slug/decrement",
            post(handlers::decrement_issue),
        )
        .route("/admin/newspapers/:slug/set", post(handlers::set_issue))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_admin_token,
        ));

    // CORS covers the public routes only
    let public = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/:slug", get(handlers::redirect_newspaper))
        .route("/:slug/", get(handlers::redirect_newspaper))
        .layer(CorsLayer::permissive());

    // Static admin paths take priority over the slug
    Router::new()
        .merge(admin)
        .merge(public)
        .with_state(state)
}
