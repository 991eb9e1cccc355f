//! Router configuration for the devlink API.

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{login, logout, me, refresh, register, AppState};
use super::middleware::create_cors_layer;

/// Create the main API router.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    // Auth routes (no authentication required)
    let auth_public_routes = Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/register", post(register));

    // Auth routes (authentication required)
    let auth_protected_routes = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me));

    let auth_routes = Router::new()
        .merge(auth_public_routes)
        .merge(auth_protected_routes);

    let session = state.session.clone();

    Router::new()
        .nest("/api/auth", auth_routes)
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(Extension(session)),
        )
        .with_state(state)
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
