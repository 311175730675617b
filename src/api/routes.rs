//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Chat pipeline
        .route("/chat", post(handlers::chat))
        // Directory endpoints
        .route("/providers", get(handlers::list_providers))
        .route("/providers/:slug", get(handlers::get_provider))
        .route("/categories", get(handlers::list_categories))
        .with_state(state)
}
