//! API request handlers

use std::sync::Arc;

use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use tracing::error;
use tracing::info;

use crate::api::types::*;
use crate::chat::composer::TECHNICAL_ERROR_REPLY;
use crate::chat::{ChatService, ChatTurn};
use crate::models::{ProviderOrder, ProviderQuery};
use crate::store::ProviderStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub store: Arc<dyn ProviderStore>,
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Chat turn handler.
///
/// The single structural check (non-empty `messages`) is the only path
/// that returns a non-200 status. Everything else, including pipeline
/// failures, is converted to a conversational 200 reply here; this is the
/// outermost guard of the turn.
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    if req.messages.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "messages must be a non-empty array".to_string(),
            }),
        )
            .into_response();
    }

    info!("POST /api/chat ({} message(s))", req.messages.len());

    let turn = ChatTurn {
        messages: req.messages,
        user_location: req.user_location,
        session_id: req.session_id,
    };

    match state.chat.handle_turn(&turn).await {
        Ok(response) => (StatusCode::OK, Json(ChatResponse { response })).into_response(),
        Err(e) => {
            error!("chat turn failed: {e}");
            (
                StatusCode::OK,
                Json(ChatResponse {
                    response: TECHNICAL_ERROR_REPLY.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Search providers
pub async fn list_providers(
    State(state): State<AppState>,
    Query(params): Query<ProviderSearchParams>,
) -> Result<Json<Vec<ProviderResponse>>, StatusCode> {
    info!(
        "GET /api/providers?q={:?}&category={:?}&limit={}",
        params.q, params.category, params.limit
    );

    let query = ProviderQuery {
        category_slug: params.category,
        name_match: params.q.filter(|q| !q.trim().is_empty()),
        min_rating: None,
        order: ProviderOrder::RatingDesc,
        limit: params.limit.clamp(1, 100),
    };

    match state.store.search_providers(&query).await {
        Ok(providers) => Ok(Json(
            providers.into_iter().map(ProviderResponse::from).collect(),
        )),
        Err(e) => {
            error!("Error searching providers: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get provider by slug
pub async fn get_provider(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProviderResponse>, StatusCode> {
    info!("GET /api/providers/{slug}");

    match state.store.get_provider_by_slug(&slug).await {
        Ok(Some(provider)) => Ok(Json(ProviderResponse::from(provider))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Error fetching provider: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// List categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, StatusCode> {
    info!("GET /api/categories");

    match state.store.list_categories().await {
        Ok(categories) => Ok(Json(
            categories.into_iter().map(CategoryResponse::from).collect(),
        )),
        Err(e) => {
            error!("Error listing categories: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
