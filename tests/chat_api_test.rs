//! End-to-end tests of the chat endpoint in mock mode (no LLM credential),
//! served from the in-memory provider store.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use needful::api::routes::api_routes;
use needful::api::AppState;
use needful::chat::composer::TECHNICAL_ERROR_REPLY;
use needful::chat::ChatService;
use needful::models::{Category, Provider, ProviderQuery};
use needful::store::{MemoryStore, ProviderStore};
use needful::{NeedfulError, Result};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_with_store(store: Arc<dyn ProviderStore>) -> Router {
    needful::logging::init_simple_logging();
    let state = AppState {
        chat: Arc::new(ChatService::new(store.clone(), None)),
        store,
    };
    Router::new().nest("/api", api_routes(state))
}

fn sample_app() -> Router {
    app_with_store(Arc::new(MemoryStore::with_sample_data()))
}

async fn post_chat(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn empty_messages_array_is_rejected_with_400() {
    let (status, body) = post_chat(sample_app(), json!({ "messages": [] })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("messages"));
}

#[tokio::test]
async fn missing_messages_field_is_rejected_with_400() {
    let (status, body) = post_chat(sample_app(), json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn mock_mode_lists_top_providers_for_a_category_query() {
    let body = json!({
        "messages": [{ "role": "user", "content": "I need a plumber for a leaking tap" }]
    });

    let (status, reply) = post_chat(sample_app(), body).await;

    assert_eq!(status, StatusCode::OK);
    let text = reply["response"].as_str().unwrap();
    // Both approved plumbers from the sample dataset, best rated first
    assert!(text.contains("AquaFix Plumbing Co"), "got: {text}");
    assert!(text.contains("City Pipes"), "got: {text}");
}

#[tokio::test]
async fn best_query_names_the_highest_rated_provider() {
    let body = json!({
        "messages": [{ "role": "user", "content": "which is the best restaurant here?" }],
        "sessionId": "best-test"
    });

    let (status, reply) = post_chat(sample_app(), body).await;

    assert_eq!(status, StatusCode::OK);
    let text = reply["response"].as_str().unwrap();
    assert!(text.contains("Spice Route Kitchen"), "got: {text}");
    assert!(text.contains("4.6"), "got: {text}");
}

#[tokio::test]
async fn compare_follow_up_is_served_from_the_session_snapshot() {
    let app = sample_app();

    // First turn fills the snapshot for this session
    let first = json!({
        "messages": [{ "role": "user", "content": "show me electricians" }],
        "sessionId": "compare-test"
    });
    let (status, _) = post_chat(app.clone(), first).await;
    assert_eq!(status, StatusCode::OK);

    // Follow-up with no category match compares the cached providers
    let second = json!({
        "messages": [
            { "role": "user", "content": "show me electricians" },
            { "role": "assistant", "content": "Here's what I found: ..." },
            { "role": "user", "content": "compare them please" }
        ],
        "sessionId": "compare-test"
    });
    let (status, reply) = post_chat(app, second).await;

    assert_eq!(status, StatusCode::OK);
    let text = reply["response"].as_str().unwrap();
    assert!(text.contains("Bright Sparks Electricals"), "got: {text}");
    assert!(text.contains("Voltline Services"), "got: {text}");
    // The higher-rated provider wins the verdict
    assert!(
        text.contains("Bright Sparks Electricals has the edge on ratings."),
        "got: {text}"
    );
}

#[tokio::test]
async fn closest_query_with_location_prefers_nearby_providers() {
    // User standing in Colaba: Spice Route Kitchen is the nearest restaurant
    let body = json!({
        "messages": [{ "role": "user", "content": "closest restaurant to me" }],
        "userLocation": { "lat": 18.91, "lon": 72.81 }
    });

    let (status, reply) = post_chat(sample_app(), body).await;

    assert_eq!(status, StatusCode::OK);
    let text = reply["response"].as_str().unwrap();
    let spice = text.find("Spice Route Kitchen").expect("nearest missing");
    let tandoor = text.find("Tandoor Tales").expect("farther missing");
    assert!(spice < tandoor, "nearest should be listed first: {text}");
}

#[tokio::test]
async fn greeting_turn_returns_a_conversational_reply() {
    let body = json!({
        "messages": [{ "role": "user", "content": "hi" }]
    });

    let (status, reply) = post_chat(sample_app(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!reply["response"].as_str().unwrap().is_empty());
}

/// Store that fails every query, standing in for a broken database
struct FailingStore;

#[async_trait]
impl ProviderStore for FailingStore {
    async fn search_providers(&self, _query: &ProviderQuery) -> Result<Vec<Provider>> {
        Err(NeedfulError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Err(NeedfulError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn get_provider_by_slug(&self, _slug: &str) -> Result<Option<Provider>> {
        Err(NeedfulError::Database(sqlx::Error::PoolTimedOut))
    }
}

#[tokio::test]
async fn data_access_failure_still_returns_a_conversational_200() {
    let app = app_with_store(Arc::new(FailingStore));
    let body = json!({
        "messages": [{ "role": "user", "content": "I need an electrician" }]
    });

    let (status, reply) = post_chat(app, body).await;

    // The retrieval failure degrades to an empty result set, never an error
    assert_eq!(status, StatusCode::OK);
    let text = reply["response"].as_str().unwrap();
    assert!(!text.is_empty());
    assert_ne!(text, TECHNICAL_ERROR_REPLY);
}

#[tokio::test]
async fn provider_directory_endpoints_serve_the_store() {
    let app = sample_app();

    let request = Request::builder()
        .uri("/api/providers?category=plumbers")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let providers: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(providers.as_array().unwrap().len(), 2);

    let request = Request::builder()
        .uri("/api/categories")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/api/providers/no-such-provider")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
