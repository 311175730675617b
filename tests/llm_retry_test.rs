//! Retry/backoff contract of the LLM client, exercised against a local
//! stub server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use needful::chat::composer::{ResponseComposer, TurnInputs, SERVER_BUSY_REPLY};
use needful::chat::IntentFlags;
use needful::llm::{LlmClient, WireMessage, EMPTY_COMPLETION_REPLY, MAX_ATTEMPTS};
use needful::models::{Provider, ProviderHit};
use needful::NeedfulError;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

/// Spawn a stub chat-completion server; `respond` maps the attempt number
/// (starting at 1) to a response.
async fn spawn_stub<F>(respond: F) -> (String, Arc<AtomicUsize>)
where
    F: Fn(usize) -> (StatusCode, serde_json::Value) + Clone + Send + Sync + 'static,
{
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let app = Router::new().route(
        "/v1/chat/completions",
        post(move || {
            let counter = counter.clone();
            let respond = respond.clone();
            async move {
                let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
                let (status, body) = respond(attempt);
                (status, Json(body))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1/chat/completions"), calls)
}

fn client_for(endpoint: &str) -> LlmClient {
    LlmClient::new(endpoint, "test-key", "test-model", 0.7, 256)
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
}

fn provider(name: &str) -> Provider {
    Provider {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        description: None,
        rating: dec!(4.5),
        review_count: 120,
        city: "Mumbai".to_string(),
        area: Some("Dadar".to_string()),
        address: Some("7 Station Road".to_string()),
        phone: Some("+91 98200 22222".to_string()),
        latitude: None,
        longitude: None,
        operating_hours: Some("9am-6pm".to_string()),
        status: "approved".to_string(),
        category_name: "Plumbers".to_string(),
        category_slug: "plumbers".to_string(),
        created_at: Utc::now(),
        services: Vec::new(),
    }
}

#[tokio::test]
async fn first_success_returns_without_retrying() {
    let (endpoint, calls) =
        spawn_stub(|_| (StatusCode::OK, completion_body("Here you go."))).await;

    let reply = client_for(&endpoint)
        .chat_completion(&[WireMessage::user("hello")])
        .await
        .unwrap();

    assert_eq!(reply, "Here you go.");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rate_limiting_exhausts_three_attempts_with_linear_backoff() {
    let (endpoint, calls) =
        spawn_stub(|_| (StatusCode::TOO_MANY_REQUESTS, json!({ "error": "slow down" }))).await;

    let started = Instant::now();
    let result = client_for(&endpoint)
        .chat_completion(&[WireMessage::user("hello")])
        .await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(NeedfulError::LlmRateLimited)));
    assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS as usize);
    // Two inter-attempt delays: 1000 ms then 2000 ms
    assert!(elapsed >= Duration::from_millis(3000), "elapsed: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(4500), "elapsed: {elapsed:?}");
}

#[tokio::test]
async fn transient_server_error_is_retried_until_success() {
    let (endpoint, calls) = spawn_stub(|attempt| {
        if attempt < 3 {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "upstream hiccup" }),
            )
        } else {
            (StatusCode::OK, completion_body("Recovered."))
        }
    })
    .await;

    let reply = client_for(&endpoint)
        .chat_completion(&[WireMessage::user("hello")])
        .await
        .unwrap();

    assert_eq!(reply, "Recovered.");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn exhausted_llm_without_results_degrades_to_server_busy() {
    let (endpoint, calls) =
        spawn_stub(|_| (StatusCode::TOO_MANY_REQUESTS, json!({ "error": "slow down" }))).await;
    let composer = ResponseComposer::new(Some(Arc::new(client_for(&endpoint))));

    let reply = composer
        .compose(&TurnInputs {
            flags: &IntentFlags::default(),
            hits: &[],
            snapshot: &[],
            history: &[],
            utterance: "any good plumbers around?",
            context: "",
        })
        .await;

    assert_eq!(reply, SERVER_BUSY_REPLY);
    assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS as usize);
}

#[tokio::test]
async fn exhausted_llm_with_results_degrades_to_a_detailed_listing() {
    let (endpoint, calls) =
        spawn_stub(|_| (StatusCode::TOO_MANY_REQUESTS, json!({ "error": "slow down" }))).await;
    let composer = ResponseComposer::new(Some(Arc::new(client_for(&endpoint))));
    let hits = vec![ProviderHit {
        provider: provider("AquaFix Plumbing Co"),
        distance_km: None,
    }];

    let reply = composer
        .compose(&TurnInputs {
            flags: &IntentFlags::default(),
            hits: &hits,
            snapshot: &[],
            history: &[],
            utterance: "any good plumbers around?",
            context: "1. AquaFix Plumbing Co",
        })
        .await;

    assert_ne!(reply, SERVER_BUSY_REPLY);
    assert!(
        reply.contains("[AquaFix Plumbing Co](/providers/aquafix-plumbing-co)"),
        "got: {reply}"
    );
    assert!(reply.contains("4.5/5"), "got: {reply}");
    assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS as usize);
}

#[tokio::test]
async fn missing_content_field_substitutes_the_fixed_fallback() {
    let (endpoint, calls) =
        spawn_stub(|_| (StatusCode::OK, json!({ "choices": [{ "message": { "role": "assistant" } }] })))
            .await;

    let reply = client_for(&endpoint)
        .chat_completion(&[WireMessage::user("hello")])
        .await
        .unwrap();

    assert_eq!(reply, EMPTY_COMPLETION_REPLY);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_choices_substitutes_the_fixed_fallback() {
    let (endpoint, _calls) = spawn_stub(|_| (StatusCode::OK, json!({ "choices": [] }))).await;

    let reply = client_for(&endpoint)
        .chat_completion(&[WireMessage::user("hello")])
        .await
        .unwrap();

    assert_eq!(reply, EMPTY_COMPLETION_REPLY);
}
