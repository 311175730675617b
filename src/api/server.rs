//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::chat::ChatService;
use crate::config::AppConfig;
use crate::database::Database;
use crate::llm::LlmClient;
use crate::store::{MemoryStore, ProviderStore};
use crate::Result;

/// Start the API server.
///
/// `demo` serves the built-in in-memory dataset instead of Postgres so the
/// chat pipeline can be tried without a database.
pub async fn serve_api(
    config: &AppConfig,
    host: String,
    port: u16,
    enable_cors: bool,
    demo: bool,
) -> Result<()> {
    info!("🚀 Starting NeedFul API server...");

    // Initialize services
    let store: Arc<dyn ProviderStore> = if demo {
        info!("🧪 Demo mode - serving the built-in sample dataset");
        Arc::new(MemoryStore::with_sample_data())
    } else {
        Arc::new(Database::from_config(config).await?)
    };

    let llm = LlmClient::from_config(config).map(Arc::new);
    if llm.is_none() {
        info!("💡 No LLM API key configured - chat runs in mock mode with templated replies");
    }

    let state = AppState {
        chat: Arc::new(ChatService::new(store.clone(), llm)),
        store,
    };

    // Build routes and middleware layers
    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(TraceLayer::new_for_http());

    // Add CORS if enabled
    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    // Start server
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{addr}");
    info!("");
    info!("Available endpoints:");
    info!("  GET  /api/health           - Health check");
    info!("  POST /api/chat             - Chat turn");
    info!("  GET  /api/providers        - Search providers");
    info!("  GET  /api/providers/:slug  - Get provider by slug");
    info!("  GET  /api/categories       - List categories");

    axum::serve(listener, app).await?;

    Ok(())
}
