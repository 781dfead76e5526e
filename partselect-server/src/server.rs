use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use partselect_rag::{ChatOrchestrator, Conversation, VectorStore};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::backends;
use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub vector_store: Arc<dyn VectorStore>,
}

impl AppState {
    pub fn new(orchestrator: ChatOrchestrator, vector_store: Arc<dyn VectorStore>) -> Self {
        Self { orchestrator: Arc::new(orchestrator), vector_store }
    }
}

/// Body of `POST /chat`. A missing `messages` field is an empty conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Conversation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub reply: String,
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .route("/collections", get(list_collections))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let vector_store: Arc<dyn VectorStore> =
        Arc::new(backends::vector_store(&config, client.clone()));
    let orchestrator = backends::orchestrator(&config, client, vector_store.clone())?;
    let app = app_router(AppState::new(orchestrator, vector_store));

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        collection = %config.collection,
        chat_model = %config.chat_model,
        "partselect-server listening on http://{}",
        addr
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    let reply = state.orchestrator.reply(&request.messages).await;
    let status =
        if reply.is_fallback() { StatusCode::INTERNAL_SERVER_ERROR } else { StatusCode::OK };
    (status, Json(ChatResponse { reply: reply.reply }))
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn list_collections(State(state): State<AppState>) -> impl IntoResponse {
    match state.vector_store.list_collections().await {
        Ok(collections) => (StatusCode::OK, Json(json!({"collections": collections}))),
        Err(e) => {
            error!(error = %e, "failed to list collections");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": e.to_string()})))
        }
    }
}
