//! Router tests for the chat service.
//!
//! Handlers run against in-process doubles: the in-memory vector store, a
//! fixed-vector embedder, and scripted completion clients.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use partselect_rag::{
    ChatOrchestrator, CompletionClient, Conversation, EmbeddingProvider, InMemoryVectorStore,
    QueryMatch, RagError, Result, Role, VectorStore, sample_documents, seed_collection,
};
use partselect_server::server::ChatResponse;
use partselect_server::{AppState, app_router};
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

struct FixedEmbedder;

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, 0.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        3
    }
}

/// Replies with the latest user message, after checking that the system
/// prompt was prepended.
struct EchoCompletion;

#[async_trait]
impl CompletionClient for EchoCompletion {
    async fn complete(&self, conversation: &Conversation) -> Result<String> {
        let first = &conversation.messages()[0];
        assert_eq!(first.role, Role::System);
        Ok(format!("echo: {}", conversation.last_user_message().unwrap_or("<none>")))
    }
}

struct FailingCompletion;

#[async_trait]
impl CompletionClient for FailingCompletion {
    async fn complete(&self, _conversation: &Conversation) -> Result<String> {
        Err(RagError::UpstreamError { service: "openai-chat".into(), message: "503".into() })
    }
}

struct UnreachableStore;

#[async_trait]
impl VectorStore for UnreachableStore {
    async fn create_collection(&self, _name: &str) -> Result<()> {
        Err(unreachable_error())
    }

    async fn delete_collection(&self, _name: &str) -> Result<()> {
        Err(unreachable_error())
    }

    async fn upsert(
        &self,
        _collection: &str,
        _documents: &[partselect_rag::EmbeddedDocument],
    ) -> Result<()> {
        Err(unreachable_error())
    }

    async fn query(
        &self,
        _collection: &str,
        _embedding: &[f32],
        _top_k: usize,
    ) -> Result<Vec<QueryMatch>> {
        Err(unreachable_error())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        Err(unreachable_error())
    }
}

fn unreachable_error() -> RagError {
    RagError::UpstreamError { service: "chroma".into(), message: "connection refused".into() }
}

fn state_with(store: Arc<dyn VectorStore>, completion: Arc<dyn CompletionClient>) -> AppState {
    let orchestrator = ChatOrchestrator::builder()
        .embedding_provider(Arc::new(FixedEmbedder))
        .vector_store(store.clone())
        .completion_client(completion)
        .build()
        .unwrap();
    AppState::new(orchestrator, store)
}

async fn seeded_store() -> Arc<dyn VectorStore> {
    let store = Arc::new(InMemoryVectorStore::new());
    seed_collection(&FixedEmbedder, &*store, "partselect-docs", &sample_documents())
        .await
        .unwrap();
    store
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_chat(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn chat_returns_reply_for_latest_user_message() {
    let app = app_router(state_with(seeded_store().await, Arc::new(EchoCompletion)));

    let response = app
        .oneshot(post_chat(json!({
            "messages": [
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello!"},
                {"role": "user", "content": "How do I install WPW10321304?"}
            ]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ChatResponse = json_body(response.into_body()).await;
    assert_eq!(body.reply, "echo: How do I install WPW10321304?");
}

#[tokio::test]
async fn chat_without_messages_is_an_empty_conversation() {
    let app = app_router(state_with(seeded_store().await, Arc::new(EchoCompletion)));

    let response = app.oneshot(post_chat(json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ChatResponse = json_body(response.into_body()).await;
    assert_eq!(body.reply, "echo: <none>");
}

#[tokio::test]
async fn chat_still_answers_when_store_is_unreachable() {
    let app = app_router(state_with(Arc::new(UnreachableStore), Arc::new(EchoCompletion)));

    let response = app
        .oneshot(post_chat(json!({"messages": [{"role": "user", "content": "dishwasher"}]})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ChatResponse = json_body(response.into_body()).await;
    assert_eq!(body.reply, "echo: dishwasher");
}

#[tokio::test]
async fn chat_returns_fallback_with_500_when_completion_fails() {
    let app = app_router(state_with(seeded_store().await, Arc::new(FailingCompletion)));

    let response = app
        .oneshot(post_chat(json!({"messages": [{"role": "user", "content": "hello"}]})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({"reply": "Sorry, something went wrong."}));
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app_router(state_with(seeded_store().await, Arc::new(EchoCompletion)));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn collections_lists_store_contents() {
    let app = app_router(state_with(seeded_store().await, Arc::new(EchoCompletion)));

    let response = app
        .oneshot(Request::builder().uri("/collections").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({"collections": ["partselect-docs"]}));
}

#[tokio::test]
async fn collections_reports_store_failure() {
    let app = app_router(state_with(Arc::new(UnreachableStore), Arc::new(EchoCompletion)));

    let response = app
        .oneshot(Request::builder().uri("/collections").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = json_body(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}
