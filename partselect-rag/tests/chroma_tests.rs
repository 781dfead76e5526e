//! Chroma adapter tests against a local stub of the v2 collections API.
//!
//! The stub knows two collections: `partselect-docs` (id `c1`, 3-dimensional)
//! and `broken` (id `c9`, whose query endpoint returns a malformed payload).

#![cfg(feature = "chroma")]

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use partselect_rag::chroma::ChromaVectorStore;
use partselect_rag::{EmbeddedDocument, RagError, VectorStore};
use serde_json::{Value, json};

const PREFIX: &str = "/api/v2/tenants/default_tenant/databases/default_database/collections";

#[derive(Clone, Default)]
struct Stub {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Stub {
    fn record(&self, path: impl Into<String>, body: Value) {
        self.requests.lock().unwrap().push((path.into(), body));
    }

    fn requests_to(&self, suffix: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(path, _)| path.ends_with(suffix))
            .map(|(_, body)| body.clone())
            .collect()
    }
}

fn known_id(name: &str) -> Option<&'static str> {
    match name {
        "partselect-docs" => Some("c1"),
        "broken" => Some("c9"),
        _ => None,
    }
}

fn not_found(name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NotFoundError",
            "message": format!("Collection {name} does not exist.")
        })),
    )
        .into_response()
}

async fn list() -> Json<Value> {
    Json(json!([
        {"id": "c1", "name": "partselect-docs"},
        {"id": "c9", "name": "broken"}
    ]))
}

async fn create(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    let name = body["name"].as_str().unwrap_or_default().to_string();
    stub.record("/create", body);
    if known_id(&name).is_some() {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "UniqueConstraintError",
                "message": format!("Collection {name} already exists")
            })),
        )
            .into_response();
    }
    Json(json!({"id": "c2", "name": name})).into_response()
}

async fn get_one(Path(name): Path<String>) -> Response {
    match known_id(&name) {
        Some(id) => Json(json!({"id": id, "name": name})).into_response(),
        None => not_found(&name),
    }
}

async fn delete_one(Path(name): Path<String>) -> Response {
    match known_id(&name) {
        Some(_) => Json(json!({})).into_response(),
        None => not_found(&name),
    }
}

async fn upsert(
    State(stub): State<Stub>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let wrong_dimension = body["embeddings"]
        .as_array()
        .into_iter()
        .flatten()
        .any(|e| e.as_array().map(Vec::len) != Some(3));
    stub.record(format!("/{id}/upsert"), body);
    if wrong_dimension {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "InvalidArgumentError",
                "message": "Collection expecting embedding with dimension of 3, got 2"
            })),
        )
            .into_response();
    }
    Json(json!({})).into_response()
}

async fn query(
    State(stub): State<Stub>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    stub.record(format!("/{id}/query"), body);
    if id == "c9" {
        return Json(json!({"ids": [["001"]]}));
    }
    Json(json!({
        "ids": [["003", "001"]],
        "documents": [["capacitor text", "spray arm text"]],
        "metadatas": [[{"content": "capacitor text"}, null]],
        "distances": [[0.12, 0.55]]
    }))
}

async fn spawn_stub() -> (ChromaVectorStore, Stub) {
    let stub = Stub::default();
    let router = Router::new()
        .route(PREFIX, get(list).post(create))
        .route(&format!("{PREFIX}/{{collection}}"), get(get_one).delete(delete_one))
        .route(&format!("{PREFIX}/{{collection}}/upsert"), post(upsert))
        .route(&format!("{PREFIX}/{{collection}}/query"), post(query))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    (ChromaVectorStore::new(&format!("http://{addr}/")), stub)
}

fn doc(id: &str, embedding: Vec<f32>, metadata: &[(&str, &str)]) -> EmbeddedDocument {
    EmbeddedDocument {
        id: id.to_string(),
        text: format!("text {id}"),
        embedding,
        metadata: metadata.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
    }
}

#[tokio::test]
async fn list_collections_returns_names() {
    let (store, _) = spawn_stub().await;
    assert_eq!(store.list_collections().await.unwrap(), ["partselect-docs", "broken"]);
}

#[tokio::test]
async fn create_maps_conflict_and_succeeds_for_new_names() {
    let (store, stub) = spawn_stub().await;

    let err = store.create_collection("partselect-docs").await.unwrap_err();
    assert!(matches!(
        err,
        RagError::ConflictError { ref collection } if collection == "partselect-docs"
    ));

    store.create_collection("fresh").await.unwrap();
    let bodies = stub.requests_to("/create");
    assert_eq!(bodies[1], json!({"name": "fresh", "get_or_create": false}));
}

#[tokio::test]
async fn delete_tolerates_missing_collection() {
    let (store, _) = spawn_stub().await;
    store.delete_collection("partselect-docs").await.unwrap();
    store.delete_collection("missing").await.unwrap();
}

#[tokio::test]
async fn upsert_resolves_collection_id_and_sends_columns() {
    let (store, stub) = spawn_stub().await;
    let documents = vec![
        doc("001", vec![1.0, 0.0, 0.0], &[("content", "text 001")]),
        doc("002", vec![0.0, 1.0, 0.0], &[]),
    ];

    store.upsert("partselect-docs", &documents).await.unwrap();

    let bodies = stub.requests_to("/c1/upsert");
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({
            "ids": ["001", "002"],
            "embeddings": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            "documents": ["text 001", "text 002"],
            "metadatas": [{"content": "text 001"}, null]
        })
    );
}

#[tokio::test]
async fn upsert_dimension_mismatch_is_classified() {
    let (store, _) = spawn_stub().await;
    let documents = [doc("001", vec![1.0, 0.0], &[])];
    let err = store.upsert("partselect-docs", &documents).await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatchError { .. }));
}

#[tokio::test]
async fn upsert_into_missing_collection_is_not_found() {
    let (store, stub) = spawn_stub().await;
    let documents = [doc("001", vec![1.0, 0.0, 0.0], &[])];
    let err = store.upsert("missing", &documents).await.unwrap_err();
    assert!(matches!(err, RagError::NotFoundError { ref collection } if collection == "missing"));
    assert!(stub.requests_to("/upsert").is_empty());
}

#[tokio::test]
async fn empty_upsert_into_missing_collection_is_not_found() {
    let (store, _) = spawn_stub().await;
    let err = store.upsert("missing", &[]).await.unwrap_err();
    assert!(matches!(err, RagError::NotFoundError { ref collection } if collection == "missing"));
}

#[tokio::test]
async fn empty_upsert_into_existing_collection_sends_nothing() {
    let (store, stub) = spawn_stub().await;
    store.upsert("partselect-docs", &[]).await.unwrap();
    assert!(stub.requests_to("/upsert").is_empty());
}

#[tokio::test]
async fn query_returns_matches_in_store_order() {
    let (store, stub) = spawn_stub().await;

    let matches = store.query("partselect-docs", &[0.0, 0.0, 1.0], 2).await.unwrap();

    let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["003", "001"]);
    assert_eq!(matches[0].text, "capacitor text");
    assert_eq!(matches[0].metadata.get("content").map(String::as_str), Some("capacitor text"));
    assert_eq!(matches[0].distance, Some(0.12));
    assert!(matches[1].metadata.is_empty());

    let body = &stub.requests_to("/c1/query")[0];
    assert_eq!(body["n_results"], 2);
    assert_eq!(body["query_embeddings"], json!([[0.0, 0.0, 1.0]]));
}

#[tokio::test]
async fn query_truncates_to_top_k() {
    let (store, _) = spawn_stub().await;
    let matches = store.query("partselect-docs", &[0.0, 0.0, 1.0], 1).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, "003");
}

#[tokio::test]
async fn query_missing_collection_is_not_found() {
    let (store, _) = spawn_stub().await;
    let err = store.query("missing", &[1.0, 0.0, 0.0], 3).await.unwrap_err();
    assert!(matches!(err, RagError::NotFoundError { .. }));
}

#[tokio::test]
async fn malformed_query_response_is_upstream_error() {
    let (store, _) = spawn_stub().await;
    let err = store.query("broken", &[1.0, 0.0, 0.0], 3).await.unwrap_err();
    assert!(matches!(err, RagError::UpstreamError { .. }));
}

#[tokio::test]
async fn list_failure_is_upstream_error() {
    let router = Router::new().route(PREFIX, get(|| async { not_found("default_database") }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    let store = ChromaVectorStore::new(&format!("http://{addr}"));
    let err = store.list_collections().await.unwrap_err();
    assert!(matches!(err, RagError::UpstreamError { ref message, .. } if message.contains("404")));
}

#[tokio::test]
async fn unreachable_server_is_upstream_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = ChromaVectorStore::new(&format!("http://{addr}"));
    let err = store.list_collections().await.unwrap_err();
    assert!(matches!(err, RagError::UpstreamError { .. }));
}
