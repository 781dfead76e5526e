//! Chroma vector store backend.
//!
//! Provides [`ChromaVectorStore`] which implements [`VectorStore`] over the
//! Chroma HTTP API (v2) with `reqwest`. Collections are addressed by name;
//! the adapter resolves a name to Chroma's collection id before record
//! operations.
//!
//! This module is only available when the `chroma` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use partselect_rag::chroma::ChromaVectorStore;
//!
//! let store = ChromaVectorStore::new("http://localhost:8000");
//! store.create_collection("partselect-docs").await?;
//! store.upsert("partselect-docs", &documents).await?;
//! let matches = store.query("partselect-docs", &query_embedding, 3).await?;
//! ```

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::DEFAULT_UPSTREAM_TIMEOUT;
use crate::document::{EmbeddedDocument, QueryMatch};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// The default Chroma server URL.
pub const DEFAULT_URL: &str = "http://localhost:8000";

/// The default Chroma tenant.
pub const DEFAULT_TENANT: &str = "default_tenant";

/// The default Chroma database.
pub const DEFAULT_DATABASE: &str = "default_database";

const SERVICE: &str = "chroma";

// ── Chroma API request/response types ──────────────────────────────

#[derive(Deserialize)]
struct CollectionModel {
    id: String,
    name: String,
}

#[derive(Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    get_or_create: bool,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    ids: Vec<&'a str>,
    embeddings: Vec<&'a [f32]>,
    documents: Vec<&'a str>,
    metadatas: Vec<Option<&'a HashMap<String, String>>>,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query_embeddings: [&'a [f32]; 1],
    n_results: usize,
    include: [&'static str; 3],
}

#[derive(Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<HashMap<String, Value>>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f32>>>>,
}

/// A [`VectorStore`] backed by a [Chroma](https://www.trychroma.com/) server.
#[derive(Debug, Clone)]
pub struct ChromaVectorStore {
    client: reqwest::Client,
    collections_url: String,
    timeout: Duration,
}

impl ChromaVectorStore {
    /// Create a store talking to the Chroma server at `url`, using the
    /// default tenant and database.
    pub fn new(url: &str) -> Self {
        Self::with_tenant(url, DEFAULT_TENANT, DEFAULT_DATABASE)
    }

    /// Create a store for a specific tenant and database.
    pub fn with_tenant(url: &str, tenant: &str, database: &str) -> Self {
        let collections_url = format!(
            "{}/api/v2/tenants/{tenant}/databases/{database}/collections",
            url.trim_end_matches('/')
        );
        Self {
            client: reqwest::Client::new(),
            collections_url,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    /// Create a store with the default URL (`http://localhost:8000`).
    pub fn default_url() -> Self {
        Self::new(DEFAULT_URL)
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share an existing HTTP client (connection pool).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Map a non-2xx Chroma response to the error taxonomy.
    ///
    /// Requests that do not target a collection always map to
    /// [`RagError::UpstreamError`].
    fn classify(collection: Option<&str>, status: StatusCode, body: &str) -> RagError {
        let Some(collection) = collection else {
            return RagError::upstream(SERVICE, format!("API returned {status}: {body}"));
        };
        let lower = body.to_ascii_lowercase();
        if status == StatusCode::NOT_FOUND || lower.contains("does not exist") {
            RagError::not_found(collection)
        } else if status == StatusCode::CONFLICT || lower.contains("already exists") {
            RagError::conflict(collection)
        } else if status.is_client_error() && lower.contains("dimension") {
            RagError::dimension_mismatch(collection, body.to_string())
        } else {
            RagError::upstream(SERVICE, format!("API returned {status}: {body}"))
        }
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        collection: Option<&str>,
        body: Option<&B>,
    ) -> Result<String> {
        let mut request = self.client.request(method, url).timeout(self.timeout);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(?collection, error = %e, "chroma request failed");
            if e.is_timeout() {
                RagError::upstream(SERVICE, format!("request timed out after {:?}", self.timeout))
            } else {
                RagError::upstream(SERVICE, format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RagError::upstream(SERVICE, format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(Self::classify(collection, status, &text));
        }
        Ok(text)
    }

    fn parse<T: DeserializeOwned>(body: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|e| {
            error!(error = %e, "failed to parse chroma response");
            RagError::upstream(SERVICE, format!("malformed response: {e}"))
        })
    }

    async fn collection_id(&self, name: &str) -> Result<String> {
        let url = format!("{}/{name}", self.collections_url);
        let body = self.send::<()>(Method::GET, &url, Some(name), None).await?;
        let collection: CollectionModel = Self::parse(&body)?;
        Ok(collection.id)
    }

    fn metadata_to_strings(metadata: HashMap<String, Value>) -> HashMap<String, String> {
        metadata
            .into_iter()
            .map(|(k, v)| match v {
                Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect()
    }

    /// Turn Chroma's column-oriented first result row into matches.
    fn into_matches(response: QueryResponse) -> Result<Vec<QueryMatch>> {
        let ids = response
            .ids
            .into_iter()
            .next()
            .ok_or_else(|| RagError::upstream(SERVICE, "query response missing ids row"))?;
        let documents = response
            .documents
            .and_then(|rows| rows.into_iter().next())
            .ok_or_else(|| RagError::upstream(SERVICE, "query response missing documents row"))?;
        if documents.len() != ids.len() {
            return Err(RagError::upstream(
                SERVICE,
                format!("query response has {} ids but {} documents", ids.len(), documents.len()),
            ));
        }

        let mut metadatas =
            response.metadatas.and_then(|rows| rows.into_iter().next()).unwrap_or_default();
        metadatas.resize(ids.len(), None);
        let mut distances =
            response.distances.and_then(|rows| rows.into_iter().next()).unwrap_or_default();
        distances.resize(ids.len(), None);

        ids.into_iter()
            .zip(documents)
            .zip(metadatas.into_iter().zip(distances))
            .map(|((id, text), (metadata, distance))| {
                let text = text.ok_or_else(|| {
                    RagError::upstream(SERVICE, format!("document '{id}' has no text"))
                })?;
                Ok(QueryMatch {
                    id,
                    text,
                    metadata: metadata.map(Self::metadata_to_strings).unwrap_or_default(),
                    distance,
                })
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for ChromaVectorStore {
    async fn create_collection(&self, name: &str) -> Result<()> {
        let request = CreateCollectionRequest { name, get_or_create: false };
        let body =
            self.send(Method::POST, &self.collections_url, Some(name), Some(&request)).await?;
        let created: CollectionModel = Self::parse(&body)?;
        debug!(collection = name, id = %created.id, "created chroma collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let url = format!("{}/{name}", self.collections_url);
        match self.send::<()>(Method::DELETE, &url, Some(name), None).await {
            Ok(_) => {
                debug!(collection = name, "deleted chroma collection");
                Ok(())
            }
            Err(RagError::NotFoundError { .. }) => {
                warn!(collection = name, "collection did not exist, nothing to delete");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn upsert(&self, collection: &str, documents: &[EmbeddedDocument]) -> Result<()> {
        let id = self.collection_id(collection).await?;
        if documents.is_empty() {
            return Ok(());
        }

        let request = UpsertRequest {
            ids: documents.iter().map(|d| d.id.as_str()).collect(),
            embeddings: documents.iter().map(|d| d.embedding.as_slice()).collect(),
            documents: documents.iter().map(|d| d.text.as_str()).collect(),
            // Chroma rejects empty metadata maps; send null instead.
            metadatas: documents
                .iter()
                .map(|d| (!d.metadata.is_empty()).then_some(&d.metadata))
                .collect(),
        };
        let url = format!("{}/{id}/upsert", self.collections_url);
        self.send(Method::POST, &url, Some(collection), Some(&request)).await?;

        debug!(collection, count = documents.len(), "upserted documents to chroma");
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>> {
        let id = self.collection_id(collection).await?;
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let request = QueryRequest {
            query_embeddings: [embedding],
            n_results: top_k,
            include: ["documents", "metadatas", "distances"],
        };
        let url = format!("{}/{id}/query", self.collections_url);
        let body = self.send(Method::POST, &url, Some(collection), Some(&request)).await?;
        let response: QueryResponse = Self::parse(&body)?;

        let mut matches = Self::into_matches(response)?;
        matches.truncate(top_k);
        debug!(collection, result_count = matches.len(), "chroma query completed");
        Ok(matches)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let body = self.send::<()>(Method::GET, &self.collections_url, None, None).await?;
        let collections: Vec<CollectionModel> = Self::parse(&body)?;
        Ok(collections.into_iter().map(|c| c.name).collect())
    }
}
