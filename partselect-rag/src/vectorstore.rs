//! Vector store trait for storing and searching embedded documents.

use async_trait::async_trait;

use crate::document::{EmbeddedDocument, QueryMatch};
use crate::error::Result;

/// A storage backend for embedded documents with nearest-neighbor search.
///
/// Implementations manage named collections. A collection's dimensionality
/// is established by its first upsert; every later vector stored in or
/// queried against it must have the same length. Implementations must be
/// safe for concurrent queries.
///
/// # Example
///
/// ```rust,ignore
/// use partselect_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("partselect-docs").await?;
/// store.upsert("partselect-docs", &documents).await?;
/// let matches = store.query("partselect-docs", &query_embedding, 3).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create an empty named collection.
    ///
    /// Fails with [`RagError::ConflictError`](crate::RagError::ConflictError)
    /// if the collection already exists.
    async fn create_collection(&self, name: &str) -> Result<()>;

    /// Delete a named collection and all its data.
    ///
    /// Deleting a collection that does not exist is logged and succeeds.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Add or overwrite documents by id.
    ///
    /// Fails with
    /// [`RagError::DimensionMismatchError`](crate::RagError::DimensionMismatchError)
    /// if any embedding disagrees with the collection's dimensionality, in
    /// which case nothing is written.
    async fn upsert(&self, collection: &str, documents: &[EmbeddedDocument]) -> Result<()>;

    /// Return up to `top_k` documents ordered by ascending distance to
    /// `embedding`.
    ///
    /// An empty collection yields an empty result. Fails with
    /// [`RagError::NotFoundError`](crate::RagError::NotFoundError) if the
    /// collection does not exist.
    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>>;

    /// List the names of all known collections. Intended for diagnostics.
    async fn list_collections(&self) -> Result<Vec<String>>;
}
