//! In-memory vector store using cosine distance.
//!
//! This module provides [`InMemoryVectorStore`], a dependency-free vector
//! store backed by a `HashMap` protected by a `tokio::sync::RwLock`. It
//! honors the full [`VectorStore`] contract and is used for tests and local
//! development in place of Chroma.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::document::{EmbeddedDocument, QueryMatch};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

#[derive(Debug, Default)]
struct Collection {
    /// Established by the first successful upsert.
    dimensions: Option<usize>,
    documents: HashMap<String, EmbeddedDocument>,
}

/// An in-memory vector store using cosine distance for search.
///
/// Collections are stored as nested maps: collection name → document id →
/// document. Reads run concurrently; writes are exclusive.
///
/// # Example
///
/// ```rust,ignore
/// use partselect_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("partselect-docs").await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Check every embedding against the established (or batch-implied)
/// dimensionality before anything is written.
fn check_dimensions(
    collection: &str,
    established: Option<usize>,
    documents: &[EmbeddedDocument],
) -> Result<Option<usize>> {
    let expected = established.or_else(|| documents.first().map(|d| d.embedding.len()));
    for document in documents {
        if document.embedding.is_empty() {
            return Err(RagError::dimension_mismatch(
                collection,
                format!("embedding for document '{}' is empty", document.id),
            ));
        }
        if let Some(expected) = expected {
            if document.embedding.len() != expected {
                return Err(RagError::dimension_mismatch(
                    collection,
                    format!(
                        "document '{}' has {} dimensions, expected {expected}",
                        document.id,
                        document.embedding.len()
                    ),
                ));
            }
        }
    }
    Ok(expected)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Err(RagError::conflict(name));
        }
        collections.insert(name.to_string(), Collection::default());
        debug!(collection = name, "created in-memory collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if collections.remove(name).is_none() {
            warn!(collection = name, "collection did not exist, nothing to delete");
        } else {
            debug!(collection = name, "deleted in-memory collection");
        }
        Ok(())
    }

    async fn upsert(&self, collection: &str, documents: &[EmbeddedDocument]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| RagError::not_found(collection))?;

        let dimensions = check_dimensions(collection, store.dimensions, documents)?;
        for document in documents {
            store.documents.insert(document.id.clone(), document.clone());
        }
        if store.dimensions.is_none() {
            store.dimensions = dimensions;
        }

        debug!(collection, count = documents.len(), "upserted documents");
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| RagError::not_found(collection))?;

        if let Some(expected) = store.dimensions {
            if embedding.len() != expected {
                return Err(RagError::dimension_mismatch(
                    collection,
                    format!("query has {} dimensions, expected {expected}", embedding.len()),
                ));
            }
        }

        let mut matches: Vec<QueryMatch> = store
            .documents
            .values()
            .map(|document| QueryMatch {
                id: document.id.clone(),
                text: document.text.clone(),
                metadata: document.metadata.clone(),
                distance: Some(1.0 - cosine_similarity(&document.embedding, embedding)),
            })
            .collect();

        matches.sort_by(|a, b| {
            let da = a.distance.unwrap_or(f32::MAX);
            let db = b.distance.unwrap_or(f32::MAX);
            da.total_cmp(&db).then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_similarity_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn cosine_similarity_of_parallel_vectors_is_one() {
        let sim = cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn check_dimensions_uses_first_document_when_unestablished() {
        let docs = vec![
            EmbeddedDocument {
                id: "a".into(),
                text: "a".into(),
                embedding: vec![1.0, 0.0],
                metadata: HashMap::new(),
            },
            EmbeddedDocument {
                id: "b".into(),
                text: "b".into(),
                embedding: vec![1.0, 0.0, 0.0],
                metadata: HashMap::new(),
            },
        ];
        let err = check_dimensions("c", None, &docs).unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatchError { .. }));
        assert_eq!(check_dimensions("c", None, &docs[..1]).unwrap(), Some(2));
        assert_eq!(check_dimensions("c", None, &[]).unwrap(), None);
    }
}
