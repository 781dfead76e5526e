//! Best-effort retrieval of grounding context.
//!
//! The [`Retriever`] embeds a user query and fetches the closest documents
//! from a fixed collection. Retrieval only augments the prompt: every failure
//! along the way degrades to an empty [`RetrievalResult`] and is logged, so a
//! reply can always be produced.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::embedding::EmbeddingProvider;
use crate::vectorstore::VectorStore;

/// Retrieved document texts, most similar first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievalResult {
    texts: Vec<String>,
}

impl RetrievalResult {
    /// A result with no documents.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The texts in rank order.
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Number of retrieved texts.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether nothing was retrieved.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

impl From<Vec<String>> for RetrievalResult {
    fn from(texts: Vec<String>) -> Self {
        Self { texts }
    }
}

impl<S: Into<String>> FromIterator<S> for RetrievalResult {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { texts: iter.into_iter().map(Into::into).collect() }
    }
}

/// Embeds queries and fetches the top-K texts from one collection.
pub struct Retriever {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    collection: String,
}

impl Retriever {
    /// Create a retriever over `collection`.
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self { embedding_provider, vector_store, collection: collection.into() }
    }

    /// The collection this retriever queries.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Retrieve up to `top_k` texts for `query`, in store rank order.
    ///
    /// Never fails: a blank query, an embedding or store error, or an empty
    /// result all yield an empty [`RetrievalResult`].
    pub async fn retrieve(&self, query: &str, top_k: usize) -> RetrievalResult {
        if query.trim().is_empty() {
            debug!(collection = %self.collection, "blank query, skipping retrieval");
            return RetrievalResult::empty();
        }

        let embedding = match self.embedding_provider.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(error = %e, "query embedding failed, continuing without context");
                return RetrievalResult::empty();
            }
        };

        let matches = match self.vector_store.query(&self.collection, &embedding, top_k).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!(
                    collection = %self.collection,
                    error = %e,
                    "vector store query failed, continuing without context"
                );
                return RetrievalResult::empty();
            }
        };

        if matches.is_empty() {
            warn!(collection = %self.collection, "no matches found");
            return RetrievalResult::empty();
        }

        let total = matches.len();
        let texts: Vec<String> = matches
            .into_iter()
            .filter(|m| !m.text.trim().is_empty())
            .take(top_k)
            .map(|m| m.text)
            .collect();
        if texts.len() < total.min(top_k) {
            warn!(collection = %self.collection, "dropped matches without text");
        }

        info!(collection = %self.collection, result_count = texts.len(), "retrieved context");
        RetrievalResult::from(texts)
    }
}
