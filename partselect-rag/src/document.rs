//! Data types for documents, stored records, and query matches.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document containing text content and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique, caller-assigned identifier.
    pub id: String,
    /// The text content of the document. Never empty.
    pub text: String,
    /// Key-value metadata associated with the document.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with no metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: HashMap::new() }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Pair this document with its embedding, producing an upsert record.
    pub fn embedded(self, embedding: Vec<f32>) -> EmbeddedDocument {
        EmbeddedDocument { id: self.id, text: self.text, embedding, metadata: self.metadata }
    }
}

/// A [`Document`] paired with its vector embedding, as stored in a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddedDocument {
    /// Unique identifier within the collection. Upserts overwrite by id.
    pub id: String,
    /// The text content.
    pub text: String,
    /// The vector embedding for the text.
    pub embedding: Vec<f32>,
    /// Key-value metadata.
    pub metadata: HashMap<String, String>,
}

/// A stored document returned by a nearest-neighbor query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryMatch {
    /// The id of the matched document.
    pub id: String,
    /// The text of the matched document.
    pub text: String,
    /// Metadata stored with the document.
    pub metadata: HashMap<String, String>,
    /// Distance to the query vector (lower is closer), when the backend
    /// reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}
