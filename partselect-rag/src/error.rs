//! Error types for the `partselect-rag` crate.

use thiserror::Error;

/// Errors that can occur in the chat pipeline and its adapters.
#[derive(Debug, Error)]
pub enum RagError {
    /// An external service (embeddings, completions, vector store) was
    /// unreachable, timed out, answered with a non-2xx status, or returned a
    /// payload that did not match the expected shape.
    #[error("Upstream error ({service}): {message}")]
    UpstreamError {
        /// The service that produced the error.
        service: String,
        /// A description of the failure.
        message: String,
    },

    /// The requested collection does not exist.
    #[error("Collection '{collection}' not found")]
    NotFoundError {
        /// The missing collection.
        collection: String,
    },

    /// A collection with the same name already exists.
    #[error("Collection '{collection}' already exists")]
    ConflictError {
        /// The conflicting collection.
        collection: String,
    },

    /// A vector's length disagrees with the collection's established
    /// dimensionality.
    #[error("Dimension mismatch in collection '{collection}': {message}")]
    DimensionMismatchError {
        /// The collection that rejected the vector.
        collection: String,
        /// A description of the mismatch.
        message: String,
    },

    /// An argument was rejected before any external call was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RagError {
    pub(crate) fn upstream(service: &str, message: impl Into<String>) -> Self {
        Self::UpstreamError { service: service.to_string(), message: message.into() }
    }

    pub(crate) fn not_found(collection: &str) -> Self {
        Self::NotFoundError { collection: collection.to_string() }
    }

    pub(crate) fn conflict(collection: &str) -> Self {
        Self::ConflictError { collection: collection.to_string() }
    }

    pub(crate) fn dimension_mismatch(collection: &str, message: impl Into<String>) -> Self {
        Self::DimensionMismatchError { collection: collection.to_string(), message: message.into() }
    }
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
