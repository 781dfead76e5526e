//! Configuration for the chat pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Name of the collection holding the PartSelect documents.
pub const DEFAULT_COLLECTION: &str = "partselect-docs";

/// Number of documents retrieved per turn.
pub const DEFAULT_TOP_K: usize = 3;

/// The reply returned to the user when a turn cannot be answered.
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong.";

/// Bound applied to every outbound embedding, completion, and store request.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration parameters for the chat pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Collection queried for grounding context.
    pub collection: String,
    /// Number of documents retrieved per turn.
    pub top_k: usize,
    /// Reply returned when a turn fails.
    pub fallback_reply: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            top_k: DEFAULT_TOP_K,
            fallback_reply: FALLBACK_REPLY.to_string(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `collection` is empty
    /// - `top_k == 0`
    /// - `fallback_reply` is empty
    pub fn validate(&self) -> Result<()> {
        if self.collection.trim().is_empty() {
            return Err(RagError::ConfigError("collection must not be empty".to_string()));
        }
        if self.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.fallback_reply.is_empty() {
            return Err(RagError::ConfigError("fallback_reply must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the collection queried for context.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the number of documents retrieved per turn.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the reply returned when a turn fails.
    pub fn fallback_reply(mut self, reply: impl Into<String>) -> Self {
        self.config.fallback_reply = reply.into();
        self
    }

    /// Build the [`RagConfig`], validating it with [`RagConfig::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if validation fails.
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
