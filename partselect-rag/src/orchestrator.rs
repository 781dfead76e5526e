//! Per-turn chat orchestrator.
//!
//! The [`ChatOrchestrator`] runs one turn as a strict sequence: retrieve
//! context for the latest user message, assemble the grounded prompt, and
//! request a completion. It holds no per-conversation state; the caller
//! passes the whole [`Conversation`] every turn.
//!
//! # Example
//!
//! ```rust,ignore
//! use partselect_rag::{ChatOrchestrator, RagConfig, InMemoryVectorStore};
//!
//! let orchestrator = ChatOrchestrator::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .completion_client(Arc::new(completion))
//!     .build()?;
//!
//! let reply = orchestrator.reply(&conversation).await;
//! println!("{}", reply.reply);
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::completion::CompletionClient;
use crate::config::RagConfig;
use crate::conversation::Conversation;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::prompt::PromptAssembler;
use crate::retriever::Retriever;
use crate::vectorstore::VectorStore;

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The completion service produced the reply.
    Answered,
    /// The turn failed and the fixed fallback reply was substituted.
    Fallback {
        /// Server-side description of the failure. Never shown to users.
        diagnostic: String,
    },
}

/// The reply for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Text to show the user.
    pub reply: String,
    /// Whether `reply` is a real answer or the fallback.
    pub outcome: ReplyOutcome,
}

impl ChatReply {
    /// Whether the fallback reply was substituted.
    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, ReplyOutcome::Fallback { .. })
    }
}

/// The chat orchestrator.
///
/// Composes [`Retriever`] → [`PromptAssembler`] → [`CompletionClient`].
/// Construct one via [`ChatOrchestrator::builder()`].
pub struct ChatOrchestrator {
    config: RagConfig,
    retriever: Retriever,
    assembler: PromptAssembler,
    completion_client: Arc<dyn CompletionClient>,
}

impl ChatOrchestrator {
    /// Create a new [`ChatOrchestratorBuilder`].
    pub fn builder() -> ChatOrchestratorBuilder {
        ChatOrchestratorBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the retriever.
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Answer the latest user message in `conversation`.
    ///
    /// Never fails: any error is logged and replaced by the configured
    /// fallback reply, with the cause kept in [`ReplyOutcome::Fallback`].
    pub async fn reply(&self, conversation: &Conversation) -> ChatReply {
        match self.try_reply(conversation).await {
            Ok(reply) => {
                info!(reply_len = reply.len(), "turn answered");
                ChatReply { reply, outcome: ReplyOutcome::Answered }
            }
            Err(e) => {
                error!(error = %e, "chat turn failed, returning fallback reply");
                ChatReply {
                    reply: self.config.fallback_reply.clone(),
                    outcome: ReplyOutcome::Fallback { diagnostic: e.to_string() },
                }
            }
        }
    }

    /// Run one turn, surfacing the first error.
    pub async fn try_reply(&self, conversation: &Conversation) -> Result<String> {
        // 1. Latest user message; a conversation without one still gets a reply
        let query = conversation.last_user_message().unwrap_or_default();

        // 2. Retrieve grounding context (best effort)
        let retrieved = self.retriever.retrieve(query, self.config.top_k).await;

        // 3. Assemble the grounded prompt
        let assembled = self.assembler.assemble(conversation, &retrieved);

        // 4. Generate the reply
        info!(
            message_count = assembled.len(),
            context_count = retrieved.len(),
            "requesting completion"
        );
        self.completion_client.complete(&assembled).await
    }
}

/// Builder for constructing a [`ChatOrchestrator`].
///
/// `embedding_provider`, `vector_store` and `completion_client` are required;
/// `config` and `assembler` fall back to their defaults. The retriever queries
/// the collection named by the configuration.
#[derive(Default)]
pub struct ChatOrchestratorBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    assembler: Option<PromptAssembler>,
    completion_client: Option<Arc<dyn CompletionClient>>,
}

impl ChatOrchestratorBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider used for queries.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the prompt assembler.
    pub fn assembler(mut self, assembler: PromptAssembler) -> Self {
        self.assembler = Some(assembler);
        self
    }

    /// Set the completion client.
    pub fn completion_client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.completion_client = Some(client);
        self
    }

    /// Build the [`ChatOrchestrator`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing or
    /// the configuration fails [`RagConfig::validate`].
    pub fn build(self) -> Result<ChatOrchestrator> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let completion_client = self
            .completion_client
            .ok_or_else(|| RagError::ConfigError("completion_client is required".to_string()))?;

        let retriever = Retriever::new(embedding_provider, vector_store, config.collection.clone());
        Ok(ChatOrchestrator {
            config,
            retriever,
            assembler: self.assembler.unwrap_or_default(),
            completion_client,
        })
    }
}
