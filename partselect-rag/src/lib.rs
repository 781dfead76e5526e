//! # partselect-rag
//!
//! Retrieval-augmented chat pipeline for PartSelect appliance-part support.
//!
//! ## Overview
//!
//! Each chat turn runs one fixed sequence:
//!
//! 1. embed the latest user message ([`EmbeddingProvider`])
//! 2. fetch the closest product documents ([`VectorStore`], via [`Retriever`])
//! 3. prepend a grounded system prompt ([`PromptAssembler`])
//! 4. request a completion ([`CompletionClient`])
//!
//! [`ChatOrchestrator`] wires the steps together and never fails a turn:
//! retrieval problems degrade to an empty context, and completion problems
//! yield a fixed fallback reply.
//!
//! ## Backends
//!
//! | Feature | Type | Purpose |
//! |---------|------|---------|
//! | `openai` | [`OpenAIEmbeddingProvider`], [`OpenAICompletionClient`] | Embeddings and chat completions |
//! | `chroma` | [`ChromaVectorStore`] | Chroma HTTP vector store |
//! | (always) | [`InMemoryVectorStore`] | Local development and tests |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use partselect_rag::{
//!     ChatOrchestrator, ChromaVectorStore, Conversation, ChatMessage,
//!     OpenAICompletionClient, OpenAIEmbeddingProvider, RagConfig,
//! };
//!
//! let orchestrator = ChatOrchestrator::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(OpenAIEmbeddingProvider::from_env()?))
//!     .vector_store(Arc::new(ChromaVectorStore::default_url()))
//!     .completion_client(Arc::new(OpenAICompletionClient::from_env()?))
//!     .build()?;
//!
//! let conversation = Conversation::new().with(ChatMessage::user("How do I install W10312345?"));
//! let reply = orchestrator.reply(&conversation).await;
//! ```

pub mod completion;
pub mod config;
pub mod conversation;
pub mod document;
pub mod embedding;
pub mod error;
pub mod guided;
pub mod inmemory;
pub mod orchestrator;
pub mod prompt;
pub mod retriever;
pub mod seed;
pub mod vectorstore;

#[cfg(feature = "chroma")]
pub mod chroma;
#[cfg(feature = "openai")]
pub mod openai;

pub use completion::CompletionClient;
pub use config::{RagConfig, RagConfigBuilder};
pub use conversation::{ChatMessage, Conversation, Role};
pub use document::{Document, EmbeddedDocument, QueryMatch};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use guided::{FlowAction, GuidedFlow, PendingSlot, Transition};
pub use inmemory::InMemoryVectorStore;
pub use orchestrator::{ChatOrchestrator, ChatOrchestratorBuilder, ChatReply, ReplyOutcome};
pub use prompt::{Appliance, PromptAssembler, PromptScope};
pub use retriever::{RetrievalResult, Retriever};
pub use seed::{SeedReport, sample_documents, seed_collection};
pub use vectorstore::VectorStore;

#[cfg(feature = "chroma")]
pub use chroma::ChromaVectorStore;
#[cfg(feature = "openai")]
pub use openai::{OpenAICompletionClient, OpenAIEmbeddingProvider};
