//! Completion client trait for generating a reply from a conversation.

use async_trait::async_trait;

use crate::conversation::Conversation;
use crate::error::Result;

/// A chat-completion backend.
///
/// One call is one request/response exchange: no streaming, no tool calls.
/// Implementations return the text of the first generated candidate.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a reply for the full conversation, system message included.
    async fn complete(&self, conversation: &Conversation) -> Result<String>;
}
