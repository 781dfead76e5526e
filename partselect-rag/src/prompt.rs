//! System prompt assembly.
//!
//! [`PromptAssembler::assemble`] is the single place where retrieved context
//! and conversation history are combined into the payload sent to the
//! completion service. It is pure: the same inputs always produce the same
//! conversation.

use crate::conversation::{ChatMessage, Conversation};
use crate::retriever::RetrievalResult;

/// Inserted in place of context when retrieval found nothing.
pub const NO_CONTEXT_PLACEHOLDER: &str = "No additional product info found.";

/// Line surrounding the context block.
pub const CONTEXT_DELIMITER: &str = "========";

/// Separator between retrieved texts inside the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// An appliance category with both noun forms used in the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appliance {
    /// Used before "parts", e.g. `refrigerator`.
    pub singular: String,
    /// Used when naming the scope, e.g. `refrigerators`.
    pub plural: String,
}

impl Appliance {
    /// An appliance with an irregular plural, e.g. `("range hood", "range hoods")`.
    pub fn new(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self { singular: singular.into(), plural: plural.into() }
    }

    /// An appliance whose plural is the singular plus "s".
    pub fn regular(singular: impl Into<String>) -> Self {
        let singular = singular.into();
        let plural = format!("{singular}s");
        Self { singular, plural }
    }
}

/// The domain the assistant is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptScope {
    /// The store the assistant represents, e.g. `PartSelect.com`.
    pub store: String,
    /// Appliance categories in scope.
    pub appliances: Vec<Appliance>,
}

impl Default for PromptScope {
    fn default() -> Self {
        Self {
            store: "PartSelect.com".to_string(),
            appliances: vec![Appliance::regular("refrigerator"), Appliance::regular("dishwasher")],
        }
    }
}

fn join_list(items: &[&str]) -> Option<String> {
    match items {
        [] => None,
        [only] => Some(only.to_string()),
        [init @ .., last] => Some(format!("{} and {last}", init.join(", "))),
    }
}

impl PromptScope {
    /// "refrigerators and dishwashers"
    fn appliance_list(&self) -> String {
        let plurals: Vec<&str> = self.appliances.iter().map(|a| a.plural.as_str()).collect();
        join_list(&plurals).unwrap_or_else(|| "home appliances".to_string())
    }

    /// "refrigerator and dishwasher parts"
    fn part_list(&self) -> String {
        let singulars: Vec<&str> = self.appliances.iter().map(|a| a.singular.as_str()).collect();
        let nouns = join_list(&singulars).unwrap_or_else(|| "appliance".to_string());
        format!("{nouns} parts")
    }
}

/// Builds the grounded system message and prepends it to a conversation.
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    scope: PromptScope,
}

impl PromptAssembler {
    /// Create an assembler for the given scope.
    pub fn new(scope: PromptScope) -> Self {
        Self { scope }
    }

    /// The configured scope.
    pub fn scope(&self) -> &PromptScope {
        &self.scope
    }

    /// Render the system instruction for the given retrieved context.
    pub fn system_prompt(&self, retrieved: &RetrievalResult) -> String {
        let context = if retrieved.is_empty() {
            NO_CONTEXT_PLACEHOLDER.to_string()
        } else {
            retrieved.texts().join(CONTEXT_SEPARATOR)
        };
        let store = &self.scope.store;
        let parts = self.scope.part_list();
        let appliances = self.scope.appliance_list();

        format!(
            "You are a helpful customer support assistant for {store}.\n\
             \n\
             You help users specifically with **{parts} only**. You can answer questions \
             about part installation, compatibility with specific appliance models, \
             troubleshooting issues, and ordering support.\n\
             \n\
             If available, use the following product information to answer the user's question:\n\
             \n\
             {CONTEXT_DELIMITER}\n\
             {context}\n\
             {CONTEXT_DELIMITER}\n\
             \n\
             If no relevant product information is provided, you may use your general knowledge \
             from {store}, but stay strictly within the scope of {appliances}.\n\
             \n\
             Do not answer questions about unrelated appliances or topics."
        )
    }

    /// Prepend the system message to `conversation`, leaving the original
    /// messages untouched and in order.
    pub fn assemble(&self, conversation: &Conversation, retrieved: &RetrievalResult) -> Conversation {
        std::iter::once(ChatMessage::system(self.system_prompt(retrieved)))
            .chain(conversation.messages().iter().cloned())
            .collect()
    }
}
