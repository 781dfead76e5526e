//! Construction of the production adapters from [`ServerConfig`].
//!
//! All adapters share one connection-pooled `reqwest::Client`; each request
//! is bounded by the configured upstream timeout.

use std::sync::Arc;

use anyhow::Context;
use partselect_rag::{
    ChatOrchestrator, ChromaVectorStore, OpenAICompletionClient, OpenAIEmbeddingProvider,
    VectorStore,
};

use crate::config::ServerConfig;

/// The OpenAI embedding adapter.
pub fn embedding_provider(
    config: &ServerConfig,
    client: reqwest::Client,
) -> anyhow::Result<OpenAIEmbeddingProvider> {
    Ok(OpenAIEmbeddingProvider::new(config.openai_api_key.clone())
        .context("failed to create embedding provider")?
        .with_client(client)
        .with_base_url(config.openai_base_url.clone())
        .with_model(config.embedding_model.clone())
        .with_timeout(config.upstream_timeout))
}

/// The OpenAI chat-completion adapter.
pub fn completion_client(
    config: &ServerConfig,
    client: reqwest::Client,
) -> anyhow::Result<OpenAICompletionClient> {
    Ok(OpenAICompletionClient::new(config.openai_api_key.clone())
        .context("failed to create completion client")?
        .with_client(client)
        .with_base_url(config.openai_base_url.clone())
        .with_model(config.chat_model.clone())
        .with_timeout(config.upstream_timeout))
}

/// The Chroma vector store adapter.
pub fn vector_store(config: &ServerConfig, client: reqwest::Client) -> ChromaVectorStore {
    ChromaVectorStore::with_tenant(
        &config.chroma_url,
        &config.chroma_tenant,
        &config.chroma_database,
    )
    .with_client(client)
    .with_timeout(config.upstream_timeout)
}

/// Wire the full production pipeline.
pub fn orchestrator(
    config: &ServerConfig,
    client: reqwest::Client,
    vector_store: Arc<dyn VectorStore>,
) -> anyhow::Result<ChatOrchestrator> {
    ChatOrchestrator::builder()
        .config(config.rag_config()?)
        .embedding_provider(Arc::new(embedding_provider(config, client.clone())?))
        .vector_store(vector_store)
        .completion_client(Arc::new(completion_client(config, client)?))
        .build()
        .context("failed to build chat orchestrator")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig::from_lookup(|key: &str| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "CHAT_MODEL" => Some("gpt-4o-mini".to_string()),
            "COLLECTION_NAME" => Some("parts".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn adapters_follow_configuration() {
        let config = config();
        let completion = completion_client(&config, reqwest::Client::new()).unwrap();
        assert_eq!(completion.model(), "gpt-4o-mini");
        let embedding = embedding_provider(&config, reqwest::Client::new()).unwrap();
        assert_eq!(embedding.model(), "text-embedding-3-small");
    }

    #[test]
    fn orchestrator_queries_configured_collection() {
        let config = config();
        let client = reqwest::Client::new();
        let store = Arc::new(vector_store(&config, client.clone()));
        let orchestrator = orchestrator(&config, client, store).unwrap();
        assert_eq!(orchestrator.retriever().collection(), "parts");
        assert_eq!(orchestrator.config().top_k, 3);
    }
}
