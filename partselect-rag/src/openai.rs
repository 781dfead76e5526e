//! OpenAI embedding and chat-completion adapters.
//!
//! This module is only available when the `openai` feature is enabled. Both
//! adapters call the REST API directly with `reqwest`, validate the response
//! against a typed schema, and report every failure (transport, timeout,
//! non-2xx status, missing fields) as [`RagError::UpstreamError`].

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::completion::CompletionClient;
use crate::config::DEFAULT_UPSTREAM_TIMEOUT;
use crate::conversation::{ChatMessage, Conversation};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// The default model for embeddings.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
pub const DEFAULT_DIMENSIONS: usize = 1536;

/// The default model for chat completions.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4";

const EMBEDDING_SERVICE: &str = "openai-embeddings";
const COMPLETION_SERVICE: &str = "openai-chat";

fn read_api_key() -> Result<String> {
    std::env::var("OPENAI_API_KEY")
        .map_err(|_| RagError::ConfigError("OPENAI_API_KEY environment variable not set".into()))
}

fn validate_api_key(api_key: &str) -> Result<()> {
    if api_key.is_empty() {
        return Err(RagError::ConfigError("OpenAI API key must not be empty".into()));
    }
    Ok(())
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// POST a JSON body and decode a JSON response, mapping every failure to
/// [`RagError::UpstreamError`] for `service`.
async fn post_json<B, R>(
    client: &reqwest::Client,
    service: &str,
    url: &str,
    api_key: &str,
    timeout: Duration,
    body: &B,
) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .timeout(timeout)
        .json(body)
        .send()
        .await
        .map_err(|e| {
            error!(service, error = %e, "request failed");
            if e.is_timeout() {
                RagError::upstream(service, format!("request timed out after {timeout:?}"))
            } else {
                RagError::upstream(service, format!("request failed: {e}"))
            }
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        error!(service, error = %e, "failed to read response body");
        RagError::upstream(service, format!("failed to read response body: {e}"))
    })?;

    if !status.is_success() {
        let detail =
            serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);
        error!(service, %status, "API error");
        return Err(RagError::upstream(service, format!("API returned {status}: {detail}")));
    }

    serde_json::from_str(&body).map_err(|e| {
        error!(service, error = %e, "failed to parse response");
        RagError::upstream(service, format!("malformed response: {e}"))
    })
}

// ── Embeddings ─────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// # Configuration
///
/// - `model` – defaults to `text-embedding-3-small`.
/// - `dimensions` – optional Matryoshka dimension override.
/// - `base_url` – defaults to `https://api.openai.com/v1`; any compatible
///   endpoint works.
/// - `timeout` – per-request bound, defaults to 30 seconds.
/// - `api_key` – from the constructor or the `OPENAI_API_KEY` environment variable.
///
/// # Example
///
/// ```rust,ignore
/// use partselect_rag::openai::OpenAIEmbeddingProvider;
///
/// let provider = OpenAIEmbeddingProvider::new("sk-...")?;
/// let embedding = provider.embed("refrigerator door shelf bin").await?;
/// ```
#[derive(Debug, Clone)]
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
    timeout: Duration,
}

impl OpenAIEmbeddingProvider {
    /// Create a new provider with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        validate_api_key(&api_key)?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            request_dimensions: None,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        })
    }

    /// Create a new provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::new(read_api_key()?)
    }

    /// Set the model name (e.g. `text-embedding-3-large`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL (without the trailing `/embeddings`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share an existing HTTP client (connection pool).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Set the output dimensions (Matryoshka support).
    ///
    /// When set, the API returns embeddings truncated to this size.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(RagError::InvalidInput("cannot embed empty text".into()));
        }
        debug!(provider = "OpenAI", text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| RagError::upstream(EMBEDDING_SERVICE, "response contained no embeddings"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "OpenAI",
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.request_dimensions,
        };

        let url = format!("{}/embeddings", self.base_url);
        let response: EmbeddingResponse = post_json(
            &self.client,
            EMBEDDING_SERVICE,
            &url,
            &self.api_key,
            self.timeout,
            &request_body,
        )
        .await?;

        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Chat completions ───────────────────────────────────────────────

/// A [`CompletionClient`] backed by the OpenAI chat-completions API.
///
/// Sends the conversation as-is and returns `choices[0].message.content`.
#[derive(Debug, Clone)]
pub struct OpenAICompletionClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OpenAICompletionClient {
    /// Create a new client with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        validate_api_key(&api_key)?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_CHAT_MODEL.into(),
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        })
    }

    /// Create a new client using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::new(read_api_key()?)
    }

    /// Set the model name (e.g. `gpt-4o-mini`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL (without the trailing `/chat/completions`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share an existing HTTP client (connection pool).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for OpenAICompletionClient {
    async fn complete(&self, conversation: &Conversation) -> Result<String> {
        debug!(
            provider = "OpenAI",
            model = %self.model,
            message_count = conversation.len(),
            "requesting chat completion"
        );

        let request_body = ChatRequest { model: &self.model, messages: conversation.messages() };
        let url = format!("{}/chat/completions", self.base_url);
        let response: ChatResponse = post_json(
            &self.client,
            COMPLETION_SERVICE,
            &url,
            &self.api_key,
            self.timeout,
            &request_body,
        )
        .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                error!(provider = "OpenAI", "response missing first choice message");
                RagError::upstream(COMPLETION_SERVICE, "response missing choices[0].message.content")
            })
    }
}
