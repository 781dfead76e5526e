//! Environment configuration for the server and the seeding tool.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `OPENAI_API_KEY` | required |
//! | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |
//! | `EMBEDDING_MODEL` | `text-embedding-3-small` |
//! | `CHAT_MODEL` | `gpt-4` |
//! | `CHROMA_URL` | `http://localhost:8000` |
//! | `CHROMA_TENANT` | `default_tenant` |
//! | `CHROMA_DATABASE` | `default_database` |
//! | `COLLECTION_NAME` | `partselect-docs` |
//! | `RAG_TOP_K` | `3` |
//! | `UPSTREAM_TIMEOUT_SECS` | `30` |
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `5000` |

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use partselect_rag::RagConfig;
use partselect_rag::config::{DEFAULT_COLLECTION, DEFAULT_TOP_K, DEFAULT_UPSTREAM_TIMEOUT};
use partselect_rag::{chroma, openai};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub chroma_url: String,
    pub chroma_tenant: String,
    pub chroma_database: String,
    pub collection: String,
    pub top_k: usize,
    pub upstream_timeout: Duration,
}

impl ServerConfig {
    /// Read the configuration from the process environment, loading a
    /// `.env` file first when one is present.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let Some(openai_api_key) = get("OPENAI_API_KEY") else {
            bail!("OPENAI_API_KEY must be set");
        };

        let top_k = parse_or(get("RAG_TOP_K"), "RAG_TOP_K", DEFAULT_TOP_K)?;
        if top_k == 0 {
            bail!("RAG_TOP_K must be greater than 0");
        }
        let timeout_secs = parse_or(
            get("UPSTREAM_TIMEOUT_SECS"),
            "UPSTREAM_TIMEOUT_SECS",
            DEFAULT_UPSTREAM_TIMEOUT.as_secs(),
        )?;
        if timeout_secs == 0 {
            bail!("UPSTREAM_TIMEOUT_SECS must be greater than 0");
        }

        Ok(Self {
            host: or("HOST", "0.0.0.0"),
            port: parse_or(get("PORT"), "PORT", 5000)?,
            openai_api_key,
            openai_base_url: or("OPENAI_BASE_URL", openai::DEFAULT_BASE_URL),
            embedding_model: or("EMBEDDING_MODEL", openai::DEFAULT_EMBEDDING_MODEL),
            chat_model: or("CHAT_MODEL", openai::DEFAULT_CHAT_MODEL),
            chroma_url: or("CHROMA_URL", chroma::DEFAULT_URL),
            chroma_tenant: or("CHROMA_TENANT", chroma::DEFAULT_TENANT),
            chroma_database: or("CHROMA_DATABASE", chroma::DEFAULT_DATABASE),
            collection: or("COLLECTION_NAME", DEFAULT_COLLECTION),
            top_k,
            upstream_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// The socket address to listen on.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid host/port {}:{}", self.host, self.port))
    }

    /// The pipeline configuration derived from this server configuration.
    pub fn rag_config(&self) -> anyhow::Result<RagConfig> {
        RagConfig::builder()
            .collection(&self.collection)
            .top_k(self.top_k)
            .build()
            .context("invalid pipeline configuration")
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw.parse().with_context(|| format!("{key} must be a number, got '{raw}'")),
        None => Ok(default),
    }
}
