//! Reset the configured collection and load the PartSelect sample documents.

use anyhow::Context;
use partselect_rag::{sample_documents, seed_collection};
use partselect_server::{ServerConfig, backends, logging};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("failed to load configuration")?;
    logging::init();

    let client = reqwest::Client::new();
    let embedding_provider = backends::embedding_provider(&config, client.clone())?;
    let vector_store = backends::vector_store(&config, client);

    let documents = sample_documents();
    let report = seed_collection(&embedding_provider, &vector_store, &config.collection, &documents)
        .await
        .with_context(|| format!("failed to seed collection '{}'", config.collection))?;

    info!(
        collection = %report.collection,
        documents = report.documents,
        reused_existing = report.reused_existing,
        "seeding complete"
    );
    Ok(())
}
