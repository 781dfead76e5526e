//! Collection seeding.
//!
//! Resets a collection and loads documents into it: delete (if present),
//! create, then embed and upsert each document. Seeding is an administrative
//! run-to-completion job; it must not overlap with chat traffic against the
//! same collection, which would briefly observe the collection as missing.

use tracing::{info, warn};

use crate::document::Document;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Summary of a seeding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    /// The seeded collection.
    pub collection: String,
    /// Number of documents embedded and stored.
    pub documents: usize,
    /// Whether an existing collection had to be reused because creation
    /// reported a conflict.
    pub reused_existing: bool,
}

/// The fixed PartSelect sample documents.
///
/// Each document carries its text under the `content` metadata key.
pub fn sample_documents() -> Vec<Document> {
    [
        (
            "001",
            "Part W10312345 is a dishwasher spray arm for Whirlpool model WDT720PADM1. It \
             distributes water during the wash cycle and costs $22.49.",
        ),
        (
            "002",
            "Part WPW10321304 is a Refrigerator Door Shelf Bin that is compatible with any \
             Manufactured by Whirlpool for Whirlpool, Kenmore, Maytag, KitchenAid refrigerators. \
             It costs $36.08",
        ),
        (
            "003",
            "Part WPW10662129 is a capacitor that is compatible with Whirlpool, Kenmore, Amana, \
             KitchenAid refrigerators. It provides the voltage or energy current required to \
             start the compressor and keep it running. It allows the compressor in your appliance \
             to easily cycle on and off. This capacitor mounts directly onto the compressor \
             starting relay. If the capacitor is faulty the compressor may get unusually hot and \
             draw excessive amperage. It the compressor overheats, it may fail to run until it \
             cools down again. The compressor may also get noisy from overheating. If this part \
             is totally electrically open, it is defective (often due to overheating) and needs \
             to be replaced. The part measures 1 inch by 1-1/2 inches, and is constructed of \
             plastic with two metal wire terminals. This item includes 1 capacitor, sold \
             individually. This part comes in black. It costs $34.89",
        ),
    ]
    .into_iter()
    .map(|(id, text)| Document::new(id, text).with_metadata("content", text))
    .collect()
}

/// Reset `collection` and load `documents` into it.
///
/// A missing collection on delete and a conflict on create are logged and
/// tolerated. Any other create failure, and any embedding or upsert failure,
/// aborts the run.
pub async fn seed_collection(
    embedding_provider: &dyn EmbeddingProvider,
    vector_store: &dyn VectorStore,
    collection: &str,
    documents: &[Document],
) -> Result<SeedReport> {
    if let Err(e) = vector_store.delete_collection(collection).await {
        warn!(collection, error = %e, "could not delete existing collection, continuing");
    }

    let reused_existing = match vector_store.create_collection(collection).await {
        Ok(()) => {
            info!(collection, "created collection");
            false
        }
        Err(RagError::ConflictError { .. }) => {
            warn!(collection, "collection already exists, upserting into it");
            true
        }
        Err(e) => return Err(e),
    };

    for document in documents {
        if document.text.trim().is_empty() {
            return Err(RagError::InvalidInput(format!("document '{}' has no text", document.id)));
        }
        info!(collection, document.id = %document.id, "embedding document");
        let embedding = embedding_provider.embed(&document.text).await?;
        vector_store.upsert(collection, &[document.clone().embedded(embedding)]).await?;
    }

    info!(collection, count = documents.len(), "all documents embedded and stored");
    Ok(SeedReport { collection: collection.to_string(), documents: documents.len(), reused_existing })
}
