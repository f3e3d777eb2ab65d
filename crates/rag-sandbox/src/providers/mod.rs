//! Provider abstractions for embeddings and vector storage
//!
//! The vector store only sees the narrow `EmbeddingProvider` trait, so the
//! embedding backend is chosen once at startup from configuration.

pub mod embedding;
pub mod hashed;
pub mod local;
pub mod ollama;
pub mod onnx_embedder;
pub mod vector_store;

use std::sync::Arc;

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::error::Result;
use crate::generation::OllamaClient;

pub use embedding::EmbeddingProvider;
pub use hashed::HashedEmbedder;
pub use local::LocalCollection;
pub use ollama::OllamaEmbedder;
pub use onnx_embedder::FastEmbedder;
pub use vector_store::{RawQueryResult, UpsertBatch, VectorStoreProvider};

/// Build the configured embedding backend
///
/// `ollama` is shared with the chat proxy when the Ollama backend is selected.
pub async fn build_embedder(
    config: &EmbeddingConfig,
    ollama: &Arc<OllamaClient>,
) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedder: Arc<dyn EmbeddingProvider> = match config.backend {
        EmbeddingBackend::FastEmbed => Arc::new(FastEmbedder::new(&config.model).await?),
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbedder::from_client(
            Arc::clone(ollama),
            config.model.clone(),
            config.dimensions,
        )),
        EmbeddingBackend::Hashed => Arc::new(HashedEmbedder::new(config.dimensions)),
    };

    tracing::info!(
        "Embedding backend: {} (model {}, {} dimensions)",
        embedder.name(),
        embedder.model_name(),
        embedder.dimensions()
    );

    Ok(embedder)
}
