//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;
use crate::error::Result;

/// Text-to-vector capability consumed by the vector store
///
/// Implementations:
/// - `FastEmbedder`: local ONNX model via fastembed (bge-small by default)
/// - `OllamaEmbedder`: Ollama `/api/embeddings`
/// - `HashedEmbedder`: deterministic token hashing, no model
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch)
    ///
    /// Default implementation calls `embed` sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding dimensions (384 for bge-small-en-v1.5)
    fn dimensions(&self) -> usize;

    /// Model identifier, echoed in ingest summaries and stored with snapshots
    fn model_name(&self) -> &str;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
