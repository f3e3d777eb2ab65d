//! Application state for the RAG server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::OllamaClient;
use crate::ingestion::IngestPipeline;
use crate::providers::{build_embedder, EmbeddingProvider, LocalCollection, VectorStoreProvider};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Collection the ingest and query paths talk to
    store: Arc<dyn VectorStoreProvider>,
    /// Embedding backend owned by the collection
    embedder: Arc<dyn EmbeddingProvider>,
    /// Ollama client for chat
    ollama: Arc<OllamaClient>,
    /// Folder ingest pipeline
    pipeline: IngestPipeline,
}

impl AppState {
    /// Create new application state from configuration
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing RAG sandbox state...");

        let ollama = Arc::new(OllamaClient::new(&config.llm)?);
        tracing::info!("Ollama client initialized ({})", config.llm.base_url);

        let embedder = build_embedder(&config.embeddings, &ollama).await?;

        let store: Arc<dyn VectorStoreProvider> =
            Arc::new(LocalCollection::open(&config.vector_db, Arc::clone(&embedder))?);
        tracing::info!(
            "Vector store initialized (collection '{}', {} records)",
            store.collection(),
            store.count().await?
        );

        Self::from_parts(config, store, embedder, ollama)
    }

    /// Assemble state from already-built collaborators
    pub fn from_parts(
        config: RagConfig,
        store: Arc<dyn VectorStoreProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        ollama: Arc<OllamaClient>,
    ) -> Result<Self> {
        let pipeline =
            IngestPipeline::from_config(&config, Arc::clone(&store), embedder.model_name())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                embedder,
                ollama,
                pipeline,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the vector store
    pub fn store(&self) -> &Arc<dyn VectorStoreProvider> {
        &self.inner.store
    }

    /// Get the embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get Ollama client
    pub fn ollama(&self) -> &Arc<OllamaClient> {
        &self.inner.ollama
    }

    /// Get the ingest pipeline
    pub fn pipeline(&self) -> &IngestPipeline {
        &self.inner.pipeline
    }

    /// Store and embedder both report healthy
    pub async fn is_ready(&self) -> bool {
        let store_ok = self.inner.store.health_check().await.unwrap_or(false);
        let embedder_ok = self.inner.embedder.health_check().await.unwrap_or(false);
        store_ok && embedder_ok
    }

    /// Best-effort flush of the collection, used on shutdown
    pub async fn persist(&self) {
        match self.inner.store.persist().await {
            Ok(()) => tracing::info!("Collection '{}' persisted", self.inner.store.collection()),
            Err(e) => tracing::debug!("Persist on shutdown skipped: {}", e),
        }
    }
}
