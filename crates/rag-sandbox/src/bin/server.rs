//! RAG sandbox server binary
//!
//! Run with: cargo run -p rag-sandbox --bin rag-sandbox-server

use rag_sandbox::{config::RagConfig, generation::OllamaClient, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_sandbox=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = RagConfig::from_env()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Data folder: {}", config.ingest.data_dir.display());
    tracing::info!(
        "  - Collection: {} in {}",
        config.vector_db.collection,
        config.vector_db.persist_dir.display()
    );
    tracing::info!(
        "  - Embeddings: {:?} / {}",
        config.embeddings.backend,
        config.embeddings.model
    );
    tracing::info!(
        "  - Chunking: {} chars, {} overlap, batches of {}",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap,
        config.ingest.batch_size
    );
    tracing::info!("  - Chat model: {}", config.llm.chat_model);

    // Check Ollama
    tracing::info!("Checking Ollama at {}...", config.llm.base_url);
    let ollama = OllamaClient::new(&config.llm)?;
    if ollama.health_check().await? {
        tracing::info!("Ollama is running");
    } else {
        tracing::warn!("Ollama not available at {}", config.llm.base_url);
        tracing::warn!("/chat will fail until it is reachable; ingest and query still work");
        tracing::warn!("  Pull the chat model with: ollama pull {}", config.llm.chat_model);
    }

    // Create and start server
    let server = RagServer::new(config).await?;
    tracing::info!("Health: http://{}/health", server.address());

    server.start().await?;

    Ok(())
}
