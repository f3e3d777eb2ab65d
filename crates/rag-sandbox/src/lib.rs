//! rag-sandbox: folder-to-vector-store retrieval sandbox
//!
//! Walks a folder of markdown and text notes, splits each file into fixed-size
//! overlapping character chunks, and upserts them in batches into a named
//! vector collection. Queries are delegated to the collection's
//! nearest-neighbor search, and a chat endpoint forwards retrieved context to
//! a local Ollama model.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use ingestion::{IngestPipeline, TextChunker};
pub use types::{
    ChatRequest, ChatResponse, DocumentChunk, IngestSummary, QueryHit, QueryRequest,
    QueryResponse,
};
