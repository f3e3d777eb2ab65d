//! Core types for the RAG sandbox

pub mod document;
pub mod query;
pub mod response;

pub use document::{ChunkSource, DocumentChunk, FileType, Metadata};
pub use query::{ChatRequest, QueryRequest};
pub use response::{ChatResponse, IngestSummary, QueryHit, QueryResponse};
