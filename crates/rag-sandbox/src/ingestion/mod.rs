//! Folder ingestion: character chunking and batched upsert

mod batch;
mod chunker;
mod pipeline;
pub mod reader;

pub use batch::BatchBuffer;
pub use chunker::TextChunker;
pub use pipeline::IngestPipeline;
pub use reader::{decode_lossy, discover_files, resolve_root, DecodedText};
