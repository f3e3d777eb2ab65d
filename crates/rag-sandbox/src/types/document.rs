//! Source file and chunk types

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Free-form metadata attached to a stored record
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Ingestible file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Markdown file (.md, .markdown)
    Markdown,
    /// Plain text file (.txt)
    Txt,
}

impl FileType {
    /// Detect file type from extension, case-insensitively
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Detect file type from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Where a chunk came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSource {
    /// Absolute path of the source file
    pub source: String,
    /// Zero-based position of the chunk within its file
    pub chunk: usize,
}

impl ChunkSource {
    /// Metadata record stored alongside the chunk
    pub fn to_metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), self.source.clone().into());
        metadata.insert("chunk".to_string(), self.chunk.into());
        metadata
    }
}

/// A contiguous slice of a source file, ready for upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// Stable identifier, `<path>::<6-digit index>`
    pub id: String,
    /// Raw chunk text
    pub content: String,
    /// Source tracking
    pub source: ChunkSource,
}

impl DocumentChunk {
    /// Create a chunk for `path` at position `index`
    pub fn new(path: &str, index: usize, content: String) -> Self {
        Self {
            id: Self::make_id(path, index),
            content,
            source: ChunkSource {
                source: path.to_string(),
                chunk: index,
            },
        }
    }

    /// Identifier shared by every ingest of the same file and position
    pub fn make_id(path: &str, index: usize) -> String {
        format!("{}::{:06}", path, index)
    }
}
