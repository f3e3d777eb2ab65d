//! Response types for ingest, query and chat

use serde::{Deserialize, Serialize};

use super::document::Metadata;

/// Counts and echoed configuration returned by `POST /ingest`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestSummary {
    /// Always "ok" for a completed run
    pub status: String,
    /// Files with a recognized extension
    pub files_ingested: usize,
    /// Chunks upserted across all files
    pub chunks_ingested: usize,
    /// Collection written to
    pub collection: String,
    /// Directory holding the collection snapshot
    pub persist_dir: String,
    /// Embedding model used by the collection
    pub embed_model: String,
}

/// One nearest-neighbor hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHit {
    /// Chunk identifier
    pub id: String,
    /// Chunk text
    pub document: String,
    /// Stored metadata (`source`, `chunk`)
    #[serde(default)]
    pub metadata: Metadata,
    /// Cosine distance to the query, lower is closer
    #[serde(default)]
    pub distance: Option<f32>,
}

/// Response of `POST /query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Hits ordered by ascending distance
    pub results: Vec<QueryHit>,
    /// Requested k, echoed back
    pub k: i64,
}

impl QueryResponse {
    /// Response without hits
    pub fn empty(k: i64) -> Self {
        Self {
            results: Vec::new(),
            k,
        }
    }
}

/// Response of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model answer
    pub answer: String,
    /// Model that produced the answer
    pub model: String,
    /// Chunks supplied as context
    pub sources: Vec<QueryHit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_serializes_null_distance() {
        let hit = QueryHit {
            id: "a::000000".to_string(),
            document: "text".to_string(),
            metadata: Metadata::new(),
            distance: None,
        };
        let value = serde_json::to_value(&hit).unwrap();
        assert!(value["distance"].is_null());
        assert!(value["metadata"].as_object().unwrap().is_empty());
    }
}
