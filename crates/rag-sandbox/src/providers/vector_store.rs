//! Vector store provider trait for upserting and searching chunk records

use async_trait::async_trait;
use crate::error::{Error, Result};
use crate::types::Metadata;

/// Parallel sequences handed to one upsert call
///
/// Index `i` of each vector describes the same record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpsertBatch {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Metadata>,
}

impl UpsertBatch {
    /// Number of records in the batch
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Reject batches whose sequences disagree in length
    pub fn validate(&self) -> Result<()> {
        if self.documents.len() != self.ids.len() || self.metadatas.len() != self.ids.len() {
            return Err(Error::vector_db(format!(
                "Upsert sequences differ in length: {} ids, {} documents, {} metadatas",
                self.ids.len(),
                self.documents.len(),
                self.metadatas.len()
            )));
        }
        Ok(())
    }
}

/// Nearest-neighbor result in the store's native parallel-array shape
///
/// Stores may return fewer ids, metadatas or distances than documents;
/// consumers must not index past each vector's own length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawQueryResult {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Metadata>,
    pub distances: Vec<f32>,
}

/// Trait for a named collection with upsert and similarity search
///
/// Implementations:
/// - `LocalCollection`: in-process collection with a JSON snapshot on disk
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert or replace records keyed by id
    async fn upsert(&self, batch: UpsertBatch) -> Result<()>;

    /// Return up to `n_results` records closest to `query_text`
    async fn query(&self, query_text: &str, n_results: usize) -> Result<RawQueryResult>;

    /// Flush state to durable storage
    ///
    /// Stores that persist on every write need not override this.
    async fn persist(&self) -> Result<()> {
        Err(Error::unsupported(self.name(), "persist"))
    }

    /// Get total number of records stored
    async fn count(&self) -> Result<usize>;

    /// Collection name
    fn collection(&self) -> &str;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_ragged_batch() {
        let batch = UpsertBatch {
            ids: vec!["a".to_string(), "b".to_string()],
            documents: vec!["x".to_string()],
            metadatas: vec![Metadata::new(), Metadata::new()],
        };
        assert!(batch.validate().is_err());
        assert!(UpsertBatch::default().validate().is_ok());
    }
}
