//! Bounded accumulator of chunk records between upsert calls

use crate::providers::UpsertBatch;
use crate::types::DocumentChunk;

/// Parallel id/document/metadata buffer flushed every `capacity` records
#[derive(Debug)]
pub struct BatchBuffer {
    pending: UpsertBatch,
    capacity: usize,
}

impl BatchBuffer {
    /// `capacity` is clamped to at least one record
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            pending: UpsertBatch {
                ids: Vec::with_capacity(capacity),
                documents: Vec::with_capacity(capacity),
                metadatas: Vec::with_capacity(capacity),
            },
            capacity,
        }
    }

    /// Add a chunk; returns true once the buffer is full and must be flushed
    pub fn push(&mut self, chunk: DocumentChunk) -> bool {
        let metadata = chunk.source.to_metadata();
        self.pending.ids.push(chunk.id);
        self.pending.documents.push(chunk.content);
        self.pending.metadatas.push(metadata);
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.pending.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Move the pending records out, leaving the buffer empty
    pub fn take(&mut self) -> UpsertBatch {
        std::mem::replace(
            &mut self.pending,
            UpsertBatch {
                ids: Vec::with_capacity(self.capacity),
                documents: Vec::with_capacity(self.capacity),
                metadatas: Vec::with_capacity(self.capacity),
            },
        )
    }
}
