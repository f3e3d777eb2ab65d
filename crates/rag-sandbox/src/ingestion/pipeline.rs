//! Folder ingest: walk, read, chunk, batch, upsert, persist

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::config::{DecodePolicy, RagConfig};
use crate::error::Result;
use crate::providers::VectorStoreProvider;
use crate::types::IngestSummary;

use super::batch::BatchBuffer;
use super::chunker::TextChunker;
use super::reader::{discover_files, read_text_file, resolve_root};

/// Batched folder ingest into a vector store
///
/// Each run is independent: no state survives between calls other than what
/// the store keeps. A failed upsert aborts the run; batches flushed before it
/// stay in the store.
pub struct IngestPipeline {
    store: Arc<dyn VectorStoreProvider>,
    chunker: TextChunker,
    batch_size: usize,
    decode_policy: DecodePolicy,
    persist_dir: PathBuf,
    embed_model: String,
}

impl IngestPipeline {
    /// Create a new ingest pipeline
    pub fn new(
        store: Arc<dyn VectorStoreProvider>,
        chunker: TextChunker,
        batch_size: usize,
        decode_policy: DecodePolicy,
        persist_dir: PathBuf,
        embed_model: String,
    ) -> Self {
        Self {
            store,
            chunker,
            batch_size: batch_size.max(1),
            decode_policy,
            persist_dir,
            embed_model,
        }
    }

    /// Create from configuration
    pub fn from_config(
        config: &RagConfig,
        store: Arc<dyn VectorStoreProvider>,
        embed_model: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::new(
            store,
            TextChunker::from_config(&config.chunking)?,
            config.ingest.batch_size,
            config.ingest.decode_policy,
            config.vector_db.persist_dir.clone(),
            embed_model.into(),
        ))
    }

    /// Ingest every recognized file under `folder`
    pub async fn ingest_folder(&self, folder: &Path) -> Result<IngestSummary> {
        let start = Instant::now();

        let folder = folder.to_path_buf();
        let (root, files) = tokio::task::spawn_blocking(move || -> Result<_> {
            let root = resolve_root(&folder)?;
            let files = discover_files(&root);
            Ok((root, files))
        })
        .await??;

        tracing::info!(
            "Ingesting {} files from {} ({} char chunks, {} overlap, batches of {})",
            files.len(),
            root.display(),
            self.chunker.chunk_size(),
            self.chunker.overlap(),
            self.batch_size
        );

        let mut buffer = BatchBuffer::new(self.batch_size);
        let mut files_ingested = 0usize;
        let mut chunks_ingested = 0usize;
        let mut batches = 0usize;

        for file in &files {
            files_ingested += 1;

            let text = read_text_file(file, self.decode_policy).await;
            let path = file.to_string_lossy();
            let chunks = self.chunker.chunk_file(&path, &text);
            tracing::debug!("{}: {} chunks", path, chunks.len());

            for chunk in chunks {
                chunks_ingested += 1;
                if buffer.push(chunk) {
                    self.store.upsert(buffer.take()).await?;
                    batches += 1;
                }
            }
        }

        if !buffer.is_empty() {
            self.store.upsert(buffer.take()).await?;
            batches += 1;
        }

        if let Err(e) = self.store.persist().await {
            tracing::debug!("Persist after ingest skipped: {}", e);
        }

        tracing::info!(
            "Ingest finished in {}ms: {} files, {} chunks, {} upsert batches",
            start.elapsed().as_millis(),
            files_ingested,
            chunks_ingested,
            batches
        );

        Ok(IngestSummary {
            status: "ok".to_string(),
            files_ingested,
            chunks_ingested,
            collection: self.store.collection().to_string(),
            persist_dir: self.persist_dir.to_string_lossy().to_string(),
            embed_model: self.embed_model.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::{RawQueryResult, UpsertBatch};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::fs;

    /// Store double that records every upsert call
    #[derive(Default)]
    struct RecordingStore {
        batches: Mutex<Vec<UpsertBatch>>,
        fail_on_call: Option<usize>,
        persist_calls: Mutex<usize>,
        persist_fails: bool,
        calls: Mutex<usize>,
    }

    impl RecordingStore {
        fn batch_sizes(&self) -> Vec<usize> {
            self.batches.lock().iter().map(|b| b.len()).collect()
        }

        fn all_ids(&self) -> Vec<String> {
            self.batches
                .lock()
                .iter()
                .flat_map(|b| b.ids.clone())
                .collect()
        }
    }

    #[async_trait]
    impl VectorStoreProvider for RecordingStore {
        async fn upsert(&self, batch: UpsertBatch) -> Result<()> {
            let call = {
                let mut calls = self.calls.lock();
                *calls += 1;
                *calls
            };
            if self.fail_on_call == Some(call) {
                return Err(Error::vector_db("disk full"));
            }
            batch.validate()?;
            self.batches.lock().push(batch);
            Ok(())
        }

        async fn query(&self, _query_text: &str, _n_results: usize) -> Result<RawQueryResult> {
            Ok(RawQueryResult::default())
        }

        async fn persist(&self) -> Result<()> {
            *self.persist_calls.lock() += 1;
            if self.persist_fails {
                return Err(Error::vector_db("read-only filesystem"));
            }
            Ok(())
        }

        async fn count(&self) -> Result<usize> {
            Ok(self.batches.lock().iter().map(|b| b.len()).sum())
        }

        fn collection(&self) -> &str {
            "local_knowledge"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn pipeline(store: Arc<RecordingStore>, chunk_size: usize, overlap: usize) -> IngestPipeline {
        IngestPipeline::new(
            store,
            TextChunker::new(chunk_size, overlap).unwrap(),
            64,
            DecodePolicy::Silent,
            PathBuf::from("/data/vectors"),
            "BAAI/bge-small-en-v1.5".to_string(),
        )
    }

    fn letters(n: usize) -> String {
        (0..n).map(|i| char::from(b'a' + (i % 26) as u8)).collect()
    }

    #[tokio::test]
    async fn test_single_file_three_chunks() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("doc.md"), letters(3000)).unwrap();

        let store = Arc::new(RecordingStore::default());
        let summary = pipeline(store.clone(), 1200, 200)
            .ingest_folder(dir.path())
            .await
            .unwrap();

        assert_eq!(summary.status, "ok");
        assert_eq!(summary.files_ingested, 1);
        assert_eq!(summary.chunks_ingested, 3);
        assert_eq!(summary.collection, "local_knowledge");
        assert_eq!(summary.persist_dir, "/data/vectors");
        assert_eq!(summary.embed_model, "BAAI/bge-small-en-v1.5");

        let batches = store.batches.lock();
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert!(batch.ids[2].ends_with("doc.md::000002"));
        assert_eq!(batch.documents[2].len(), 1000);
        assert_eq!(batch.metadatas[1]["chunk"], 1);
        assert!(batch.metadatas[1]["source"]
            .as_str()
            .unwrap()
            .ends_with("doc.md"));
    }

    #[tokio::test]
    async fn test_flushes_every_full_batch_plus_remainder() {
        let dir = tempfile::tempdir().unwrap();
        // 150 non-overlapping 10-char chunks
        fs::write(dir.path().join("big.txt"), letters(1500)).unwrap();

        let store = Arc::new(RecordingStore::default());
        let summary = pipeline(store.clone(), 10, 0)
            .ingest_folder(dir.path())
            .await
            .unwrap();

        assert_eq!(summary.chunks_ingested, 150);
        assert_eq!(store.batch_sizes(), vec![64, 64, 22]);
        assert_eq!(*store.persist_calls.lock(), 1);
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_trailing_flush() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), letters(640)).unwrap();
        fs::write(dir.path().join("b.txt"), letters(640)).unwrap();

        let store = Arc::new(RecordingStore::default());
        let summary = pipeline(store.clone(), 10, 0)
            .ingest_folder(dir.path())
            .await
            .unwrap();

        assert_eq!(summary.files_ingested, 2);
        assert_eq!(summary.chunks_ingested, 128);
        assert_eq!(store.batch_sizes(), vec![64, 64]);
    }

    #[tokio::test]
    async fn test_batches_span_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.md", "b.md", "c.md"] {
            fs::write(dir.path().join(name), letters(300)).unwrap();
        }

        let store = Arc::new(RecordingStore::default());
        pipeline(store.clone(), 10, 0)
            .ingest_folder(dir.path())
            .await
            .unwrap();

        // 3 files x 30 chunks
        assert_eq!(store.batch_sizes(), vec![64, 26]);
    }

    #[tokio::test]
    async fn test_counts_exclude_unrecognized_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.md"), letters(25)).unwrap();
        fs::write(dir.path().join("sub/b.TXT"), letters(12)).unwrap();
        fs::write(dir.path().join("c.pdf"), letters(500)).unwrap();
        fs::write(dir.path().join("d.rs"), letters(500)).unwrap();
        fs::write(dir.path().join("empty.markdown"), "   \n").unwrap();

        let store = Arc::new(RecordingStore::default());
        let summary = pipeline(store.clone(), 10, 0)
            .ingest_folder(dir.path())
            .await
            .unwrap();

        // a.md: 3 chunks, b.TXT: 2 chunks, empty.markdown: 0 chunks
        assert_eq!(summary.files_ingested, 3);
        assert_eq!(summary.chunks_ingested, 5);
        assert_eq!(store.count().await.unwrap(), 5);
        assert!(store.all_ids().iter().all(|id| !id.contains(".pdf") && !id.contains(".rs")));
    }

    #[tokio::test]
    async fn test_reingest_produces_identical_ids() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), letters(2500)).unwrap();
        fs::write(dir.path().join("b.txt"), letters(700)).unwrap();

        let first = Arc::new(RecordingStore::default());
        pipeline(first.clone(), 1200, 200)
            .ingest_folder(dir.path())
            .await
            .unwrap();

        let second = Arc::new(RecordingStore::default());
        pipeline(second.clone(), 1200, 200)
            .ingest_folder(dir.path())
            .await
            .unwrap();

        assert!(!first.all_ids().is_empty());
        assert_eq!(first.all_ids(), second.all_ids());
    }

    #[tokio::test]
    async fn test_missing_root_fails_before_any_upsert() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(RecordingStore::default());

        let err = pipeline(store.clone(), 1200, 200)
            .ingest_folder(&dir.path().join("missing"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::IngestRoot { .. }));
        assert_eq!(*store.calls.lock(), 0);
        assert_eq!(*store.persist_calls.lock(), 0);
    }

    #[tokio::test]
    async fn test_file_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.md");
        fs::write(&file, "text").unwrap();

        let store = Arc::new(RecordingStore::default());
        let err = pipeline(store, 1200, 200)
            .ingest_folder(&file)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::IngestRoot { .. }));
    }

    #[tokio::test]
    async fn test_upsert_failure_propagates_and_keeps_earlier_batches() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("big.txt"), letters(1500)).unwrap();

        let store = Arc::new(RecordingStore {
            fail_on_call: Some(2),
            ..Default::default()
        });
        let err = pipeline(store.clone(), 10, 0)
            .ingest_folder(dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::VectorDb(_)));
        assert_eq!(*store.calls.lock(), 2);
        assert_eq!(store.batch_sizes(), vec![64]);
        assert_eq!(*store.persist_calls.lock(), 0);
    }

    #[tokio::test]
    async fn test_persist_failure_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "some notes").unwrap();

        let store = Arc::new(RecordingStore {
            persist_fails: true,
            ..Default::default()
        });
        let summary = pipeline(store.clone(), 1200, 200)
            .ingest_folder(dir.path())
            .await
            .unwrap();

        assert_eq!(summary.chunks_ingested, 1);
        assert_eq!(*store.persist_calls.lock(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_bytes_do_not_fail_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("latin1.txt"), b"caf\xe9 cr\xe8me").unwrap();
        fs::write(dir.path().join("garbage.md"), [0xffu8, 0xfe, 0xfd]).unwrap();

        let store = Arc::new(RecordingStore::default());
        let summary = IngestPipeline::new(
            store.clone(),
            TextChunker::new(1200, 200).unwrap(),
            64,
            DecodePolicy::Warn,
            PathBuf::from("/data/vectors"),
            "hashed-384".to_string(),
        )
        .ingest_folder(dir.path())
        .await
        .unwrap();

        assert_eq!(summary.files_ingested, 2);
        assert_eq!(summary.chunks_ingested, 1);
        assert_eq!(store.batches.lock()[0].documents, vec!["caf crme"]);
    }
}
