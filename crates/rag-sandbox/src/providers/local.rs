//! Local vector collection with an on-disk JSON snapshot
//!
//! Records live in memory behind a read-write lock and search is an exact
//! cosine scan. `persist` writes `<persist_dir>/<collection>.json` through a
//! temp file in the same directory followed by a rename.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::VectorDbConfig;
use crate::error::{Error, Result};
use crate::types::Metadata;

use super::embedding::EmbeddingProvider;
use super::vector_store::{RawQueryResult, UpsertBatch, VectorStoreProvider};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    document: String,
    metadata: Metadata,
    embedding: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct CollectionSnapshot {
    name: String,
    embed_model: String,
    distance: String,
    records: BTreeMap<String, StoredRecord>,
}

/// Named in-process collection using cosine distance
pub struct LocalCollection {
    name: String,
    snapshot_path: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    records: RwLock<BTreeMap<String, StoredRecord>>,
}

impl LocalCollection {
    /// Open the collection, loading an existing snapshot if one is present
    pub fn open(config: &VectorDbConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        std::fs::create_dir_all(&config.persist_dir)?;
        let snapshot_path = config
            .persist_dir
            .join(format!("{}.json", config.collection));

        let records = if snapshot_path.exists() {
            let snapshot = load_snapshot(&snapshot_path)?;
            if snapshot.embed_model != embedder.model_name() {
                return Err(Error::vector_db(format!(
                    "Collection '{}' was built with embedding model '{}' but '{}' is configured; \
                     remove {} or switch EMBED_MODEL back",
                    config.collection,
                    snapshot.embed_model,
                    embedder.model_name(),
                    snapshot_path.display()
                )));
            }
            tracing::info!(
                "Loaded collection '{}' with {} records from {}",
                config.collection,
                snapshot.records.len(),
                snapshot_path.display()
            );
            snapshot.records
        } else {
            tracing::info!("Creating new collection '{}'", config.collection);
            BTreeMap::new()
        };

        Ok(Self {
            name: config.collection.clone(),
            snapshot_path,
            embedder,
            records: RwLock::new(records),
        })
    }

    /// Where `persist` writes the snapshot
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }
}

fn load_snapshot(path: &Path) -> Result<CollectionSnapshot> {
    let raw = std::fs::read(path)?;
    serde_json::from_slice(&raw).map_err(|e| {
        Error::vector_db(format!("Corrupt collection snapshot {}: {}", path.display(), e))
    })
}

/// `1 - cosine similarity`; zero vectors are treated as orthogonal
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl VectorStoreProvider for LocalCollection {
    async fn upsert(&self, batch: UpsertBatch) -> Result<()> {
        batch.validate()?;
        if batch.is_empty() {
            return Ok(());
        }

        let embeddings = self.embedder.embed_batch(&batch.documents).await?;
        if embeddings.len() != batch.len() {
            return Err(Error::vector_db(format!(
                "Embedder returned {} vectors for {} documents",
                embeddings.len(),
                batch.len()
            )));
        }

        let UpsertBatch {
            ids,
            documents,
            metadatas,
        } = batch;

        let mut records = self.records.write();
        for (((id, document), metadata), embedding) in
            ids.into_iter().zip(documents).zip(metadatas).zip(embeddings)
        {
            records.insert(
                id,
                StoredRecord {
                    document,
                    metadata,
                    embedding,
                },
            );
        }

        Ok(())
    }

    async fn query(&self, query_text: &str, n_results: usize) -> Result<RawQueryResult> {
        let query_embedding = self.embedder.embed(query_text).await?;

        let records = self.records.read();
        let mut scored: Vec<(f32, &String, &StoredRecord)> = records
            .iter()
            .map(|(id, record)| (cosine_distance(&query_embedding, &record.embedding), id, record))
            .collect();

        scored.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(b.1))
        });
        scored.truncate(n_results);

        let mut result = RawQueryResult::default();
        for (distance, id, record) in scored {
            result.ids.push(id.clone());
            result.documents.push(record.document.clone());
            result.metadatas.push(record.metadata.clone());
            result.distances.push(distance);
        }

        Ok(result)
    }

    async fn persist(&self) -> Result<()> {
        let payload = {
            let records = self.records.read();
            let snapshot = CollectionSnapshot {
                name: self.name.clone(),
                embed_model: self.embedder.model_name().to_string(),
                distance: "cosine".to_string(),
                records: records.clone(),
            };
            serde_json::to_vec(&snapshot)?
        };

        let path = self.snapshot_path.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
            tmp.write_all(&payload)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
            Ok(())
        })
        .await??;

        tracing::debug!("Persisted collection '{}' to {}", self.name, self.snapshot_path.display());
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().len())
    }

    fn collection(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.snapshot_path.parent().map_or(true, |dir| dir.exists()))
    }

    fn name(&self) -> &str {
        "local"
    }
}
