//! Configuration for the RAG sandbox
//!
//! Every section has a `Default` matching the container deployment. Values are
//! overridden from environment variables by [`RagConfig::from_env`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Main sandbox configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Folder ingest configuration
    pub ingest: IngestConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Ollama chat configuration
    pub llm: LlmConfig,
    /// Vector store configuration
    pub vector_db: VectorDbConfig,
}

impl RagConfig {
    /// Build configuration from process environment (after loading `.env` if present)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, starting from defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }
        if let Some(port) = parse_var(&lookup, "PORT")? {
            config.server.port = port;
        }

        if let Some(dir) = lookup("DATA_DIR") {
            config.ingest.data_dir = PathBuf::from(dir);
        }
        if let Some(batch_size) = parse_var(&lookup, "BATCH_SIZE")? {
            config.ingest.batch_size = batch_size;
        }
        if let Some(policy) = parse_var(&lookup, "DECODE_POLICY")? {
            config.ingest.decode_policy = policy;
        }

        if let Some(backend) = parse_var(&lookup, "EMBED_BACKEND")? {
            config.embeddings.backend = backend;
        }
        if let Some(model) = lookup("EMBED_MODEL") {
            config.embeddings.model = model;
        }
        if let Some(dimensions) = parse_var(&lookup, "EMBED_DIMENSIONS")? {
            config.embeddings.dimensions = dimensions;
        }

        if let Some(size) = parse_var(&lookup, "CHUNK_SIZE")? {
            config.chunking.chunk_size = size;
        }
        if let Some(overlap) = parse_var(&lookup, "CHUNK_OVERLAP")? {
            config.chunking.chunk_overlap = overlap;
        }

        if let Some(url) = lookup("OLLAMA_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("CHAT_MODEL") {
            config.llm.chat_model = model;
        }

        if let Some(dir) = lookup("PERSIST_DIR") {
            config.vector_db.persist_dir = PathBuf::from(dir);
        }
        if let Some(collection) = lookup("COLLECTION") {
            config.vector_db.collection = collection;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;

        if self.ingest.batch_size == 0 {
            return Err(Error::config("BATCH_SIZE must be at least 1"));
        }
        if self.vector_db.collection.trim().is_empty() {
            return Err(Error::config("COLLECTION must not be empty"));
        }
        if self.embeddings.backend != EmbeddingBackend::FastEmbed
            && self.embeddings.dimensions == 0
        {
            return Err(Error::config("EMBED_DIMENSIONS must be at least 1"));
        }

        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::config(format!("Invalid value for {}: '{}' ({})", key, raw, e))),
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
        }
    }
}

/// What to do with bytes that are not valid UTF-8 when reading a source file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Drop undecodable bytes without notice
    #[default]
    Silent,
    /// Drop undecodable bytes and log a warning naming the file
    Warn,
}

impl FromStr for DecodePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silent" | "ignore" => Ok(Self::Silent),
            "warn" => Ok(Self::Warn),
            other => Err(format!(
                "unknown decode policy '{other}', expected 'silent' or 'warn'"
            )),
        }
    }
}

/// Folder ingest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Folder walked by `POST /ingest`
    pub data_dir: PathBuf,
    /// Chunk records per upsert call
    pub batch_size: usize,
    /// Handling of undecodable bytes
    pub decode_policy: DecodePolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/data/knowledge"),
            batch_size: 64,
            decode_policy: DecodePolicy::Silent,
        }
    }
}

/// Embedding runtime selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Local ONNX model through fastembed
    #[default]
    FastEmbed,
    /// Ollama `/api/embeddings`
    Ollama,
    /// Deterministic token hashing, no model download
    Hashed,
}

impl FromStr for EmbeddingBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fastembed" | "fast-embed" | "fast" => Ok(Self::FastEmbed),
            "ollama" => Ok(Self::Ollama),
            "hashed" => Ok(Self::Hashed),
            other => Err(format!(
                "unknown embedding backend '{other}', expected 'fastembed', 'ollama' or 'hashed'"
            )),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Backend used to turn text into vectors
    pub backend: EmbeddingBackend,
    /// Model identifier (fastembed model code or Ollama model name)
    pub model: String,
    /// Vector dimensions for backends that cannot report their own (ollama, hashed)
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::FastEmbed,
            model: "BAAI/bge-small-en-v1.5".to_string(),
            dimensions: 384,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Characters per chunk
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    /// The window must advance by at least one character per step
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("CHUNK_SIZE must be at least 1"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1200,
            chunk_overlap: 200,
        }
    }
}

/// Ollama chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Chat model name
    pub chat_model: String,
    /// Upper bound on a single chat request in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://ollama:11434".to_string(),
            chat_model: "llama3.2:3b-instruct".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDbConfig {
    /// Directory holding collection snapshots
    pub persist_dir: PathBuf,
    /// Collection name
    pub collection: String,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            persist_dir: PathBuf::from("/data/vectors"),
            collection: "local_knowledge".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = RagConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.ingest.data_dir, PathBuf::from("/data/knowledge"));
        assert_eq!(config.chunking.chunk_size, 1200);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.ingest.batch_size, 64);
        assert_eq!(config.vector_db.collection, "local_knowledge");
        assert_eq!(config.embeddings.model, "BAAI/bge-small-en-v1.5");
        assert_eq!(config.llm.chat_model, "llama3.2:3b-instruct");
    }

    #[test]
    fn test_environment_overrides() {
        let config = RagConfig::from_lookup(lookup_from(&[
            ("DATA_DIR", "/tmp/docs"),
            ("CHUNK_SIZE", "500"),
            ("CHUNK_OVERLAP", "50"),
            ("EMBED_BACKEND", "hashed"),
            ("DECODE_POLICY", "WARN"),
            ("OLLAMA_URL", "http://localhost:11434/"),
            ("COLLECTION", "notes"),
        ]))
        .unwrap();

        assert_eq!(config.ingest.data_dir, PathBuf::from("/tmp/docs"));
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 50);
        assert_eq!(config.embeddings.backend, EmbeddingBackend::Hashed);
        assert_eq!(config.ingest.decode_policy, DecodePolicy::Warn);
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.vector_db.collection, "notes");
    }

    #[test]
    fn test_overlap_not_smaller_than_size_is_rejected() {
        let err = RagConfig::from_lookup(lookup_from(&[
            ("CHUNK_SIZE", "200"),
            ("CHUNK_OVERLAP", "200"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unparseable_number_is_rejected() {
        let err = RagConfig::from_lookup(lookup_from(&[("CHUNK_SIZE", "big")])).unwrap_err();
        assert!(err.to_string().contains("CHUNK_SIZE"));
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        assert!(RagConfig::from_lookup(lookup_from(&[("BATCH_SIZE", "0")])).is_err());
    }
}
