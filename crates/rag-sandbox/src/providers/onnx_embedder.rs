//! Local ONNX embeddings through fastembed

use async_trait::async_trait;
use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

/// fastembed-backed embedder; inference runs on the blocking pool
pub struct FastEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    model_code: String,
    dimensions: usize,
}

impl FastEmbedder {
    /// Load (downloading on first use) the model identified by `model_code`
    ///
    /// Fails with a diagnostic when the model code is unknown or the ONNX
    /// Runtime library cannot be loaded.
    pub async fn new(model_code: &str) -> Result<Self> {
        tracing::info!("Initializing fastembed model: {}", model_code);

        let (model_name, dimensions) = resolve_model(model_code)?;
        let code = model_code.to_string();

        let model = tokio::task::spawn_blocking(move || -> Result<_> {
            let options = TextInitOptions::new(model_name).with_show_download_progress(false);
            TextEmbedding::try_new(options).map_err(|e| {
                Error::embedding(format!(
                    "Failed to initialize fastembed model '{}'. Make sure the ONNX Runtime \
                     shared library is installed (point ORT_DYLIB_PATH at libonnxruntime) and \
                     the model can be downloaded from the Hugging Face hub. Original error: {}",
                    code, e
                ))
            })
        })
        .await??;

        tracing::info!("fastembed model ready ({} dimensions)", dimensions);

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            model_code: model_code.to_string(),
            dimensions,
        })
    }
}

/// Map a configured model code onto a fastembed model and its dimensions
///
/// Accepts fastembed's own model code (`Xenova/bge-small-en-v1.5`), any repo id
/// with the same model basename (`BAAI/bge-small-en-v1.5`), or the enum
/// variant name (`BGESmallENV15`). Matching is case-insensitive.
pub fn resolve_model(model_code: &str) -> Result<(EmbeddingModel, usize)> {
    let wanted = model_code.trim().to_ascii_lowercase();
    let wanted_base = basename(&wanted);
    let supported = TextEmbedding::list_supported_models();

    let found = supported
        .iter()
        .find(|info| info.model_code.to_ascii_lowercase() == wanted)
        .or_else(|| {
            supported
                .iter()
                .find(|info| basename(&info.model_code.to_ascii_lowercase()) == wanted_base)
        })
        .or_else(|| {
            supported
                .iter()
                .find(|info| format!("{:?}", info.model).to_ascii_lowercase() == wanted)
        });

    match found {
        Some(info) => {
            tracing::debug!("EMBED_MODEL '{}' resolved to {}", model_code, info.model_code);
            Ok((info.model.clone(), info.dim))
        }
        None => Err(Error::config(format!(
            "EMBED_MODEL '{}' is not a fastembed text model; supported codes: {}",
            model_code,
            supported
                .iter()
                .map(|info| info.model_code.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

fn basename(code: &str) -> &str {
    code.rsplit('/').next().unwrap_or(code)
}

#[async_trait]
impl EmbeddingProvider for FastEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("fastembed returned no embedding for input"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || {
            model
                .lock()
                .embed(texts, None)
                .map_err(|e| Error::embedding(format!("fastembed inference failed: {}", e)))
        })
        .await?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model_code
    }

    async fn health_check(&self) -> Result<bool> {
        // Loaded at startup; a live handle is a usable one
        Ok(true)
    }

    fn name(&self) -> &str {
        "fastembed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingConfig;

    #[test]
    fn test_default_model_resolves() {
        let (model, dimensions) = resolve_model(&EmbeddingConfig::default().model).unwrap();
        assert_eq!(model, EmbeddingModel::BGESmallENV15);
        assert_eq!(dimensions, 384);
    }

    #[test]
    fn test_resolves_fastembed_code_and_variant_name() {
        let (by_code, _) = resolve_model("Xenova/bge-small-en-v1.5").unwrap();
        let (by_variant, _) = resolve_model("BGESmallENV15").unwrap();
        assert_eq!(by_code, EmbeddingModel::BGESmallENV15);
        assert_eq!(by_variant, EmbeddingModel::BGESmallENV15);
    }

    #[test]
    fn test_unknown_model_is_config_error() {
        let err = resolve_model("acme/not-a-model").unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("acme/not-a-model")));
    }
}
