//! Folder discovery and best-effort text decoding

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::DecodePolicy;
use crate::error::{Error, Result};
use crate::types::FileType;

/// Expand `~`, make absolute and canonicalize the ingest root
pub fn resolve_root(folder: &Path) -> Result<PathBuf> {
    let expanded = expand_home(folder);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };

    match std::fs::canonicalize(&absolute) {
        Ok(root) if root.is_dir() => Ok(root),
        _ => Err(Error::IngestRoot { path: absolute }),
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Recursively list files with an ingestible extension, in a stable order
pub fn discover_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && FileType::from_path(path).is_some())
        .collect()
}

/// Decoded file contents plus the number of bytes that had to be dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub dropped_bytes: usize,
}

/// Decode UTF-8, dropping invalid sequences instead of replacing them
pub fn decode_lossy(bytes: &[u8]) -> DecodedText {
    let mut text = String::with_capacity(bytes.len());
    let mut dropped_bytes = 0usize;
    let mut rest = bytes;

    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                text.push_str(valid);
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(len) => {
                        dropped_bytes += len;
                        rest = &after[len..];
                    }
                    None => {
                        // Truncated sequence at end of input
                        dropped_bytes += after.len();
                        break;
                    }
                }
            }
        }
    }

    DecodedText {
        text,
        dropped_bytes,
    }
}

/// Read a file as text; unreadable files yield an empty string
pub async fn read_text_file(path: &Path, policy: DecodePolicy) -> String {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            if policy == DecodePolicy::Warn {
                tracing::warn!("Could not read {}: {}", path.display(), e);
            } else {
                tracing::debug!("Could not read {}: {}", path.display(), e);
            }
            return String::new();
        }
    };

    let decoded = decode_lossy(&bytes);
    if decoded.dropped_bytes > 0 && policy == DecodePolicy::Warn {
        tracing::warn!(
            "Dropped {} undecodable bytes from {}",
            decoded.dropped_bytes,
            path.display()
        );
    }

    decoded.text
}
