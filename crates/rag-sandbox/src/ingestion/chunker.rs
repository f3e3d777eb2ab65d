//! Fixed-size character windows with overlap
//!
//! Offsets count Unicode scalar values, so a window never splits a code point,
//! but it may split a word. No sentence or word boundaries are consulted.

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::DocumentChunk;

/// Sliding-window chunker with configurable size and overlap
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    /// Characters per chunk
    chunk_size: usize,
    /// Characters shared by consecutive chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker; `overlap` must be smaller than `chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        ChunkingConfig {
            chunk_size,
            chunk_overlap: overlap,
        }
        .validate()?;

        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Create from chunking configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into overlapping windows after trimming surrounding whitespace
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, including the end of the text
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;

        let mut chunks = Vec::with_capacity(char_count / (self.chunk_size - self.overlap) + 1);
        let mut start = 0usize;

        loop {
            let end = (start + self.chunk_size).min(char_count);
            chunks.push(&text[boundaries[start]..boundaries[end]]);

            if end == char_count {
                break;
            }
            start = end.saturating_sub(self.overlap);
        }

        chunks
    }

    /// Chunk the contents of one file into id-bearing records
    pub fn chunk_file(&self, path: &str, text: &str) -> Vec<DocumentChunk> {
        self.split(text)
            .into_iter()
            .enumerate()
            .map(|(index, window)| DocumentChunk::new(path, index, window.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(chunks: &[&str], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(chunk);
            } else {
                out.extend(chunk.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn test_empty_and_blank_input() {
        let chunker = TextChunker::new(10, 2).unwrap();
        assert!(chunker.split("").is_empty());
        assert!(chunker.split("  \n\t  ").is_empty());
    }

    #[test]
    fn test_short_text_is_single_trimmed_chunk() {
        let chunker = TextChunker::new(1200, 200).unwrap();
        let chunks = chunker.split("  hello world \n");
        assert_eq!(chunks, vec!["hello world"]);
    }

    #[test]
    fn test_text_exactly_chunk_size() {
        let chunker = TextChunker::new(5, 2).unwrap();
        assert_eq!(chunker.split("abcde"), vec!["abcde"]);
    }

    #[test]
    fn test_three_thousand_chars() {
        let text: String = (0..3000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunker = TextChunker::new(1200, 200).unwrap();
        let chunks = chunker.split(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], &text[0..1200]);
        assert_eq!(chunks[1], &text[1000..2200]);
        assert_eq!(chunks[2], &text[2000..3000]);
    }

    #[test]
    fn test_full_chunks_have_exact_size() {
        let text = "x".repeat(1234);
        let chunker = TextChunker::new(100, 30).unwrap();
        let chunks = chunker.split(&text);

        let (last, full) = chunks.split_last().unwrap();
        assert!(full.iter().all(|c| c.len() == 100));
        assert!(last.len() <= 100);
        assert!(text.ends_with(last));
    }

    #[test]
    fn test_overlap_removed_reconstructs_text() {
        let samples = [
            "The quick brown fox jumps over the lazy dog. ".repeat(37),
            "line one\nline two\n\nline three with more words".repeat(11),
            "ünïcödé — 日本語のテキスト 🚀 ".repeat(23),
        ];

        for (size, overlap) in [(7, 0), (16, 5), (50, 49), (120, 20), (1200, 200)] {
            let chunker = TextChunker::new(size, overlap).unwrap();
            for sample in &samples {
                let chunks = chunker.split(sample);
                assert_eq!(reconstruct(&chunks, overlap), sample.trim());
            }
        }
    }

    #[test]
    fn test_windows_count_chars_not_bytes() {
        let chunker = TextChunker::new(3, 1).unwrap();
        let chunks = chunker.split("äöüßé");
        assert_eq!(chunks, vec!["äöü", "üßé"]);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        assert!(TextChunker::new(100, 100).is_err());
        assert!(TextChunker::new(100, 150).is_err());
        assert!(TextChunker::new(0, 0).is_err());
        assert!(TextChunker::new(1, 0).is_ok());
    }

    #[test]
    fn test_chunk_file_assigns_sequential_ids() {
        let chunker = TextChunker::new(4, 1).unwrap();
        let chunks = chunker.chunk_file("/k/a.txt", "abcdefghij");

        let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["/k/a.txt::000000", "/k/a.txt::000001", "/k/a.txt::000002"]);
        assert_eq!(chunks[1].content, "defg");
        assert_eq!(chunks[2].source.chunk, 2);
    }

    #[test]
    fn test_from_config_uses_configured_window() {
        let chunker = TextChunker::from_config(&ChunkingConfig::default()).unwrap();
        assert_eq!(chunker.chunk_size(), 1200);
        assert_eq!(chunker.overlap(), 200);
    }
}
