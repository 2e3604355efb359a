//! Word-window chunking with overlap

use std::path::Path;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::DocumentChunk;

/// Chunks whose trimmed text is this many characters or fewer are dropped
pub const MIN_CHUNK_CHARS: usize = 50;

/// Splits text into overlapping windows of whitespace-delimited words
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Words per window
    chunk_size: usize,
    /// Words shared by consecutive windows
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. The window step `chunk_size - overlap` must be positive.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::configuration("chunk_size must be at least 1"));
        }
        if overlap >= chunk_size {
            return Err(Error::configuration(format!(
                "chunk overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }

        Ok(Self { chunk_size, overlap })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between window starts
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Chunk one document's text, tagging every chunk with `source`
    pub fn chunk(&self, text: &str, source: &Path) -> Vec<DocumentChunk> {
        let words: Vec<&str> = text.split_whitespace().collect();

        (0..words.len())
            .step_by(self.step())
            .filter_map(|start| {
                let end = (start + self.chunk_size).min(words.len());
                let content = words[start..end].join(" ");

                if content.trim().chars().count() > MIN_CHUNK_CHARS {
                    Some(DocumentChunk::new(content, source))
                } else {
                    None
                }
            })
            .collect()
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 100,
        }
    }
}
