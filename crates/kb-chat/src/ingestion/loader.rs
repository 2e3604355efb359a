//! Corpus loading: walk the knowledge folder, extract, chunk

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::types::{Corpus, FileType};

use super::chunker::TextChunker;
use super::parser::{FileParser, TextExtractor};

/// Outcome of one pass over the knowledge folder
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Chunks in discovery order
    pub corpus: Corpus,
    /// Supported files that yielded text
    pub files_processed: usize,
    /// Supported files whose extraction failed
    pub files_failed: usize,
    /// The knowledge folder did not exist
    pub root_missing: bool,
}

/// Walks a document root and builds the corpus
pub struct CorpusLoader {
    root: PathBuf,
    chunker: TextChunker,
    extractor: Box<dyn TextExtractor>,
}

impl CorpusLoader {
    /// Create a loader using the built-in [`FileParser`]
    pub fn new(root: impl Into<PathBuf>, chunker: TextChunker) -> Self {
        Self::with_extractor(root, chunker, Box::new(FileParser))
    }

    /// Create a loader with a custom extractor
    pub fn with_extractor(
        root: impl Into<PathBuf>,
        chunker: TextChunker,
        extractor: Box<dyn TextExtractor>,
    ) -> Self {
        Self {
            root: root.into(),
            chunker,
            extractor,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every supported file under the root.
    ///
    /// Never fails: a missing root gives an empty report and per-file
    /// extraction errors are logged and skipped.
    pub fn load(&self) -> LoadReport {
        let mut report = LoadReport::default();

        if !self.root.exists() {
            tracing::warn!("Knowledge folder not found: {}", self.root.display());
            report.root_missing = true;
            return report;
        }

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let file_type = FileType::from_path(path);
            if !file_type.is_supported() {
                continue;
            }

            tracing::info!("Processing {} ({})...", path.display(), file_type.display_name());

            let text = match self.extractor.extract(path, file_type) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("{}", e);
                    report.files_failed += 1;
                    continue;
                }
            };

            if text.is_empty() {
                continue;
            }

            let chunks = self.chunker.chunk(&text, path);
            tracing::debug!("{}: {} chunks", path.display(), chunks.len());
            report.corpus.extend(chunks);
            report.files_processed += 1;
        }

        tracing::info!(
            "Successfully processed {} files ({} chunks)",
            report.files_processed,
            report.corpus.len()
        );

        report
    }
}
