//! Document ingestion pipeline with multi-format parsing

mod chunker;
mod loader;
mod parser;

pub use chunker::{TextChunker, MIN_CHUNK_CHARS};
pub use loader::{CorpusLoader, LoadReport};
pub use parser::{render_table, FileParser, TextExtractor};
