//! Core types for documents, chunks and conversation messages

pub mod document;
pub mod message;

pub use document::{Corpus, DocumentChunk, FileType};
pub use message::{ChatMessage, Role};
