//! kb-chat: terminal chat client grounded in a local folder of documents
//!
//! Documents under `knowledge/` (PDF, Word, Excel, text and Markdown) are
//! split into overlapping word windows. For every question the chunks that
//! share the most words with it are placed into the prompt sent to the model,
//! together with the conversation so far.

pub mod app;
pub mod config;
pub mod credentials;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod session;
pub mod types;
pub mod ui;

pub use config::ChatConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Corpus, DocumentChunk, FileType},
    message::{ChatMessage, Role},
};
