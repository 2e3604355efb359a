//! Prompt assembly and streamed reply decoding

pub mod prompt;
pub mod stream;

pub use prompt::{PromptTemplate, DEFAULT_TEMPLATE};
pub use stream::SseDecoder;
