//! Keyword-overlap context selection

mod ranker;

pub use ranker::{RelevanceRanker, ScoredChunk, CONTEXT_SEPARATOR, NO_RELEVANT_CONTEXT};
