//! Literal token-overlap ranking

use crate::config::RetrievalConfig;
use crate::types::DocumentChunk;

/// Returned by [`RelevanceRanker::rank`] when no chunk matches the question
pub const NO_RELEVANT_CONTEXT: &str = "No relevant context found.";

/// Placed between formatted chunks
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// A chunk with its relevance score, alive for one ranking call
#[derive(Debug, Clone, Copy)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a DocumentChunk,
    /// Question tokens found in the chunk, always >= 1
    pub score: usize,
}

/// Scores chunks by how many question tokens occur in their text
#[derive(Debug, Clone)]
pub struct RelevanceRanker {
    max_chunks: usize,
}

impl RelevanceRanker {
    pub fn new(max_chunks: usize) -> Self {
        Self { max_chunks }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(config.max_chunks)
    }

    pub fn max_chunks(&self) -> usize {
        self.max_chunks
    }

    /// Count question tokens (duplicates included) that appear as a
    /// substring of the lower-cased content
    pub fn score(content: &str, question: &str) -> usize {
        let content = content.to_lowercase();
        question
            .to_lowercase()
            .split_whitespace()
            .filter(|token| content.contains(token))
            .count()
    }

    /// Matching chunks, best first; equal scores keep corpus order
    pub fn top_chunks<'a>(&self, corpus: &'a [DocumentChunk], question: &str) -> Vec<ScoredChunk<'a>> {
        let mut scored: Vec<ScoredChunk<'a>> = corpus
            .iter()
            .filter_map(|chunk| {
                let score = Self::score(&chunk.content, question);
                (score > 0).then_some(ScoredChunk { chunk, score })
            })
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(self.max_chunks);
        scored
    }

    /// Formatted context for a question.
    ///
    /// Empty corpus gives an empty string; no match gives [`NO_RELEVANT_CONTEXT`].
    pub fn rank(&self, corpus: &[DocumentChunk], question: &str) -> String {
        if corpus.is_empty() {
            return String::new();
        }

        let top = self.top_chunks(corpus, question);
        if top.is_empty() {
            return NO_RELEVANT_CONTEXT.to_string();
        }

        tracing::debug!(
            "Selected {} chunks (best score {})",
            top.len(),
            top[0].score
        );

        top.iter()
            .map(|s| {
                format!(
                    "Source: {}\nContent: {}",
                    s.chunk.source.display(),
                    s.chunk.content
                )
            })
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }
}

impl Default for RelevanceRanker {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chunk(content: &str, source: &str) -> DocumentChunk {
        DocumentChunk::new(content, source)
    }

    #[test]
    fn test_invoice_example() {
        let corpus = vec![chunk("The invoice total is 500 dollars", "a.txt")];
        let ranker = RelevanceRanker::default();

        let top = ranker.top_chunks(&corpus, "what is the invoice total");
        // "is" also occurs inside the chunk
        assert_eq!(top[0].score, 4);
        assert_eq!(
            ranker.rank(&corpus, "what is the invoice total"),
            "Source: a.txt\nContent: The invoice total is 500 dollars"
        );
    }

    #[test]
    fn test_substring_semantics() {
        assert_eq!(RelevanceRanker::score("Categorical data", "cat"), 1);
        assert_eq!(RelevanceRanker::score("The invoice total", "THE the"), 2);
        assert_eq!(RelevanceRanker::score("anything", ""), 0);
    }

    #[test]
    fn test_empty_corpus_is_empty_string() {
        let ranker = RelevanceRanker::default();
        assert_eq!(ranker.rank(&[], "what is the invoice total"), "");
    }

    #[test]
    fn test_no_match_is_sentinel() {
        let corpus = vec![chunk("Quarterly revenue grew", "r.md")];
        let ranker = RelevanceRanker::default();
        assert_eq!(ranker.rank(&corpus, "xyz"), NO_RELEVANT_CONTEXT);
    }

    #[test]
    fn test_limit_and_order() {
        let corpus = vec![
            chunk("alpha", "1.txt"),
            chunk("alpha beta gamma", "2.txt"),
            chunk("alpha beta", "3.txt"),
            chunk("beta", "4.txt"),
            chunk("gamma alpha", "5.txt"),
        ];
        let ranker = RelevanceRanker::new(3);
        let top = ranker.top_chunks(&corpus, "alpha beta gamma");

        let sources: Vec<String> = top
            .iter()
            .map(|s| s.chunk.source.display().to_string())
            .collect();
        // 3.txt and 5.txt tie at 2; corpus order decides
        assert_eq!(sources, vec!["2.txt", "3.txt", "5.txt"]);
        assert_eq!(top.iter().map(|s| s.score).collect::<Vec<_>>(), vec![3, 2, 2]);
    }

    #[test]
    fn test_multiple_chunks_are_separated() {
        let corpus = vec![chunk("red apple", "a.txt"), chunk("green apple", "b.txt")];
        let context = RelevanceRanker::default().rank(&corpus, "apple");
        assert_eq!(
            context,
            "Source: a.txt\nContent: red apple\n\n---\n\nSource: b.txt\nContent: green apple"
        );
    }

    proptest! {
        #[test]
        fn prop_rank_is_bounded_and_deterministic(
            contents in prop::collection::vec("[a-e ]{0,30}", 0..20),
            question in "[a-e ]{0,12}",
            max_chunks in 0usize..5,
        ) {
            let corpus: Vec<DocumentChunk> = contents
                .iter()
                .enumerate()
                .map(|(i, c)| chunk(c, &format!("{}.txt", i)))
                .collect();
            let ranker = RelevanceRanker::new(max_chunks);

            let top = ranker.top_chunks(&corpus, &question);
            prop_assert!(top.len() <= max_chunks);
            prop_assert!(top.iter().all(|s| s.score >= 1));
            prop_assert_eq!(ranker.rank(&corpus, &question), ranker.rank(&corpus, &question));
        }
    }
}
