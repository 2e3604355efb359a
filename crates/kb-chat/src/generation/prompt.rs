//! Two-slot prompt template

use std::path::Path;

use crate::error::{Error, Result};

const CONTEXT_SLOT: &str = "{context}";
const QUESTION_SLOT: &str = "{question}";

/// Used when no valid template file is available
pub const DEFAULT_TEMPLATE: &str = "You are a helpful AI assistant. Use the following context to answer the user's question.\n\nContext information:\n{context}\n\nUser question:\n{question}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Context,
    Question,
}

/// Prompt template with `{context}` and `{question}` placeholders.
///
/// Validated and split into segments once, so rendering cannot fail and
/// substituted text is never scanned for placeholders again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse template text; both placeholders must be present
    pub fn parse(text: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = text;

        loop {
            let next = [(CONTEXT_SLOT, Segment::Context), (QUESTION_SLOT, Segment::Question)]
                .into_iter()
                .filter_map(|(slot, segment)| rest.find(slot).map(|at| (at, slot, segment)))
                .min_by_key(|(at, _, _)| *at);

            let Some((at, slot, segment)) = next else {
                if !rest.is_empty() {
                    segments.push(Segment::Literal(rest.to_string()));
                }
                break;
            };

            if at > 0 {
                segments.push(Segment::Literal(rest[..at].to_string()));
            }
            segments.push(segment);
            rest = &rest[at + slot.len()..];
        }

        for (slot, segment) in [(CONTEXT_SLOT, Segment::Context), (QUESTION_SLOT, Segment::Question)] {
            if !segments.contains(&segment) {
                return Err(Error::configuration(format!(
                    "prompt template is missing the {} placeholder",
                    slot
                )));
            }
        }

        Ok(Self { segments })
    }

    /// Load a template file, falling back to [`DEFAULT_TEMPLATE`] with a warning
    /// when the file is missing, unreadable or lacks a placeholder
    pub fn load(path: &Path) -> Self {
        let loaded = std::fs::read_to_string(path)
            .map_err(Error::from)
            .and_then(|text| Self::parse(&text));

        match loaded {
            Ok(template) => {
                tracing::debug!("Loaded prompt template from {}", path.display());
                template
            }
            Err(e) => {
                tracing::warn!("{} not usable ({}), using default prompt", path.display(), e);
                Self::default()
            }
        }
    }

    /// Substitute both slots
    pub fn render(&self, context: &str, question: &str) -> String {
        let mut prompt = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => prompt.push_str(text),
                Segment::Context => prompt.push_str(context),
                Segment::Question => prompt.push_str(question),
            }
        }
        prompt
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            segments: vec![
                Segment::Literal(
                    "You are a helpful AI assistant. Use the following context to answer the user's question.\n\nContext information:\n"
                        .to_string(),
                ),
                Segment::Context,
                Segment::Literal("\n\nUser question:\n".to_string()),
                Segment::Question,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_default_text() {
        assert_eq!(PromptTemplate::parse(DEFAULT_TEMPLATE).unwrap(), PromptTemplate::default());
    }

    #[test]
    fn test_render() {
        let template = PromptTemplate::parse("Q: {question}\nC: {context}\nAgain: {question}").unwrap();
        assert_eq!(
            template.render("ctx", "why?"),
            "Q: why?\nC: ctx\nAgain: why?"
        );
    }

    #[test]
    fn test_substituted_text_is_not_rescanned() {
        let template = PromptTemplate::parse("{context}|{question}").unwrap();
        assert_eq!(template.render("{question}", "{context}"), "{question}|{context}");
    }

    #[test]
    fn test_missing_placeholder_rejected() {
        assert!(matches!(
            PromptTemplate::parse("Answer: {question}"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            PromptTemplate::parse("{context} only"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_load_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(PromptTemplate::load(&dir.path().join("prompt.txt")), PromptTemplate::default());

        let invalid = dir.path().join("invalid.txt");
        std::fs::write(&invalid, "no placeholders here").unwrap();
        assert_eq!(PromptTemplate::load(&invalid), PromptTemplate::default());

        let custom = dir.path().join("custom.txt");
        std::fs::write(&custom, "Docs:\n{context}\n\nAsk: {question}").unwrap();
        assert_eq!(PromptTemplate::load(&custom).render("c", "q"), "Docs:\nc\n\nAsk: q");
    }
}
