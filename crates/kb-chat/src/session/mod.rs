//! Conversation state: history, corpus snapshot and prompt assembly

mod commands;

pub use commands::{ChatCommand, HELP_TEXT};

use futures_util::StreamExt;

use crate::error::{Error, Result};
use crate::generation::PromptTemplate;
use crate::ingestion::{CorpusLoader, LoadReport};
use crate::providers::LlmProvider;
use crate::retrieval::{RelevanceRanker, NO_RELEVANT_CONTEXT};
use crate::types::{ChatMessage, Corpus, Role};
use crate::ui::{Notice, Renderer};

/// Panel title for failed exchanges
pub const API_ERROR_TITLE: &str = "API Error";

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Just created or reset; history holds at most the corpus summary
    Fresh,
    /// At least one exchange has been recorded
    Active,
}

/// One conversation with the knowledge base.
///
/// After every initialization the history starts with exactly one system
/// message summarizing the corpus when the corpus is non-empty, and with no
/// system message otherwise.
pub struct ConversationSession {
    messages: Vec<ChatMessage>,
    corpus: Corpus,
    template: PromptTemplate,
    ranker: RelevanceRanker,
    loader: Option<CorpusLoader>,
}

impl ConversationSession {
    /// Load the corpus from disk and start a fresh session
    pub fn new(
        loader: CorpusLoader,
        template: PromptTemplate,
        ranker: RelevanceRanker,
    ) -> (Self, LoadReport) {
        let mut report = loader.load();
        let corpus = std::mem::take(&mut report.corpus);
        let mut session = Self::with_corpus(corpus, template, ranker);
        session.loader = Some(loader);
        (session, report)
    }

    /// Start a session over an already built corpus; `reset` keeps this corpus
    pub fn with_corpus(corpus: Corpus, template: PromptTemplate, ranker: RelevanceRanker) -> Self {
        let mut session = Self {
            messages: Vec::new(),
            corpus: Vec::new(),
            template,
            ranker,
            loader: None,
        };
        session.initialize(corpus);
        session
    }

    /// Replace the corpus and clear history
    pub fn initialize(&mut self, corpus: Corpus) {
        self.messages.clear();
        if !corpus.is_empty() {
            self.messages.push(ChatMessage::system(format!(
                "Knowledge base loaded with {} document chunks.",
                corpus.len()
            )));
        }
        self.corpus = corpus;
    }

    /// Reload documents from disk and start over
    pub fn reset(&mut self) -> LoadReport {
        let mut report = match &self.loader {
            Some(loader) => loader.load(),
            None => LoadReport {
                corpus: self.corpus.clone(),
                ..LoadReport::default()
            },
        };
        let corpus = std::mem::take(&mut report.corpus);
        tracing::info!("Session reset with {} chunks", corpus.len());
        self.initialize(corpus);
        report
    }

    /// Prompt for a question: the template filled with ranked context, or
    /// the bare question when nothing relevant was found
    pub fn build_prompt(&self, question: &str) -> String {
        let context = self.ranker.rank(&self.corpus, question);
        if context.is_empty() || context == NO_RELEVANT_CONTEXT {
            return question.to_string();
        }
        self.template.render(&context, question)
    }

    pub fn append_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Ask the provider and record the exchange.
    ///
    /// Fragments reach the renderer as they arrive. On any failure the error
    /// is shown through the renderer, returned, and history is left as it was.
    pub async fn exchange(
        &mut self,
        provider: &dyn LlmProvider,
        renderer: &mut dyn Renderer,
        question: &str,
    ) -> Result<String> {
        let prompt = self.build_prompt(question);

        match self.request(provider, renderer, &prompt).await {
            Ok(reply) => {
                self.append_user(prompt);
                self.append_assistant(reply.clone());
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!("Exchange with {} failed: {}", provider.name(), e);
                renderer.message(Notice::Error, API_ERROR_TITLE, &e.to_string());
                Err(e)
            }
        }
    }

    async fn request(
        &self,
        provider: &dyn LlmProvider,
        renderer: &mut dyn Renderer,
        prompt: &str,
    ) -> Result<String> {
        let mut request = self.messages.clone();
        request.push(ChatMessage::user(prompt));

        renderer.begin_reply();

        let mut reply = String::new();
        let outcome = async {
            let mut fragments = provider.complete(&request).await?;
            while let Some(fragment) = fragments.next().await {
                let fragment = fragment?;
                renderer.reply_fragment(&fragment);
                reply.push_str(&fragment);
            }
            Ok::<(), Error>(())
        }
        .await;

        match outcome {
            Ok(()) if reply.trim().is_empty() => {
                renderer.end_reply("");
                Err(Error::transport("No response received from the API."))
            }
            Ok(()) => {
                renderer.end_reply(&reply);
                Ok(reply)
            }
            Err(e) => {
                renderer.end_reply("");
                Err(e)
            }
        }
    }

    /// History in send order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn state(&self) -> SessionState {
        if self.messages.iter().any(|m| m.role != Role::System) {
            SessionState::Active
        } else {
            SessionState::Fresh
        }
    }
}
