//! Interactive application: menu, setup, key configuration and chat loop

use crate::config::ChatConfig;
use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::generation::PromptTemplate;
use crate::ingestion::{CorpusLoader, LoadReport, TextChunker};
use crate::providers::{LlmProvider, MistralClient};
use crate::retrieval::RelevanceRanker;
use crate::session::{ChatCommand, ConversationSession, HELP_TEXT};
use crate::ui::{ChatConsole, Notice, Renderer, TerminalUi};

const ABOUT_TEXT: &str = "\
This is a Custom GPT Chatbot with Knowledge Base Integration.

About:
  Answers questions using your own documents. Relevant passages from the
  knowledge folder are added to every question sent to the model.

Key Features:
  • Knowledge base integration with document processing
  • Support for PDF, Word, Excel, and text files
  • Context-aware conversations
  • Streaming replies rendered as Markdown
  • Conversation history management

How to use:
  1. Place your documents in the 'knowledge' folder
  2. Run the application and start chatting
  3. Ask questions related to your documents
  4. Type /new after adding documents to reload them

Supported File Types:
  • PDF (.pdf)
  • Word Documents (.docx)
  • Excel Spreadsheets (.xlsx, .xls)
  • Text Files (.txt)
  • Markdown Files (.md)";

/// Main menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Chat,
    ConfigureKey,
    About,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Chat),
            "2" => Some(Self::ConfigureKey),
            "3" => Some(Self::About),
            "4" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Top-level controller for the terminal client
pub struct ChatApp {
    config: ChatConfig,
    credentials: CredentialStore,
    ui: TerminalUi,
}

impl ChatApp {
    pub fn new(config: ChatConfig) -> Self {
        let credentials = CredentialStore::from_config(&config.files);
        Self {
            config,
            credentials,
            ui: TerminalUi::new(),
        }
    }

    /// Menu loop until Exit or end of input
    pub async fn run_menu(&mut self) -> Result<()> {
        loop {
            self.ui.clear();
            self.ui.banner();
            self.ui.main_menu();

            let Some(choice) = self.ui.read_input("Select an option")? else {
                break;
            };

            match MenuChoice::parse(&choice) {
                Some(MenuChoice::Chat) => {
                    if !self.start_chat().await? {
                        self.ui.pause()?;
                    }
                }
                Some(MenuChoice::ConfigureKey) => {
                    self.configure_key()?;
                    self.ui.pause()?;
                }
                Some(MenuChoice::About) => {
                    self.about();
                    self.ui.pause()?;
                }
                Some(MenuChoice::Exit) => break,
                None => {
                    self.ui
                        .message(Notice::Warning, "Warning", "Invalid option, please try again.");
                    self.ui.pause()?;
                }
            }
        }

        self.ui.status(Notice::Error, "Exiting...");
        Ok(())
    }

    /// Set up and run one chat. Returns false when setup did not succeed.
    pub async fn start_chat(&mut self) -> Result<bool> {
        let Some((provider, mut session)) = self.setup().await? else {
            return Ok(false);
        };
        chat_loop(&mut session, &provider, &mut self.ui).await?;
        Ok(true)
    }

    /// Load and verify the key, then load the template and the corpus
    pub async fn setup(&mut self) -> Result<Option<(MistralClient, ConversationSession)>> {
        let api_key = match self.credentials.load()? {
            Some(key) => key,
            None => {
                self.ui.message(Notice::Warning, "Setup Required", "API key not found.");
                let answer = self.ui.read_input("Configure it now? (y/n)")?.unwrap_or_default();
                if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                    return Ok(None);
                }
                if !self.configure_key()? {
                    return Ok(None);
                }
                match self.credentials.load()? {
                    Some(key) => key,
                    None => return Ok(None),
                }
            }
        };

        self.ui.status(Notice::System, "Verifying API key...");
        let provider = MistralClient::new(api_key, &self.config.llm)?;
        if let Err(e) = provider.verify().await {
            let hint = if e.is_authentication() {
                format!(
                    "This usually means your API key is invalid. Please check your API key in {}.",
                    self.credentials.path().display()
                )
            } else {
                "This might be a network connectivity issue. Please check your internet connection."
                    .to_string()
            };
            self.ui.message(
                Notice::Error,
                "Error",
                &format!("Failed to initialize API client: {}\n\n{}", e, hint),
            );
            return Ok(None);
        }
        self.ui.status(Notice::Success, "API key verified.");

        let template = PromptTemplate::load(&self.config.files.prompt_template);
        let chunker = TextChunker::from_config(&self.config.chunking)?;
        let ranker = RelevanceRanker::from_config(&self.config.retrieval);
        tracing::debug!(
            "Chunks of {} words ({} overlap), up to {} per prompt",
            chunker.chunk_size(),
            chunker.overlap(),
            ranker.max_chunks()
        );

        let loader = CorpusLoader::new(self.config.knowledge.root.clone(), chunker);
        let root = loader.root().display().to_string();

        self.ui.status(Notice::Info, "Loading knowledge base...");
        let (session, report) = ConversationSession::new(loader, template, ranker);
        report_load(&mut self.ui, &report, &root);

        tracing::info!(
            "Session ready: {} via {}, {} chunks",
            provider.model(),
            provider.name(),
            session.corpus().len()
        );
        Ok(Some((provider, session)))
    }

    /// Ask for a key and store it. Returns false when nothing was saved.
    pub fn configure_key(&mut self) -> Result<bool> {
        self.ui.clear();
        self.ui.banner();
        self.ui
            .message(Notice::Success, "API Key Configuration", "Enter your Mistral API key.");

        let key = self.ui.prompt_secret("Paste key")?;
        match self.credentials.save(&key) {
            Ok(()) => {
                self.ui.message(
                    Notice::Success,
                    "Success",
                    &format!("API key saved to {}.", self.credentials.path().display()),
                );
                Ok(true)
            }
            Err(e @ Error::Configuration(_)) => {
                self.ui.message(Notice::Error, "Error", &e.to_string());
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub fn about(&mut self) {
        self.ui.clear();
        self.ui.banner();
        self.ui.message(Notice::Success, "About Custom GPT", ABOUT_TEXT);
    }
}

/// Show the outcome of a corpus load
pub fn report_load(renderer: &mut dyn Renderer, report: &LoadReport, root: &str) {
    if report.root_missing {
        renderer.message(
            Notice::Warning,
            "Knowledge Base",
            &format!("Knowledge folder not found: {}", root),
        );
        return;
    }

    let mut text = format!("Successfully processed {} files", report.files_processed);
    if report.files_failed > 0 {
        text.push_str(&format!(" ({} could not be read)", report.files_failed));
    }
    renderer.message(Notice::Info, "Knowledge Base", &text);
}

/// Read commands and questions until `/exit` or end of input
pub async fn chat_loop<C: ChatConsole>(
    session: &mut ConversationSession,
    provider: &dyn LlmProvider,
    console: &mut C,
) -> Result<()> {
    console.clear();
    console.message(
        Notice::System,
        "System",
        "Custom GPT is online. Type '/help' for commands.",
    );

    while let Some(input) = console.read_input("You")? {
        match ChatCommand::parse(&input) {
            ChatCommand::Exit => break,
            ChatCommand::Empty => {}
            ChatCommand::Help => console.message(Notice::System, "Help", HELP_TEXT),
            ChatCommand::New => {
                console.clear();
                let report = session.reset();
                if report.files_failed > 0 {
                    console.message(
                        Notice::Warning,
                        "Knowledge Base",
                        &format!("{} files could not be read", report.files_failed),
                    );
                }
                console.message(Notice::Info, "System", "New chat session started.");
            }
            ChatCommand::Ask(question) => {
                // failures are already shown and leave history untouched
                let _ = session.exchange(provider, console, &question).await;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_choice() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::Chat));
        assert_eq!(MenuChoice::parse(" 2 "), Some(MenuChoice::ConfigureKey));
        assert_eq!(MenuChoice::parse("3"), Some(MenuChoice::About));
        assert_eq!(MenuChoice::parse("4"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("5"), None);
        assert_eq!(MenuChoice::parse("chat"), None);
    }
}
