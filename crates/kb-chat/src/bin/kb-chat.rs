//! kb-chat binary
//!
//! Run with: cargo run -p kb-chat -- [chat|configure|about]

use clap::{Parser, Subcommand};
use kb_chat::{app::ChatApp, config::ChatConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Chat with an LLM about the documents in a local knowledge folder.
#[derive(Parser)]
#[command(name = "kb-chat", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Defaults to `./kb-chat.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Knowledge folder to load documents from.
    #[arg(long, global = true)]
    knowledge: Option<PathBuf>,

    /// Wait for the whole reply instead of streaming it.
    #[arg(long, global = true)]
    no_stream: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start a chat session directly, skipping the menu.
    Chat,
    /// Store the API key in the env file.
    Configure,
    /// Show information about the client.
    About,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kb_chat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ChatConfig::load(cli.config.as_deref())?;
    if let Some(root) = cli.knowledge {
        config.knowledge.root = root;
    }
    if cli.no_stream {
        config.llm.stream = false;
    }

    tracing::debug!(
        "Configuration: knowledge={}, chunk_size={}, overlap={}, model={}",
        config.knowledge.root.display(),
        config.chunking.chunk_size,
        config.chunking.overlap,
        config.llm.model
    );

    let mut app = ChatApp::new(config);
    match cli.command {
        None => app.run_menu().await?,
        Some(Command::Chat) => {
            app.start_chat().await?;
        }
        Some(Command::Configure) => {
            app.configure_key()?;
        }
        Some(Command::About) => app.about(),
    }

    Ok(())
}
