//! Configuration for the chat client

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "kb-chat.toml";

/// Main chat client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Document folder configuration
    pub knowledge: KnowledgeConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Context selection configuration
    pub retrieval: RetrievalConfig,
    /// Model provider configuration
    pub llm: LlmConfig,
    /// Prompt template and credential file locations
    pub files: FilesConfig,
}

impl ChatConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `kb-chat.toml` in the working
    /// directory is used when present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::configuration(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&candidate)?;
        Self::from_toml(&content)
            .map_err(|e| Error::configuration(format!("{}: {}", candidate.display(), e)))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::configuration(e.to_string()))
    }
}

/// Document folder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Folder walked for documents
    pub root: PathBuf,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("knowledge"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Words per chunk
    pub chunk_size: usize,
    /// Words shared by consecutive chunks
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 100,
        }
    }
}

/// Context selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum chunks placed into a prompt
    pub max_chunks: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { max_chunks: 3 }
    }
}

/// Model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL (Mistral-compatible chat completions)
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens in a reply
    pub max_tokens: u32,
    /// Nucleus sampling
    pub top_p: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Stream the reply fragment by fragment
    pub stream: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mistral.ai/v1".to_string(),
            model: "mistral-small-latest".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            top_p: 1.0,
            timeout_secs: 120,
            stream: true,
        }
    }
}

/// Prompt template and credential file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Prompt template with `{context}` and `{question}` placeholders
    pub prompt_template: PathBuf,
    /// Env file holding the API key
    pub env_file: PathBuf,
    /// Variable name of the API key in the env file
    pub api_key_var: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            prompt_template: PathBuf::from("prompt.txt"),
            env_file: PathBuf::from(".env"),
            api_key_var: "API_KEY".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.knowledge.root, PathBuf::from("knowledge"));
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.overlap, 100);
        assert_eq!(config.retrieval.max_chunks, 3);
        assert_eq!(config.llm.model, "mistral-small-latest");
        assert_eq!(config.files.api_key_var, "API_KEY");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ChatConfig::from_toml(
            r#"
[chunking]
chunk_size = 200

[llm]
stream = false
"#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 200);
        assert_eq!(config.chunking.overlap, 100);
        assert!(!config.llm.stream);
        assert_eq!(config.llm.max_tokens, 1000);
    }

    #[test]
    fn test_invalid_toml() {
        let err = ChatConfig::from_toml("chunking = [").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_missing_explicit_path() {
        let err = ChatConfig::load(Some(Path::new("/nonexistent/kb-chat.toml"))).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
