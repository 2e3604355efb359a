//! Error types for the chat client

use thiserror::Error;

/// Result type alias for kb-chat operations
pub type Result<T> = std::result::Result<T, Error>;

/// kb-chat errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (bad chunking parameters, unreadable config, template problems)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Text extraction failed for a single file
    #[error("Failed to read '{path}': {message}")]
    Ingestion { path: String, message: String },

    /// Provider rejected the credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Network, timeout, HTTP status or malformed response from the provider
    #[error("Request failed: {0}")]
    Transport(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an ingestion error for a file
    pub fn ingestion(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Ingestion {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// True when the provider refused the API key
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}
