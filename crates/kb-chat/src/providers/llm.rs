//! LLM provider trait for chat completions

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};

use crate::error::Result;
use crate::types::ChatMessage;

/// Reply text in arrival order; the fragments concatenate to the full reply.
///
/// A provider that answers in one payload yields a single fragment.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Wrap a finished reply as a one-fragment stream
pub fn single_fragment(text: String) -> FragmentStream {
    stream::iter(std::iter::once(Ok(text))).boxed()
}

/// Trait for chat-completion providers
///
/// Implementations:
/// - `MistralClient`: Mistral AI chat completions API
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the full ordered history, the newest user message last
    async fn complete(&self, messages: &[ChatMessage]) -> Result<FragmentStream>;

    /// Check that the provider accepts the configured credentials
    async fn verify(&self) -> Result<()>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_single_fragment() {
        let fragments: Vec<String> = single_fragment("whole reply".to_string())
            .map(|f| f.unwrap())
            .collect()
            .await;
        assert_eq!(fragments, vec!["whole reply"]);
    }
}
