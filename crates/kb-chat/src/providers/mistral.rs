//! Mistral AI chat-completions client

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::generation::SseDecoder;
use crate::types::ChatMessage;

use super::llm::{single_fragment, FragmentStream, LlmProvider};

/// Client for the Mistral chat completions API
pub struct MistralClient {
    client: reqwest::Client,
    api_key: String,
    config: LlmConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl MistralClient {
    /// Create a new client
    pub fn new(api_key: impl Into<String>, config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config: config.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Map a non-success status, keeping auth rejections distinct
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::authentication(format!(
                "{} - check your API key ({})",
                status, body
            ))),
            _ => Err(Error::transport(format!("Mistral API returned {}: {}", status, body))),
        }
    }
}

fn send_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::transport("Request timed out")
    } else if e.is_connect() {
        Error::transport(format!("Connection failed: {}", e))
    } else {
        Error::transport(format!("Mistral request failed: {}", e))
    }
}

#[async_trait]
impl LlmProvider for MistralClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<FragmentStream> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            top_p: self.config.top_p,
            stream: self.config.stream,
        };

        tracing::debug!(
            "POST chat/completions: {} messages, model {}, stream {}",
            messages.len(),
            self.config.model,
            self.config.stream
        );

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;
        let response = Self::check_status(response).await?;

        if self.config.stream {
            let body = response.bytes_stream().boxed();
            let fragments = stream::unfold(
                (body, SseDecoder::new(), false),
                |(mut body, mut decoder, finished)| async move {
                    if finished {
                        return None;
                    }
                    let decoded = match body.next().await {
                        Some(Ok(bytes)) => decoder.push(&bytes),
                        Some(Err(e)) => vec![Err(send_error(e))],
                        None => return Some((decoder.finish(), (body, decoder, true))),
                    };
                    Some((decoded, (body, decoder, false)))
                },
            )
            .flat_map(stream::iter);
            return Ok(fragments.boxed());
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::transport(format!("Failed to parse Mistral response: {}", e)))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::transport("No choices in Mistral response"))?;

        Ok(single_fragment(content))
    }

    async fn verify(&self) -> Result<()> {
        let response = self
            .client
            .get(self.endpoint("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(send_error)?;
        Self::check_status(response).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "mistral"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
