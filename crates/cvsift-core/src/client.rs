//! Chat-completion client for the remote extraction API.
//!
//! All LLM traffic goes through the [`ChatBackend`] trait so the pipeline can
//! be exercised without network access (see [`crate::mock`]). The real
//! implementation targets DeepSeek's OpenAI-compatible endpoint: one request
//! per CV, no retry, no batching.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Config, CoreError};

pub const DEEPSEEK_API_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// A chat-completion backend: takes a system prompt and a user message,
/// returns the model's text reply.
pub trait ChatBackend: Send + Sync {
    /// Display name of the backend (e.g. "DeepSeek").
    fn name(&self) -> &str;

    fn complete<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CoreError>> + Send + 'a>>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// DeepSeek chat-completion client.
pub struct DeepSeekClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl DeepSeekClient {
    pub fn new(config: &Config) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

impl ChatBackend for DeepSeekClient {
    fn name(&self) -> &str {
        "DeepSeek"
    }

    fn complete<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, CoreError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{}/chat/completions", self.base_url);
            let body = ChatRequest {
                model: &self.model,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: system,
                    },
                    ChatMessage {
                        role: "user",
                        content: user,
                    },
                ],
            };

            tracing::debug!(url = %url, model = %self.model, "sending extraction request");

            let resp = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = resp.status();
            if status.as_u16() == 429 {
                return Err(CoreError::RateLimited);
            }
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(CoreError::Api {
                    status: status.as_u16(),
                    message: compact_error_body(&message),
                });
            }

            let data: ChatResponse = resp.json().await?;
            let content = data
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default();
            let content = content.trim();
            if content.is_empty() {
                return Err(CoreError::EmptyReply);
            }
            Ok(content.to_string())
        })
    }
}

/// Collapse an error response body to a single short line for logging.
fn compact_error_body(body: &str) -> String {
    let compact: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.chars().count() > 200 {
        let head: String = compact.chars().take(200).collect();
        format!("{head}...")
    } else {
        compact
    }
}
