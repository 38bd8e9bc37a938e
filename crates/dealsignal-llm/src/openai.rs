//! OpenAI-compatible chat-completion provider
//!
//! Sends one `POST {endpoint}/chat/completions` per call with a system and a
//! user message. There is no retry loop and no request timeout; failures are
//! reported to the caller, which degrades to rule-based extraction.
//!
//! # Examples
//!
//! ```no_run
//! use dealsignal_llm::{LlmConfig, OpenAiProvider};
//!
//! let config = LlmConfig::default().with_api_key("sk-...");
//! let provider = OpenAiProvider::from_config(&config).unwrap();
//! assert!(provider.is_some());
//! ```

use crate::{LlmConfig, LlmError};
use dealsignal_domain::traits::LlmProvider as LlmProviderTrait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

/// Longest error body kept in `LlmError::Api`
const MAX_ERROR_BODY: usize = 500;

/// Chat-completion client bound to one model and one API key
pub struct OpenAiProvider {
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Build a provider from configuration
    ///
    /// Returns `Ok(None)` when no API key is configured, so callers can run
    /// without an LLM rather than fail.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, LlmError> {
        let Some(api_key) = config.api_key() else {
            return Ok(None);
        };
        config.validate().map_err(LlmError::Config)?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Some(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            api_key: api_key.to_string(),
            client,
        }))
    }

    /// Full URL of the chat-completion route
    pub fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| LlmError::Config(format!("Invalid API key header: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Send one chat-completion request and return the first choice's text
    pub async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                WireMessage {
                    role: "system",
                    content: system,
                },
                WireMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, chars = user.len(), "Chat completion request");

        let response = self
            .client
            .post(self.url())
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No content in response".to_string()))
    }
}

impl LlmProviderTrait for OpenAiProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send {
        self.chat(system, user)
    }
}
