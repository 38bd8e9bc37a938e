//! Dealsignal LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `dealsignal-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat-completion API
//!
//! Providers send exactly one request per call and never retry; on failure
//! the extractor degrades to rule-based extraction.
//!
//! # Examples
//!
//! ```
//! use dealsignal_llm::MockProvider;
//! use dealsignal_domain::traits::LlmProvider;
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new("[]");
//! let reply = provider.complete("system", "user").await.unwrap();
//! assert_eq!(reply, "[]");
//! # });
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod openai;

use dealsignal_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use config::LlmConfig;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Endpoint answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Communication(e.to_string())
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail(String),
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured replies without making any network calls. Replies
/// can be keyed on the user message; everything else gets the default reply.
///
/// # Examples
///
/// ```
/// use dealsignal_llm::MockProvider;
/// use dealsignal_domain::traits::LlmProvider;
///
/// # tokio_test::block_on(async {
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// assert_eq!(provider.complete("sys", "prompt1").await.unwrap(), "response1");
/// assert_eq!(provider.call_count(), 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: MockReply,
    responses: Arc<Mutex<HashMap<String, MockReply>>>,
    call_count: Arc<AtomicUsize>,
    last_user_message: Arc<Mutex<Option<String>>>,
}

impl MockProvider {
    /// Create a MockProvider with a fixed reply for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_default(MockReply::Text(response.into()))
    }

    /// Create a MockProvider whose every call fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_default(MockReply::Fail(message.into()))
    }

    fn with_default(default_reply: MockReply) -> Self {
        Self {
            default_reply,
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            last_user_message: Arc::new(Mutex::new(None)),
        }
    }

    /// Add a specific reply for a given user message
    pub fn add_response(&mut self, user: impl Into<String>, response: impl Into<String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(user.into(), MockReply::Text(response.into()));
        }
    }

    /// Configure an error for a specific user message
    pub fn add_error(&mut self, user: impl Into<String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(user.into(), MockReply::Fail("Mock error".to_string()));
        }
    }

    /// Get the number of times `complete` was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }

    /// The user message of the most recent call
    pub fn last_user_message(&self) -> Option<String> {
        self.last_user_message.lock().ok().and_then(|m| m.clone())
    }

    fn reply_for(&self, user: &str) -> Result<String, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_user_message.lock() {
            *last = Some(user.to_string());
        }

        let reply = self
            .responses
            .lock()
            .ok()
            .and_then(|responses| responses.get(user).cloned())
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail(message) => Err(LlmError::Other(message)),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        "mock"
    }

    fn complete(
        &self,
        _system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send {
        let reply = self.reply_for(user);
        async move { reply }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete("sys", "any prompt").await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.complete("s", "hello").await.unwrap(), "world");
        assert_eq!(provider.complete("s", "foo").await.unwrap(), "bar");
        assert_eq!(
            provider.complete("s", "unknown").await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.complete("s", "prompt1").await.unwrap();
        provider.complete("s", "prompt2").await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.last_user_message().as_deref(), Some("prompt2"));

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.complete("s", "bad prompt").await;
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[tokio::test]
    async fn test_failing_provider_counts_calls() {
        let provider = MockProvider::failing("offline");
        assert!(provider.complete("s", "u").await.is_err());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete("s", "test").await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
