/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds, upper-casing the text
 * - `MockProvider::prefixed()` - Always succeeds, prefixing the target language
 * - `MockProvider::failing()` - Always fails with a connection error
 * - `MockProvider::fail_on_call(n)` - Fails only the n-th request
 * - `MockProvider::fail_on_text(s)` - Fails every request containing `s`
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Mock request recorded for assertions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Upper-case the input
    Working,
    /// Prefix the input with `[target]`
    Prefixed,
    /// Always fail
    Failing,
    /// Fail the n-th request (1-based), succeed otherwise
    FailOnCall { call: usize },
    /// Fail any request whose text contains the needle
    FailOnText { needle: String },
    /// Succeed after sleeping
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter
    request_count: Arc<AtomicUsize>,
    /// Every request seen, in order
    requests: Mutex<Vec<MockRequest>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Mutex::new(Vec::new()),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn prefixed() -> Self {
        Self::new(MockBehavior::Prefixed)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn fail_on_call(call: usize) -> Self {
        Self::new(MockBehavior::FailOnCall { call })
    }

    pub fn fail_on_text(needle: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailOnText {
            needle: needle.into(),
        })
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator used for successful requests
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// Texts of every request received so far
    pub fn requested_texts(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.text.clone()).collect()
    }

    fn respond(&self, request: &MockRequest) -> String {
        if let Some(generator) = self.custom_response {
            return generator(request);
        }
        match self.behavior {
            MockBehavior::Prefixed => format!("[{}] {}", request.target_language, request.text),
            _ => request.text.to_uppercase(),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let call = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        let request = MockRequest {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };
        self.requests.lock().push(request.clone());

        match &self.behavior {
            MockBehavior::Failing => {
                return Err(ProviderError::ConnectionError("Mock provider is offline".to_string()));
            }
            MockBehavior::FailOnCall { call: failing } if *failing == call => {
                return Err(ProviderError::Timeout(format!("Mock request {} timed out", call)));
            }
            MockBehavior::FailOnText { needle } if text.contains(needle.as_str()) => {
                return Err(ProviderError::TranslationFailed(format!(
                    "Mock refuses to translate '{}'",
                    needle
                )));
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(*delay_ms)).await;
            }
            _ => {}
        }

        Ok(self.respond(&request))
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
