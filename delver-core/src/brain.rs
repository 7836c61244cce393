//! LLM provider abstraction.
//!
//! Defines the `LlmProvider` trait the research engine drives, plus a
//! scripted mock for tests. The engine treats the model as a black box:
//! prompt strings in, text out, with no retry logic of its own.

use crate::error::LlmError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Per-call invocation options.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvokeOptions {
    /// Sampling temperature. The research stages run at 0.0.
    pub temperature: f32,
    /// Ask the provider to constrain output to a JSON object.
    pub json_mode: bool,
}

impl InvokeOptions {
    /// Zero-temperature options with JSON-constrained output.
    pub fn json() -> Self {
        Self {
            temperature: 0.0,
            json_mode: true,
        }
    }

    /// Zero-temperature options with free-form output.
    pub fn text() -> Self {
        Self {
            temperature: 0.0,
            json_mode: false,
        }
    }
}

/// Trait for LLM providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one completion and return the raw text content.
    async fn invoke(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: InvokeOptions,
    ) -> Result<String, LlmError>;

    /// The model identifier this provider talks to.
    fn model_name(&self) -> &str;
}

/// Scripted LLM provider for tests.
///
/// Returns queued responses in order; once the queue is drained, every
/// further call returns the fallback response.
pub struct MockLlmProvider {
    responses: Mutex<VecDeque<String>>,
    fallback: String,
}

impl MockLlmProvider {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            fallback: "{}".to_string(),
        }
    }

    /// Replace the drained-queue fallback response.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn invoke(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _options: InvokeOptions,
    ) -> Result<String, LlmError> {
        let mut queue = self.responses.lock().expect("mock queue lock");
        Ok(queue.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_scripted_then_fallback() {
        let mock = MockLlmProvider::new(["one", "two"]).with_fallback("done");
        assert_eq!(mock.invoke("s", "u", InvokeOptions::json()).await.unwrap(), "one");
        assert_eq!(mock.invoke("s", "u", InvokeOptions::text()).await.unwrap(), "two");
        assert_eq!(mock.invoke("s", "u", InvokeOptions::text()).await.unwrap(), "done");
        assert_eq!(mock.invoke("s", "u", InvokeOptions::text()).await.unwrap(), "done");
    }
}
