//! Ollama / OpenAI-compatible LLM provider.
//!
//! Talks to any endpoint following the OpenAI chat-completions API format.
//! Local providers (Ollama, vLLM, LM Studio) work without an API key.

use crate::brain::{InvokeOptions, LlmProvider};
use crate::config::LlmConfig;
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OllamaProvider {
    /// Create a provider from configuration.
    ///
    /// The API key is read from the env var named in `config.api_key_env`;
    /// when unset, a dummy bearer token is used, which local providers
    /// accept.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env).unwrap_or_else(|_| {
            debug!("no API key set; using dummy bearer token for local provider");
            "ollama".to_string()
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn invoke(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: InvokeOptions,
    ) -> Result<String, LlmError> {
        let mut body = json!({
            "model": self.model,
            "temperature": options.temperature,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
        });
        if options.json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else if e.is_connect() {
                    LlmError::Connection {
                        message: e.to_string(),
                    }
                } else {
                    LlmError::ApiRequest {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LlmError::AuthFailed {
                provider: self.base_url.clone(),
            });
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiRequest {
                message: format!("HTTP {status}: {detail}"),
            });
        }

        let payload: Value = response.json().await.map_err(|e| LlmError::ResponseParse {
            message: e.to_string(),
        })?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LlmError::ResponseParse {
                message: "response has no message content".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
