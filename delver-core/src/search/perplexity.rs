//! Perplexity search backend.
//!
//! Perplexity's online models answer a query directly and return the
//! citation URLs they consulted. The answer becomes the first result's
//! content; each additional citation becomes its own result so every
//! consulted URL survives into the report's source list.

use super::SearchProvider;
use crate::error::SearchError;
use crate::types::{SearchResponse, SearchResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const API_ENDPOINT: &str = "https://api.perplexity.ai/chat/completions";
const API_KEY_VAR: &str = "PERPLEXITY_API_KEY";
const MODEL: &str = "sonar";

#[derive(Default)]
pub struct PerplexityProvider;

impl PerplexityProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchProvider for PerplexityProvider {
    fn name(&self) -> &'static str {
        "perplexity"
    }

    async fn search(
        &self,
        query: &str,
        _max_results: usize,
        _fetch_full_page: bool,
    ) -> Result<SearchResponse, SearchError> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| SearchError::MissingApiKey {
            provider: "perplexity".to_string(),
            var: API_KEY_VAR.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| request_error(e.to_string()))?;

        let body = json!({
            "model": MODEL,
            "messages": [
                {"role": "system", "content": "Search the web and provide factual information with sources."},
                {"role": "user", "content": query},
            ],
        });

        let payload: serde_json::Value = client
            .post(API_ENDPOINT)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(e.to_string()))?
            .error_for_status()
            .map_err(|e| request_error(e.to_string()))?
            .json()
            .await
            .map_err(|e| parse_error(e.to_string()))?;

        let answer = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| parse_error("missing answer content".to_string()))?
            .to_string();

        let citations: Vec<String> = payload
            .get("citations")
            .and_then(|v| v.as_array())
            .map(|urls| {
                urls.iter()
                    .filter_map(|u| u.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        // The full answer rides on the first citation; the rest only carry
        // their URL so they still appear as sources.
        let mut results = vec![
            SearchResult::new(
                "Perplexity Search, Source 1",
                citations
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "https://perplexity.ai".to_string()),
                answer.clone(),
            )
            .with_raw_content(answer),
        ];
        for (i, citation) in citations.iter().enumerate().skip(1) {
            results.push(SearchResult::new(
                format!("Perplexity Search, Source {}", i + 1),
                citation.clone(),
                "See above. The full answer covers this source.",
            ));
        }

        Ok(SearchResponse::new(results))
    }
}

fn request_error(message: String) -> SearchError {
    SearchError::Request {
        provider: "perplexity".to_string(),
        message,
    }
}

fn parse_error(message: String) -> SearchError {
    SearchError::ResponseParse {
        provider: "perplexity".to_string(),
        message,
    }
}
