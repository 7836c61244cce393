//! Tavily search backend.
//!
//! Synchronous single-shot calls against the Tavily REST API. Supports
//! server-side raw page content via `include_raw_content`, so no local
//! full-page fetching is needed.

use super::SearchProvider;
use crate::error::SearchError;
use crate::types::SearchResponse;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const API_ENDPOINT: &str = "https://api.tavily.com/search";
const API_KEY_VAR: &str = "TAVILY_API_KEY";

#[derive(Default)]
pub struct TavilyProvider;

impl TavilyProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    fn name(&self) -> &'static str {
        "tavily"
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
        fetch_full_page: bool,
    ) -> Result<SearchResponse, SearchError> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| SearchError::MissingApiKey {
            provider: "tavily".to_string(),
            var: API_KEY_VAR.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| request_error(e.to_string()))?;

        let body = json!({
            "api_key": api_key,
            "query": query,
            "max_results": max_results,
            "include_raw_content": fetch_full_page,
        });

        let response = client
            .post(API_ENDPOINT)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(e.to_string()))?
            .error_for_status()
            .map_err(|e| request_error(e.to_string()))?;

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| parse_error(e.to_string()))?;

        // Tavily's result objects carry title/url/content/raw_content
        // directly; null raw_content deserializes to None.
        let results = payload
            .get("results")
            .cloned()
            .ok_or_else(|| parse_error("missing 'results' field".to_string()))?;
        serde_json::from_value(results)
            .map(SearchResponse::new)
            .map_err(|e| parse_error(e.to_string()))
    }
}

fn request_error(message: String) -> SearchError {
    SearchError::Request {
        provider: "tavily".to_string(),
        message,
    }
}

fn parse_error(message: String) -> SearchError {
    SearchError::ResponseParse {
        provider: "tavily".to_string(),
        message,
    }
}
