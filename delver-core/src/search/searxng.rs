//! SearXNG search backend.
//!
//! Synchronous single-shot calls against a self-hosted SearXNG instance's
//! JSON API. Snippets only; full-page content is not available from this
//! backend, so the normalizer degrades to snippets in full-page mode.

use super::SearchProvider;
use crate::error::SearchError;
use crate::types::{SearchResponse, SearchResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub struct SearxngProvider {
    endpoint: Option<String>,
}

#[derive(Deserialize)]
struct SearxngPayload {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

#[derive(Deserialize)]
struct SearxngResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl SearxngProvider {
    /// The endpoint comes from configuration; its absence only becomes an
    /// error when a search is actually attempted.
    pub fn new(endpoint: Option<String>) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl SearchProvider for SearxngProvider {
    fn name(&self) -> &'static str {
        "searxng"
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
        _fetch_full_page: bool,
    ) -> Result<SearchResponse, SearchError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| SearchError::MissingEndpoint {
                provider: "searxng".to_string(),
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| request_error(e.to_string()))?;

        let payload: SearxngPayload = client
            .get(format!("{}/search", endpoint.trim_end_matches('/')))
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(|e| request_error(e.to_string()))?
            .error_for_status()
            .map_err(|e| request_error(e.to_string()))?
            .json()
            .await
            .map_err(|e| SearchError::ResponseParse {
                provider: "searxng".to_string(),
                message: e.to_string(),
            })?;

        let results = payload
            .results
            .into_iter()
            .filter(|r| !r.title.is_empty() && !r.url.is_empty())
            .take(max_results)
            .map(|r| SearchResult::new(r.title, r.url, r.content))
            .collect();
        Ok(SearchResponse::new(results))
    }
}

fn request_error(message: String) -> SearchError {
    SearchError::Request {
        provider: "searxng".to_string(),
        message,
    }
}
