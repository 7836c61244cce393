//! Search backend strategies.
//!
//! Each provider implements the same single capability: query in, list of
//! {title, url, content, raw_content} out. The backend is selected by its
//! configured name at the point of dispatch; exactly one backend
//! (DuckDuckGo) supports internal concurrent fan-out and per-result
//! full-page fetching, the rest are synchronous single-shot calls.

pub mod duckduckgo;
pub mod perplexity;
pub mod searxng;
pub mod tavily;

use crate::config::ResearchConfig;
use crate::error::{ConfigError, SearchError};
use crate::types::SearchResponse;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub use duckduckgo::DuckDuckGoProvider;
pub use perplexity::PerplexityProvider;
pub use searxng::SearxngProvider;
pub use tavily::TavilyProvider;

/// Trait for search backends.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Backend name, matching its configuration value.
    fn name(&self) -> &'static str;

    /// Run one search and return its results.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        fetch_full_page: bool,
    ) -> Result<SearchResponse, SearchError>;
}

/// Construct the provider for the configured backend name.
///
/// Unknown names are a fatal configuration error, raised here at the point
/// of dispatch.
pub fn dispatch(config: &ResearchConfig) -> Result<Box<dyn SearchProvider>, ConfigError> {
    match config.search_api.as_str() {
        "duckduckgo" => Ok(Box::new(DuckDuckGoProvider::new())),
        "tavily" => Ok(Box::new(TavilyProvider::new())),
        "perplexity" => Ok(Box::new(PerplexityProvider::new())),
        "searxng" => Ok(Box::new(SearxngProvider::new(
            config.searxng_endpoint.clone(),
        ))),
        other => Err(ConfigError::UnsupportedSearchApi {
            name: other.to_string(),
        }),
    }
}

/// Fan out one query across several engines concurrently and collect each
/// engine's response.
///
/// All engine tasks are awaited together (join semantics, no partial-result
/// race) and the responses come back in engine order, not completion order.
/// An engine that fails is logged and contributes nothing; it never fails
/// the fan-out.
pub async fn parallel_search(
    engines: &[Arc<dyn SearchProvider>],
    query: &str,
    max_results: usize,
    fetch_full_page: bool,
) -> Vec<SearchResponse> {
    info!(query, engines = engines.len(), "starting parallel search");

    let tasks = engines
        .iter()
        .map(|engine| engine.search(query, max_results, fetch_full_page));
    let outcomes = futures::future::join_all(tasks).await;

    let mut responses = Vec::with_capacity(engines.len());
    for (engine, outcome) in engines.iter().zip(outcomes) {
        match outcome {
            Ok(response) => responses.push(response),
            Err(e) => warn!(engine = engine.name(), error = %e, "search engine failed"),
        }
    }

    let total: usize = responses.iter().map(|r| r.results.len()).sum();
    info!(total, "parallel search completed");
    responses
}
