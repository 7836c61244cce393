//! Source normalization: merge, deduplicate, and format raw search output.
//!
//! Search backends return either one response or a batch of them (the
//! parallel fan-out path). This module flattens whatever arrives, drops
//! duplicate URLs keeping the first occurrence, and renders the survivors
//! into the text block the summarizer consumes.

use crate::error::SearchError;
use crate::types::{SearchResponse, SearchResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// One search response or several, flattened in arrival order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResponses {
    Single(SearchResponse),
    Many(Vec<SearchResponse>),
}

impl SearchResponses {
    /// Parse an untyped JSON value into a response set.
    ///
    /// Accepts an object with a `results` field or a list of such objects;
    /// anything else is an [`SearchError::InvalidInputKind`].
    pub fn from_value(value: serde_json::Value) -> Result<Self, SearchError> {
        serde_json::from_value(value).map_err(|_| SearchError::InvalidInputKind)
    }

    /// Iterate all results across the contained responses, in order.
    pub fn results(&self) -> impl Iterator<Item = &SearchResult> {
        let responses: &[SearchResponse] = match self {
            SearchResponses::Single(r) => std::slice::from_ref(r),
            SearchResponses::Many(rs) => rs.as_slice(),
        };
        responses.iter().flat_map(|r| r.results.iter())
    }
}

impl From<SearchResponse> for SearchResponses {
    fn from(response: SearchResponse) -> Self {
        SearchResponses::Single(response)
    }
}

impl From<Vec<SearchResponse>> for SearchResponses {
    fn from(responses: Vec<SearchResponse>) -> Self {
        SearchResponses::Many(responses)
    }
}

/// Deduplicate results by URL, keeping the first occurrence in arrival
/// order, and return the surviving unique sources.
pub fn deduplicate_by_url(responses: &SearchResponses) -> Vec<&SearchResult> {
    let mut seen = HashSet::new();
    responses
        .results()
        .filter(|r| seen.insert(r.url.as_str()))
        .collect()
}

/// Format and deduplicate search responses into a structured text block.
///
/// Each unique source contributes its title, URL, and content excerpt.
/// When `fetch_full_page` is set, the raw page content is appended,
/// truncated to `max_tokens_per_source * 4` characters (rough 4-chars-per-
/// token estimate) with an explicit truncation marker. A source missing
/// raw content degrades to its short `content` field with a warning.
pub fn deduplicate_and_format_sources(
    responses: &SearchResponses,
    max_tokens_per_source: usize,
    fetch_full_page: bool,
) -> String {
    let unique = deduplicate_by_url(responses);

    let mut formatted = String::from("Sources:\n\n");
    for source in unique {
        formatted.push_str(&format!("Source: {}\n===\n", source.title));
        formatted.push_str(&format!("URL: {}\n===\n", source.url));
        formatted.push_str(&format!(
            "Most relevant content from source: {}\n===\n",
            source.content
        ));
        if fetch_full_page {
            let char_limit = max_tokens_per_source * 4;
            let raw = match source.raw_content.as_deref() {
                Some(raw) => raw,
                None => {
                    warn!(url = %source.url, "no raw_content for source, using snippet");
                    source.content.as_str()
                }
            };
            let limited = truncate_chars(raw, char_limit);
            formatted.push_str(&format!(
                "Full source content limited to {max_tokens_per_source} tokens: {limited}\n\n"
            ));
        }
    }
    formatted.trim().to_string()
}

/// Format search results into a bullet list of `* title : url` lines,
/// one per result, in result order.
pub fn format_sources(response: &SearchResponse) -> String {
    response
        .results
        .iter()
        .map(|source| format!("* {} : {}", source.title, source.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to at most `limit` characters, appending a marker when
/// anything was cut. Respects char boundaries.
fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let cut: String = text.chars().take(limit).collect();
        format!("{cut}... [truncated]")
    } else {
        text.to_string()
    }
}
