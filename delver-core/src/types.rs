//! Fundamental types shared across the research pipeline.

use serde::{Deserialize, Serialize};

/// A single web source discovered during research.
///
/// Sources are identified by their `url` (exact, case-sensitive match);
/// all deduplication in the pipeline keys on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title as reported by the search engine.
    pub title: String,
    /// Source URL. Identity key for deduplication.
    pub url: String,
    /// Snippet or summary of the page content.
    pub content: String,
    /// Full page content, when the backend fetched it. `None` when the
    /// backend only returns snippets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
    /// Heuristic trust score in `[0.0, 1.0]`, attached by the credibility
    /// scorer for within-iteration ordering. Never persisted into reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credibility_score: Option<f64>,
}

impl SearchResult {
    /// Build a snippet-only result (no full page content, no score).
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            raw_content: None,
            credibility_score: None,
        }
    }

    /// Attach full page content.
    pub fn with_raw_content(mut self, raw: impl Into<String>) -> Self {
        self.raw_content = Some(raw.into());
        self
    }
}

/// Response from a single search backend call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

impl SearchResponse {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self { results }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_builder() {
        let r = SearchResult::new("Title", "https://example.com", "snippet")
            .with_raw_content("full page");
        assert_eq!(r.url, "https://example.com");
        assert_eq!(r.raw_content.as_deref(), Some("full page"));
        assert!(r.credibility_score.is_none());
    }

    #[test]
    fn test_optional_fields_absent_in_json() {
        let r = SearchResult::new("T", "u", "c");
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("raw_content"));
        assert!(!json.contains("credibility_score"));
    }
}
