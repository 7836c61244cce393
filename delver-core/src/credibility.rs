//! Heuristic source credibility scoring.
//!
//! Advisory only: scores reorder an iteration's results so the summarizer
//! sees the most trustworthy sources first. They never filter results and
//! are not persisted into the final report.

use crate::types::SearchResult;
use std::cmp::Ordering;

/// Domains that earn the trusted-domain bonus (substring match on the URL).
const TRUSTED_DOMAINS: [&str; 5] = [
    "wikipedia.org",
    "edu",
    "gov",
    "nature.com",
    "sciencedirect.com",
];

/// Content vocabulary that suggests substantive material.
const QUALITY_TOKENS: [&str; 3] = ["research", "study", "analysis"];

const SUBSTANTIAL_CONTENT_CHARS: usize = 500;

/// Score a source's credibility in `[0.0, 1.0]`.
///
/// Base score 0.5; +0.3 for a trusted domain in the URL, +0.1 for content
/// longer than 500 characters, +0.1 for research vocabulary in the content.
/// Each bonus applies at most once; the total is capped at 1.0. Pure: no
/// network calls, no state.
pub fn assess_source_credibility(url: &str, _title: &str, content: &str) -> f64 {
    let mut score: f64 = 0.5;

    let url_lower = url.to_lowercase();
    if TRUSTED_DOMAINS.iter().any(|d| url_lower.contains(d)) {
        score += 0.3;
    }

    if content.len() > SUBSTANTIAL_CONTENT_CHARS {
        score += 0.1;
    }
    let content_lower = content.to_lowercase();
    if QUALITY_TOKENS.iter().any(|t| content_lower.contains(t)) {
        score += 0.1;
    }

    score.min(1.0)
}

/// Attach credibility scores to every result and re-sort the slice
/// descending by score. The sort is stable: ties keep their prior relative
/// order, and results without a score sort as 0.5.
pub fn rank_by_credibility(results: &mut [SearchResult]) {
    for result in results.iter_mut() {
        result.credibility_score = Some(assess_source_credibility(
            &result.url,
            &result.title,
            &result.content,
        ));
    }
    results.sort_by(|a, b| {
        let sb = b.credibility_score.unwrap_or(0.5);
        let sa = a.credibility_score.unwrap_or(0.5);
        sb.partial_cmp(&sa).unwrap_or(Ordering::Equal)
    });
}
