//! DuckDuckGo search backend.
//!
//! Scrapes the HTML results endpoint (no API key required). This is the
//! parallel-capable backend: full-page content for the result set is
//! fetched concurrently, with each fetched page mapped back to its result
//! by index. A scrape failure degrades to an empty result set rather than
//! aborting the research run.

use super::SearchProvider;
use crate::error::SearchError;
use crate::html::html_to_text;
use crate::types::{SearchResponse, SearchResult};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::warn;

const SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; Delver/0.1)";
/// Per-request timeout, applied to the search call and to each full-page
/// fetch independently.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Default)]
pub struct DuckDuckGoProvider;

impl DuckDuckGoProvider {
    pub fn new() -> Self {
        Self
    }

    async fn run_search(
        &self,
        query: &str,
        max_results: usize,
        fetch_full_page: bool,
    ) -> Result<SearchResponse, SearchError> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| request_error(e.to_string()))?;

        let url = format!("{SEARCH_ENDPOINT}?q={}", urlencoding::encode(query));
        let body = client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error(e.to_string()))?
            .error_for_status()
            .map_err(|e| request_error(e.to_string()))?
            .text()
            .await
            .map_err(|e| request_error(e.to_string()))?;

        let mut results = parse_results(&body, max_results);

        if fetch_full_page {
            // Fan out one fetch per result; pages come back mapped to their
            // originating result by index, not by completion order.
            let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
            let fetches = urls.iter().map(|u| fetch_raw_content(&client, u));
            let pages = futures::future::join_all(fetches).await;

            for (result, page) in results.iter_mut().zip(pages) {
                result.raw_content = Some(match page {
                    Some(text) => text,
                    None => {
                        warn!(url = %result.url, "full page fetch failed, using snippet");
                        result.content.clone()
                    }
                });
            }
        } else {
            for result in results.iter_mut() {
                result.raw_content = Some(result.content.clone());
            }
        }

        Ok(SearchResponse::new(results))
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
        fetch_full_page: bool,
    ) -> Result<SearchResponse, SearchError> {
        match self.run_search(query, max_results, fetch_full_page).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(error = %e, "duckduckgo search failed, returning no results");
                Ok(SearchResponse::default())
            }
        }
    }
}

fn request_error(message: String) -> SearchError {
    SearchError::Request {
        provider: "duckduckgo".to_string(),
        message,
    }
}

/// Extract up to `max_results` results from the HTML results page.
/// Results missing a title, link, or snippet are skipped.
fn parse_results(body: &str, max_results: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(body);
    let result_sel = Selector::parse(".result").expect("result selector");
    let title_sel = Selector::parse("a.result__a").expect("title selector");
    let snippet_sel = Selector::parse(".result__snippet").expect("snippet selector");

    let mut results = Vec::new();
    for element in document.select(&result_sel) {
        if results.len() >= max_results {
            break;
        }

        let Some(anchor) = element.select(&title_sel).next() else {
            warn!("skipping result without a title link");
            continue;
        };
        let title = anchor.text().collect::<String>().trim().to_string();
        let href = anchor.value().attr("href").unwrap_or_default();
        let content = element
            .select(&snippet_sel)
            .next()
            .map(|s| s.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        if title.is_empty() || href.is_empty() || content.is_empty() {
            warn!("skipping incomplete search result");
            continue;
        }

        results.push(SearchResult::new(title, resolve_redirect(href), content));
    }
    results
}

/// Unwrap DuckDuckGo's `/l/?uddg=<target>` redirect links to the real URL.
fn resolve_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    if let Ok(parsed) = url::Url::parse(&absolute) {
        if parsed.domain().is_some_and(|d| d.ends_with("duckduckgo.com")) {
            if let Some((_, target)) = parsed.query_pairs().find(|(k, _)| k == "uddg") {
                return target.into_owned();
            }
        }
        return absolute;
    }
    href.to_string()
}

/// Fetch a page and convert it to text, bounded by [`FETCH_TIMEOUT`].
/// Any failure yields `None`; the caller degrades to the snippet.
async fn fetch_raw_content(client: &Client, url: &str) -> Option<String> {
    let fetch = async {
        let response = client.get(url).send().await.ok()?.error_for_status().ok()?;
        let body = response.text().await.ok()?;
        Some(html_to_text(&body))
    };
    tokio::time::timeout(FETCH_TIMEOUT, fetch).await.ok().flatten()
}
