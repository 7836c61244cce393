//! Research engine — the loop-control state machine.
//!
//! One engine is built at startup and reused across runs. A run walks a
//! fixed pipeline: generate a query, search the web, summarize, reflect on
//! gaps, and route back to search or on to finalization once the loop
//! budget is spent. Backend failures abort the run; malformed model output
//! never does (the extraction chain always recovers a usable string).

use crate::brain::{InvokeOptions, LlmProvider};
use crate::config::DelverConfig;
use crate::credibility::rank_by_credibility;
use crate::error::{DelverError, Result};
use crate::extract::{ExtractMode, extract_string_field, strip_thinking_tokens};
use crate::normalize::{deduplicate_and_format_sources, format_sources};
use crate::prompts;
use crate::report::finalize_summary;
use crate::search::{self, SearchProvider};
use crate::state::{ResearchPhase, ResearchState};
use crate::types::SearchResponse;
use std::sync::Arc;
use tracing::info;

/// Routing decision after each reflection stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Continue,
    Finalize,
}

/// The research loop engine.
pub struct ResearchEngine {
    config: DelverConfig,
    llm: Arc<dyn LlmProvider>,
    search_override: Option<Arc<dyn SearchProvider>>,
}

impl ResearchEngine {
    /// Create a new engine over the given LLM backend.
    pub fn new(config: DelverConfig, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            config,
            llm,
            search_override: None,
        }
    }

    /// Replace the configured search backend with an explicit provider.
    /// Used by tests to inject scripted search results.
    pub fn with_search_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.search_override = Some(provider);
        self
    }

    /// Run the full research loop for a topic and return the finalized,
    /// citation-appended report.
    pub async fn run(&self, topic: &str) -> Result<String> {
        let mut state = ResearchState::new(topic);
        info!(topic, "starting research run");

        self.generate_query(&mut state).await?;
        loop {
            self.web_research(&mut state).await?;
            self.summarize(&mut state).await?;
            self.reflect(&mut state).await?;
            if self.route(&state) == Route::Finalize {
                break;
            }
        }

        state.transition(ResearchPhase::Finalize);
        let report = finalize_summary(&state);
        state.transition(ResearchPhase::Complete);
        info!(
            loops = state.research_loop_count,
            "research run complete"
        );
        Ok(report)
    }

    /// Generate the initial search query from the topic.
    async fn generate_query(&self, state: &mut ResearchState) -> Result<()> {
        state.transition(ResearchPhase::GenerateQuery);
        info!(topic = %state.research_topic, "generating initial search query");

        let system = prompts::query_writer_instructions(
            &state.research_topic,
            &prompts::get_current_date(),
        );
        let raw = self
            .llm
            .invoke(&system, prompts::QUERY_WRITER_REQUEST, InvokeOptions::json())
            .await?;

        state.search_query = extract_string_field(
            &raw,
            "query",
            &state.research_topic,
            self.config.research.strip_thinking_tokens,
            ExtractMode::QueryGeneration,
        );
        info!(query = %state.search_query, "search query ready");
        Ok(())
    }

    /// Run one search iteration: dispatch the configured backend, normalize
    /// and record the results, and bump the loop counter.
    async fn web_research(&self, state: &mut ResearchState) -> Result<()> {
        state.transition(ResearchPhase::WebResearch);
        info!(
            loop_number = state.research_loop_count + 1,
            query = %state.search_query,
            "searching the web"
        );

        let research = &self.config.research;
        let (mut response, search_text) = self.execute_search(&state.search_query).await?;

        // The loop counter advances whether or not the search found
        // anything; an empty iteration still spends budget.
        state.research_loop_count += 1;

        if research.enable_source_verification {
            info!("assessing source credibility");
            rank_by_credibility(&mut response.results);
        }

        info!(found = response.results.len(), "search completed");
        state.sources_gathered.push(format_sources(&response));
        state.web_research_results.push(search_text);
        Ok(())
    }

    /// Call the configured search backend and normalize its output.
    ///
    /// DuckDuckGo is the parallel-capable path: the query fans out across
    /// all enabled engines concurrently and the responses are merged by the
    /// normalizer. The other backends are synchronous single-shot calls.
    /// An unknown backend name is a fatal configuration error.
    async fn execute_search(&self, query: &str) -> Result<(SearchResponse, String)> {
        let research = &self.config.research;

        if let Some(provider) = &self.search_override {
            let response = provider
                .search(query, research.max_sources_per_loop, research.fetch_full_page)
                .await?;
            let text = deduplicate_and_format_sources(
                &response.clone().into(),
                research.max_tokens_per_source,
                research.fetch_full_page,
            );
            return Ok((response, text));
        }

        if research.search_api == "duckduckgo" {
            let engines: Vec<Arc<dyn SearchProvider>> =
                vec![Arc::new(search::DuckDuckGoProvider::new())];
            let responses = search::parallel_search(
                &engines,
                query,
                research.max_sources_per_loop,
                research.fetch_full_page,
            )
            .await;
            let text = deduplicate_and_format_sources(
                &responses.clone().into(),
                research.max_tokens_per_source,
                research.fetch_full_page,
            );
            let merged = SearchResponse::new(
                responses.into_iter().flat_map(|r| r.results).collect(),
            );
            return Ok((merged, text));
        }

        let provider = search::dispatch(research).map_err(DelverError::Config)?;
        let response = provider
            .search(query, research.max_sources_per_loop, research.fetch_full_page)
            .await?;
        let text = deduplicate_and_format_sources(
            &response.clone().into(),
            research.max_tokens_per_source,
            research.fetch_full_page,
        );
        Ok((response, text))
    }

    /// Create or extend the running summary from the newest search results.
    async fn summarize(&self, state: &mut ResearchState) -> Result<()> {
        state.transition(ResearchPhase::Summarize);
        if state.running_summary.is_empty() {
            info!("creating initial summary");
        } else {
            info!("updating existing summary with new findings");
        }

        let human = prompts::summarize_human_message(state);
        let raw = self
            .llm
            .invoke(prompts::SUMMARIZER_INSTRUCTIONS, &human, InvokeOptions::text())
            .await?;

        state.running_summary = if self.config.research.strip_thinking_tokens {
            strip_thinking_tokens(&raw)
        } else {
            raw
        };
        info!(chars = state.running_summary.len(), "summary updated");
        Ok(())
    }

    /// Identify a knowledge gap and set the follow-up query.
    async fn reflect(&self, state: &mut ResearchState) -> Result<()> {
        state.transition(ResearchPhase::Reflect);
        info!("reflecting on current knowledge");

        let system = prompts::reflection_instructions(&state.research_topic);
        let human = prompts::reflection_human_message(&state.running_summary);
        let raw = self.llm.invoke(&system, &human, InvokeOptions::json()).await?;

        let fallback = format!("{} detailed analysis", state.research_topic);
        state.search_query = extract_string_field(
            &raw,
            "follow_up_query",
            &fallback,
            self.config.research.strip_thinking_tokens,
            ExtractMode::Reflection,
        );
        info!(query = %state.search_query, "follow-up query ready");
        Ok(())
    }

    /// Decide whether to loop back to search or finalize.
    ///
    /// The comparison is `<=` against the already-incremented loop count:
    /// a budget of `N` runs `N + 1` search iterations.
    fn route(&self, state: &ResearchState) -> Route {
        if state.research_loop_count <= self.config.research.max_web_research_loops {
            Route::Continue
        } else {
            Route::Finalize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::MockLlmProvider;
    use crate::error::SearchError;
    use crate::types::SearchResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Search provider that serves the same results every call and counts
    /// invocations.
    struct ScriptedSearch {
        results: Vec<SearchResult>,
        calls: AtomicUsize,
    }

    impl ScriptedSearch {
        fn new(results: Vec<SearchResult>) -> Self {
            Self {
                results,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for ScriptedSearch {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn search(
            &self,
            _query: &str,
            _max_results: usize,
            _fetch_full_page: bool,
        ) -> std::result::Result<SearchResponse, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SearchResponse::new(self.results.clone()))
        }
    }

    fn engine_with(
        max_loops: u32,
        search: Arc<ScriptedSearch>,
        llm: MockLlmProvider,
    ) -> ResearchEngine {
        let mut config = DelverConfig::default();
        config.research.max_web_research_loops = max_loops;
        ResearchEngine::new(config, Arc::new(llm)).with_search_provider(search)
    }

    #[tokio::test]
    async fn test_loop_budget_runs_max_plus_one_iterations() {
        let search = Arc::new(ScriptedSearch::new(vec![SearchResult::new(
            "A", "u1", "c",
        )]));
        let llm = MockLlmProvider::new([r#"{"query": "q0"}"#])
            .with_fallback(r#"{"follow_up_query": "next"}"#);

        let engine = engine_with(2, Arc::clone(&search), llm);
        engine.run("topic").await.unwrap();

        // Budget 2 means the `<=` route lets loop counts 1 and 2 continue,
        // so three searches run before finalizing.
        assert_eq!(search.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_state_accumulators_stay_in_lockstep() {
        let search = Arc::new(ScriptedSearch::new(vec![SearchResult::new(
            "A", "u1", "c",
        )]));
        let llm = MockLlmProvider::new([r#"{"query": "q0"}"#])
            .with_fallback(r#"{"follow_up_query": "next"}"#);

        let engine = engine_with(0, Arc::clone(&search), llm);
        let report = engine.run("topic").await.unwrap();

        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert!(report.starts_with("## Summary\n"));
    }

    #[tokio::test]
    async fn test_malformed_llm_output_never_aborts() {
        let search = Arc::new(ScriptedSearch::new(vec![SearchResult::new(
            "A", "u1", "c",
        )]));
        // Nothing the model returns here is valid JSON.
        let llm = MockLlmProvider::new(["not json at all"]).with_fallback("still not json");

        let engine = engine_with(0, Arc::clone(&search), llm);
        let report = engine.run("rustc internals").await.unwrap();
        assert!(report.contains("### Sources:"));
    }

    #[tokio::test]
    async fn test_sources_deduplicated_across_loops() {
        let search = Arc::new(ScriptedSearch::new(vec![
            SearchResult::new("A", "u1", "c"),
            SearchResult::new("B", "u2", "c"),
        ]));
        let llm = MockLlmProvider::new([r#"{"query": "q0"}"#])
            .with_fallback(r#"{"follow_up_query": "next"}"#);

        let engine = engine_with(1, Arc::clone(&search), llm);
        let report = engine.run("topic").await.unwrap();

        // The same sources arrive every loop but appear once in the report.
        assert_eq!(report.matches("* A : u1").count(), 1);
        assert_eq!(report.matches("* B : u2").count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_search_api_is_fatal() {
        let mut config = DelverConfig::default();
        config.research.search_api = "askjeeves".to_string();
        config.research.max_web_research_loops = 0;
        let llm = MockLlmProvider::new([r#"{"query": "q0"}"#]);

        let engine = ResearchEngine::new(config, Arc::new(llm));
        let err = engine.run("topic").await.unwrap_err();
        assert!(matches!(err, DelverError::Config(_)));
    }

    #[tokio::test]
    async fn test_empty_results_still_spend_budget() {
        let search = Arc::new(ScriptedSearch::new(vec![]));
        let llm = MockLlmProvider::new([r#"{"query": "q0"}"#])
            .with_fallback(r#"{"follow_up_query": "next"}"#);

        let engine = engine_with(1, Arc::clone(&search), llm);
        engine.run("topic").await.unwrap();
        assert_eq!(search.calls.load(Ordering::SeqCst), 2);
    }
}
