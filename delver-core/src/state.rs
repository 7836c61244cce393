//! Mutable state for a single research run.

use serde::{Deserialize, Serialize};

/// Phase of the research state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchPhase {
    GenerateQuery,
    WebResearch,
    Summarize,
    Reflect,
    Finalize,
    Complete,
}

/// State owned by the research engine for the lifetime of one run.
///
/// Mutated exclusively by the engine's stages. After each completed search
/// iteration, `sources_gathered`, `web_research_results`, and
/// `research_loop_count` grow in lockstep: one formatted source block and
/// one merged-results block per loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchState {
    /// The topic being researched, as supplied by the caller.
    pub research_topic: String,
    /// The query the next web-research stage will run.
    pub search_query: String,
    /// Number of completed search iterations.
    pub research_loop_count: u32,
    /// One bullet-list source block per iteration, in iteration order.
    pub sources_gathered: Vec<String>,
    /// One normalized search-text block per iteration, in iteration order.
    pub web_research_results: Vec<String>,
    /// The cumulative narrative summary, replaced each summarize stage.
    pub running_summary: String,
    /// Current phase, for progress reporting.
    pub phase: ResearchPhase,
}

impl ResearchState {
    /// Create fresh state for a topic. The initial query defaults to the
    /// topic itself until the query-generation stage replaces it.
    pub fn new(topic: impl Into<String>) -> Self {
        let topic = topic.into();
        Self {
            search_query: topic.clone(),
            research_topic: topic,
            research_loop_count: 0,
            sources_gathered: Vec::new(),
            web_research_results: Vec::new(),
            running_summary: String::new(),
            phase: ResearchPhase::GenerateQuery,
        }
    }

    /// Move to the next phase, logging the transition.
    pub fn transition(&mut self, phase: ResearchPhase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "phase transition");
        self.phase = phase;
    }
}
