//! Configuration system for Delver.
//!
//! Uses `figment` for layered configuration: struct defaults -> `delver.toml`
//! -> `DELVER_*` environment variables. Nested fields use `__` in env names,
//! e.g. `DELVER_RESEARCH__MAX_WEB_RESEARCH_LOOPS=5`.

use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE: &str = "delver.toml";

/// Top-level configuration for a Delver run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DelverConfig {
    pub llm: LlmConfig,
    pub research: ResearchConfig,
}

/// LLM connection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat endpoint (Ollama by default).
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key. Local providers work
    /// without one.
    pub api_key_env: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "llama3.1:8b".to_string(),
            api_key_env: "DELVER_LLM_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Research loop parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Loop budget: the routing stage continues while the completed-loop
    /// count is `<=` this value, so `N` budgets `N + 1` search iterations.
    pub max_web_research_loops: u32,
    /// Search backend name: "duckduckgo", "tavily", "perplexity", "searxng".
    /// Validated at dispatch; an unknown name is a fatal configuration error.
    pub search_api: String,
    /// Maximum results requested per search call.
    pub max_sources_per_loop: usize,
    /// Cap on full-page content per source, in tokens (4-chars-per-token
    /// estimate).
    pub max_tokens_per_source: usize,
    /// Fetch full page content for each result instead of snippets only.
    pub fetch_full_page: bool,
    /// Score sources for credibility and reorder each iteration's results.
    pub enable_source_verification: bool,
    /// Strip `<think>` reasoning spans from model output.
    pub strip_thinking_tokens: bool,
    /// SearXNG instance URL, required when `search_api = "searxng"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searxng_endpoint: Option<String>,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_web_research_loops: 3,
            search_api: "duckduckgo".to_string(),
            max_sources_per_loop: 3,
            max_tokens_per_source: 1000,
            fetch_full_page: false,
            enable_source_verification: false,
            strip_thinking_tokens: true,
            searxng_endpoint: None,
        }
    }
}

impl DelverConfig {
    /// Load layered configuration: defaults, then the TOML file (the given
    /// path, or `delver.toml` if present), then `DELVER_*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(DelverConfig::default()));
        figment = match path {
            Some(p) => figment.merge(Toml::file(p)),
            None => figment.merge(Toml::file(CONFIG_FILE)),
        };
        figment
            .merge(Env::prefixed("DELVER_").split("__"))
            .extract()
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
    }
}
