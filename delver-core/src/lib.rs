//! # Delver Core
//!
//! Core library for the Delver deep-research agent. Provides the research
//! loop engine, LLM interface (brain), search backend strategies, source
//! normalization and credibility scoring, output recovery, report
//! assembly, configuration, and fundamental types.

pub mod brain;
pub mod config;
pub mod credibility;
pub mod engine;
pub mod error;
pub mod extract;
pub mod html;
pub mod normalize;
pub mod prompts;
pub mod providers;
pub mod report;
pub mod search;
pub mod state;
pub mod types;

// Re-export commonly used types at the crate root.
pub use brain::{InvokeOptions, LlmProvider, MockLlmProvider};
pub use config::{DelverConfig, LlmConfig, ResearchConfig};
pub use engine::ResearchEngine;
pub use error::{ConfigError, DelverError, LlmError, Result, SearchError};
pub use providers::OllamaProvider;
pub use search::SearchProvider;
pub use state::{ResearchPhase, ResearchState};
pub use types::{SearchResponse, SearchResult};
