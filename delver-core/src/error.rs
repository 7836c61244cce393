//! Error types for the Delver research core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering the LLM, search, and configuration domains. Backend and
//! configuration failures propagate to the run caller; malformed model
//! output is always recovered by the extraction fallback chain and never
//! appears here.

/// Top-level error type for the Delver core library.
#[derive(Debug, thiserror::Error)]
pub enum DelverError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from LLM provider interactions.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Errors from search backend interactions.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search request to {provider} failed: {message}")]
    Request { provider: String, message: String },

    #[error("Failed to parse {provider} response: {message}")]
    ResponseParse { provider: String, message: String },

    #[error("Missing API key for {provider}: env var '{var}' not set")]
    MissingApiKey { provider: String, var: String },

    #[error("No endpoint configured for {provider}")]
    MissingEndpoint { provider: String },

    #[error("Input must be a response object with 'results' or a list of them")]
    InvalidInputKind,
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported search API: {name}")]
    UnsupportedSearchApi { name: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },

    #[error("Environment variable not set: {var}")]
    EnvVarMissing { var: String },
}

/// Convenience result alias using [`DelverError`].
pub type Result<T> = std::result::Result<T, DelverError>;
