//! LLM provider implementations.
//!
//! One concrete provider covers Ollama and any other endpoint that speaks
//! the OpenAI chat-completions format (vLLM, LM Studio, OpenAI itself).

pub mod ollama;

pub use ollama::OllamaProvider;
