//! LLM access: OpenAI client, prompt templates and the model traits the
//! chains are written against.

mod client;
mod error;
mod prompt;

pub use client::OpenAiClient;
pub use error::{LlmError, Result};
pub use prompt::{LlmChain, Prompt, Prompts};

/// A text completion model.
pub trait LanguageModel {
    /// Complete a single prompt.
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// A text embedding model.
pub trait Embedder {
    /// Embed each text, preserving order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
