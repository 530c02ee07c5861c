//! LLM Provider Strategy Pattern
//!
//! Common interface for model backends (OpenRouter, or anything
//! OpenAI-compatible) so the session loop never depends on a concrete API.
//! A completion is a single atomic request/response; streaming is not part
//! of the core contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "openai/gpt-4o-mini")
    pub model: String,

    /// Temperature for sampling. Kept low to favor determinism in analysis.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate. Unset by default; the backend's own
    /// limit applies and long analyses are never truncated locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.3
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "openai/gpt-4o-mini".into(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if the backend reports them)
    pub usage: Option<TokenUsage>,
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about a model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub context_length: Option<u32>,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new backends. The session loop
/// works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Check if the provider is reachable and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Generate a completion from an ordered message sequence
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion>;

    /// List available models
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    /// Estimate token count for text (provider-specific tokenization)
    fn estimate_tokens(&self, text: &str) -> u32 {
        // Default: rough estimate of ~4 chars per token
        (text.len() / 4) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert!((opts.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, None);
        assert_eq!(opts.model, "openai/gpt-4o-mini");
    }

    #[test]
    fn test_unset_max_tokens_not_serialized() {
        let json = serde_json::to_value(GenerationOptions::default()).unwrap();
        assert!(json.get("max_tokens").is_none());
    }
}
