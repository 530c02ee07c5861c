//! # agent-runtime
//!
//! Runtime providers for the PSU analysis agent.
//!
//! ## Providers
//!
//! - **OpenRouter** (default): OpenAI-compatible chat completions via
//!   openrouter.ai. Any backend exposing the same API (including a local
//!   gateway) works by overriding the base URL.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::OpenRouterProvider;
//!
//! let provider = OpenRouterProvider::from_env()?;
//! let agent = AgentSessionBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "openrouter")]
pub mod openrouter;

#[cfg(feature = "openrouter")]
pub use openrouter::{OpenRouterConfig, OpenRouterProvider};

// Re-export core types for convenience
pub use agent_core::{
    AgentError, AgentMode, AgentSession, LlmProvider, Message, Result, Role, ToolRegistry,
};
