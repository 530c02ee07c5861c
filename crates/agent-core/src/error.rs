//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
///
/// Tool-layer failures (unknown tool, tool execution error) are deliberately
/// NOT variants here: they are converted into conversation content so the
/// model can adapt. Only provider and overview-fetch failures abort a session.
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error (fatal for the session)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Dataset-overview fetch failed at session start (fatal, not retried)
    #[error("Overview fetch failed: {0}")]
    OverviewFetch(String),

    /// Tool not found in registry (used by direct registry execution,
    /// never escapes the session loop)
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Plain descriptive string for callers and displays. Never a stack trace.
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Provider(msg) | AgentError::ProviderUnavailable(msg) => {
                format!("Error processing query: {msg}")
            }
            AgentError::OverviewFetch(msg) => {
                format!("Error processing query: {msg}")
            }
            AgentError::ToolNotFound(name) => format!("The tool '{name}' is not available."),
            AgentError::ToolExecution(msg) => format!("Tool error: {msg}"),
            AgentError::Config(msg) => format!("Configuration error: {msg}"),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Other(err.to_string())
    }
}
