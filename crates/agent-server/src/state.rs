//! Application State

use std::sync::Arc;

use agent_core::{
    AgentConfig, AgentSession, LlmProvider, ProgressSink, ToolRegistry,
};
use psu_advisor::AnalysisToolkit;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// LLM provider (OpenRouter, etc.)
    pub provider: Arc<dyn LlmProvider>,

    /// Tool registry with the full analysis catalogue
    pub tools: Arc<ToolRegistry>,

    /// Analytics toolkit, for direct dataset endpoints
    pub toolkit: AnalysisToolkit,

    /// Base session configuration (model, temperature, iteration budget)
    pub config: AgentConfig,
}

impl AppState {
    /// Build a fresh session for one query. Sessions own no cross-query
    /// state; the registry and provider are shared behind `Arc`s.
    pub fn session(
        &self,
        model_override: Option<String>,
        sink: Option<Arc<dyn ProgressSink>>,
    ) -> AgentSession {
        let mut config = self.config.clone();
        if let Some(model) = model_override {
            config.generation.model = model;
        }

        let mut session = AgentSession::new(self.provider.clone(), self.tools.clone(), config);
        if let Some(sink) = sink {
            session = session.with_sink(sink);
        }
        session
    }
}
