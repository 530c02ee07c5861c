//! Session Loop
//!
//! Drives the request → parse → dispatch cycle under an iteration budget:
//!
//! ```text
//! INIT → OVERVIEW → ITERATING ⟳ → SYNTHESIZING → DONE
//!                        │              (budget exhausted path only)
//!                        └────────────→ DONE (model stopped requesting tools)
//! ```
//!
//! Tool-layer failures become conversation content and the loop continues;
//! only the overview fetch and model-completion calls can abort a session.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};

use crate::context::{build_context, AgentMode};
use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::parser::parse_tool_calls;
use crate::progress::{NullSink, ProgressEvent, ProgressSink};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::sanitize::clean_response;
use crate::session::{SessionState, ToolLogEntry};
use crate::tool::ToolRegistry;

/// Name of the registered overview operation fetched at session start
pub const OVERVIEW_TOOL: &str = "get_dataset_overview";

/// Session configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Generation options passed to every completion request
    pub generation: GenerationOptions,

    /// Maximum reasoning iterations before forcing synthesis. Model output
    /// is untrusted; without this bound the loop would be unbounded.
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            generation: GenerationOptions::default(),
            max_iterations: 3,
        }
    }
}

/// Result of one processed query
#[derive(Clone, Debug)]
pub struct QueryReport {
    /// Sanitized final answer
    pub answer: String,

    /// Mode the query ran under
    pub mode: AgentMode,

    /// Reasoning iterations consumed (model calls, excluding synthesis)
    pub iterations: usize,

    /// Every dispatched tool call, in order
    pub tool_log: Vec<ToolLogEntry>,
}

/// The orchestrator: owns nothing across queries, allocates fresh
/// [`SessionState`] per invocation.
pub struct AgentSession {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
    sink: Arc<dyn ProgressSink>,
}

impl AgentSession {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
            sink: Arc::new(NullSink),
        }
    }

    /// Replace the progress sink (defaults to a no-op)
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Process one query to a sanitized final answer.
    ///
    /// Strictly sequential: each model call and tool call blocks the session
    /// until it completes. There is no per-call timeout; callers wanting
    /// robustness against a hung backend should impose their own deadline.
    pub async fn process_query(&self, query: &str, mode: AgentMode) -> Result<QueryReport> {
        self.sink.notify(ProgressEvent::Started { mode });

        match self.run(query, mode).await {
            Ok(report) => {
                self.sink.notify(ProgressEvent::Completed);
                Ok(report)
            }
            Err(e) => {
                self.sink.notify(ProgressEvent::Failed {
                    error: e.user_message(),
                });
                Err(e)
            }
        }
    }

    async fn run(&self, query: &str, mode: AgentMode) -> Result<QueryReport> {
        let mut state = SessionState::new(mode);

        // OVERVIEW: always fetched fresh, fatal on failure, never retried
        self.sink.notify(ProgressEvent::FetchingOverview);
        let overview = self.fetch_overview().await?;
        state.messages = build_context(mode, query, &overview, &self.tools);

        let mut candidate: Option<String> = None;

        // ITERATING
        while state.iteration < self.config.max_iterations {
            state.iteration += 1;
            self.sink.notify(ProgressEvent::Iteration {
                current: state.iteration,
                max: self.config.max_iterations,
            });
            tracing::debug!(
                iteration = state.iteration,
                max = self.config.max_iterations,
                "Requesting model completion"
            );

            let started = Instant::now();
            let completion = self
                .provider
                .complete(&state.messages, &self.config.generation)
                .await?;
            self.sink.notify(ProgressEvent::ModelCompleted {
                elapsed_secs: started.elapsed().as_secs_f64(),
            });

            state.push(Message::assistant(&completion.content));

            let calls = parse_tool_calls(&completion.content);
            if calls.is_empty() {
                candidate = Some(completion.content);
                break;
            }

            for call in &calls {
                self.sink.notify(ProgressEvent::ToolStarted {
                    tool: call.tool.clone(),
                    parameters: call.parameters.clone(),
                });
                tracing::debug!(tool = %call.tool, "Dispatching tool call");

                let tool_started = Instant::now();
                let outcome = self.tools.dispatch(call).await;
                if outcome.is_failure() {
                    tracing::warn!(tool = %call.tool, summary = %outcome.summary(), "Tool call failed");
                }
                state.record_outcome(call, &outcome);

                self.sink.notify(ProgressEvent::ToolFinished {
                    tool: call.tool.clone(),
                    elapsed_secs: tool_started.elapsed().as_secs_f64(),
                });
            }
        }

        // SYNTHESIZING: budget exhausted without a tool-call-free turn
        let final_text = match candidate {
            Some(text) => text,
            None => {
                self.sink.notify(ProgressEvent::Synthesizing);
                state.push(Message::user(synthesis_request(&state)));

                let completion = self
                    .provider
                    .complete(&state.messages, &self.config.generation)
                    .await?;
                // Accepted unconditionally; sanitization handles any markup
                completion.content
            }
        };

        Ok(QueryReport {
            answer: clean_response(&final_text),
            mode,
            iterations: state.iteration,
            tool_log: state.tool_log,
        })
    }

    async fn fetch_overview(&self) -> Result<Value> {
        let tool = self
            .tools
            .get(OVERVIEW_TOOL)
            .ok_or_else(|| AgentError::OverviewFetch(format!("{OVERVIEW_TOOL} is not registered")))?;

        tool.execute(&Map::new())
            .await
            .map_err(|e| AgentError::OverviewFetch(e.to_string()))
    }

    /// Access the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Access the configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

fn synthesis_request(state: &SessionState) -> String {
    format!(
        "Based on all the data collected, please provide your final analysis and recommendations. \
         Be concise and direct. Focus on the most important insights and actionable recommendations.\n\n\
         Summary of tools used: {}",
        state.tools_used()
    )
}

/// Builder for [`AgentSession`]
pub struct AgentSessionBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl Default for AgentSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentSessionBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
            sink: None,
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<AgentSession> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        let mut session = AgentSession::new(provider, Arc::new(self.tools), self.config);
        if let Some(sink) = self.sink {
            session = session.with_sink(sink);
        }
        Ok(session)
    }
}
