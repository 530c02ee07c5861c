//! Per-Query Session State
//!
//! Created for one query invocation, owned exclusively by the session loop,
//! and discarded when the call returns. Nothing here persists across
//! queries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::context::AgentMode;
use crate::message::Message;
use crate::tool::{ToolCallRequest, ToolOutcome};

/// One entry in the session's tool log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolLogEntry {
    /// Call ID carried over from the parsed request, correlating log
    /// entries with progress events
    pub id: Option<String>,
    pub tool: String,
    pub parameters: Map<String, Value>,
    pub summary: String,
}

/// Mutable state for a single query invocation
#[derive(Debug)]
pub struct SessionState {
    /// Delivery mode for this query
    pub mode: AgentMode,

    /// Completed reasoning iterations, bounded by the configured maximum
    pub iteration: usize,

    /// Monotonically growing conversation history
    pub messages: Vec<Message>,

    /// Last outcome per entity (PSU or sector name), keyed by whichever of
    /// `psu_name`/`sector` the call's parameters carried. Last-write-wins
    /// and lossy when a call supplies neither or both keys; treat as a
    /// heuristic, not a guaranteed aggregation.
    pub collected: HashMap<String, Value>,

    /// Ordered record of every dispatched call
    pub tool_log: Vec<ToolLogEntry>,
}

impl SessionState {
    pub fn new(mode: AgentMode) -> Self {
        Self {
            mode,
            iteration: 0,
            messages: Vec::new(),
            collected: HashMap::new(),
            tool_log: Vec::new(),
        }
    }

    /// Append a message to the conversation
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Record a dispatched call: surface the outcome to the model as a
    /// user-role message, log it, and update the collected-entity map on
    /// success.
    pub fn record_outcome(&mut self, request: &ToolCallRequest, outcome: &ToolOutcome) {
        self.push(Message::user(outcome.conversation_message(&request.tool)));

        self.tool_log.push(ToolLogEntry {
            id: request.id.clone(),
            tool: request.tool.clone(),
            parameters: request.parameters.clone(),
            summary: outcome.summary(),
        });

        if let ToolOutcome::Success(payload) = outcome {
            if let Some(entity) = entity_key(&request.parameters) {
                self.collected.insert(entity, payload.clone());
            }
        }
    }

    /// Comma-separated list of tools used so far, for the synthesis prompt
    pub fn tools_used(&self) -> String {
        self.tool_log
            .iter()
            .map(|entry| entry.tool.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Entity identifier inferred from call parameters: `psu_name` wins over
/// `sector` when both are present.
fn entity_key(parameters: &Map<String, Value>) -> Option<String> {
    parameters
        .get("psu_name")
        .or_else(|| parameters.get("sector"))
        .and_then(Value::as_str)
        .map(String::from)
}
