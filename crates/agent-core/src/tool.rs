//! Tool System
//!
//! Name-to-callable registry for data-lookup operations, plus the dispatch
//! layer that isolates tool failures from the session loop. Every dispatched
//! call yields either a success payload or a failure descriptor; nothing
//! raises past this boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;

/// Tool call request extracted from model output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Tool identifier
    pub tool: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub parameters: Map<String, Value>,

    /// Call ID assigned at parse time, for log correlation
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCallRequest {
    pub fn new(tool: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            tool: tool.into(),
            parameters,
            id: Some(uuid::Uuid::new_v4().to_string()),
        }
    }
}

/// Outcome of dispatching one tool call
///
/// A success carries whatever structured payload the registered tool
/// returned. The dispatch layer never inspects payload schema beyond
/// opportunistic key checks for log summaries: a payload containing an
/// `"error"` key is still a success here (a domain-level error the model
/// should see as a tool result).
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ToolOutcome {
    /// Structured data returned by the tool
    Success(Value),
    /// Dispatch-level failure (unknown tool or execution error)
    Failure { error: String },
}

impl ToolOutcome {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Text form appended to the conversation so the model sees the result
    /// on its next turn
    pub fn conversation_message(&self, tool: &str) -> String {
        match self {
            Self::Success(payload) => {
                let body = serde_json::to_string_pretty(payload)
                    .unwrap_or_else(|_| payload.to_string());
                format!("TOOL RESULT ({tool}): {body}")
            }
            Self::Failure { error } => format!("TOOL ERROR: {error}"),
        }
    }

    /// One-line summary for logging/telemetry, derived from the result shape
    pub fn summary(&self) -> String {
        match self {
            Self::Failure { error } => format!("Error: {error}"),
            Self::Success(Value::Object(map)) => {
                if let Some(err) = map.get("error").and_then(Value::as_str) {
                    format!("Error: {err}")
                } else if let Some(name) = map.get("psu_name").and_then(Value::as_str) {
                    format!("Data for {name}")
                } else if let Some(sector) = map.get("sector").and_then(Value::as_str) {
                    format!("Data for {sector} sector")
                } else if let Some(metric) = map.get("metric").and_then(Value::as_str) {
                    format!("Top performers by {metric}")
                } else {
                    "Data retrieved successfully".into()
                }
            }
            Self::Success(Value::Array(items)) => format!("Retrieved {} records", items.len()),
            Self::Success(_) => "Data retrieved".into(),
        }
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON type (string, number, boolean)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

impl ParameterSchema {
    pub fn string(name: &str, description: &str, required: bool) -> Self {
        Self {
            name: name.into(),
            param_type: "string".into(),
            description: description.into(),
            required,
        }
    }

    pub fn integer(name: &str, description: &str, required: bool) -> Self {
        Self {
            name: name.into(),
            param_type: "integer".into(),
            description: description.into(),
            required,
        }
    }
}

/// Tool definition schema (shown to the model in the role prompt)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,
}

/// Tool trait - implement to register a data-lookup operation
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for catalogue generation
    fn schema(&self) -> ToolSchema;

    /// Execute with the parsed parameter map. Domain-level problems (entity
    /// not found, invalid metric) should be returned as an `{"error": ...}`
    /// payload inside `Ok`; an `Err` means the execution itself failed.
    async fn execute(&self, parameters: &Map<String, Value>) -> Result<Value>;
}

/// Registry for available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let schema = tool.schema();
        self.tools.insert(schema.name.clone(), Arc::new(tool));
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        self.tools.insert(schema.name.clone(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Resolve and execute a call, isolating all failures.
    ///
    /// Unknown names and execution errors become failure outcomes; neither
    /// terminates the calling session.
    pub async fn dispatch(&self, request: &ToolCallRequest) -> ToolOutcome {
        let Some(tool) = self.get(&request.tool) else {
            return ToolOutcome::failure(format!("Unknown tool: {}", request.tool));
        };

        match tool.execute(&request.parameters).await {
            Ok(payload) => ToolOutcome::Success(payload),
            Err(crate::error::AgentError::ToolExecution(msg)) => {
                ToolOutcome::failure(format!("Tool execution error: {msg}"))
            }
            Err(e) => ToolOutcome::failure(format!("Tool execution error: {e}")),
        }
    }

    /// All tool schemas, sorted by name for stable prompt generation
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<_> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Registered tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".into(),
                description: "Echo parameters back".into(),
                parameters: vec![],
            }
        }

        async fn execute(&self, parameters: &Map<String, Value>) -> Result<Value> {
            Ok(Value::Object(parameters.clone()))
        }
    }

    struct StrictTool;

    #[async_trait]
    impl Tool for StrictTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "strict".into(),
                description: "Requires a parameter".into(),
                parameters: vec![ParameterSchema::string("psu_name", "PSU", true)],
            }
        }

        async fn execute(&self, parameters: &Map<String, Value>) -> Result<Value> {
            let name = parameters
                .get("psu_name")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    AgentError::ToolExecution("Missing required parameter: psu_name".into())
                })?;
            Ok(json!({"psu_name": name}))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "broken".into(),
                description: "Always fails".into(),
                parameters: vec![],
            }
        }

        async fn execute(&self, _parameters: &Map<String, Value>) -> Result<Value> {
            Err(AgentError::Other("registry offline".into()))
        }
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool_is_failure_not_panic() {
        let registry = ToolRegistry::new();
        let request = ToolCallRequest::new("missing", Map::new());

        let outcome = registry.dispatch(&request).await;
        match outcome {
            ToolOutcome::Failure { error } => {
                assert_eq!(error, "Unknown tool: missing");
            }
            ToolOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_execution_error_embeds_message() {
        let mut registry = ToolRegistry::new();
        registry.register(FailingTool);

        let outcome = registry
            .dispatch(&ToolCallRequest::new("broken", Map::new()))
            .await;
        match outcome {
            ToolOutcome::Failure { error } => {
                assert_eq!(error, "Tool execution error: registry offline");
            }
            ToolOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_missing_parameter_prefixed_once() {
        let mut registry = ToolRegistry::new();
        registry.register(StrictTool);

        let outcome = registry
            .dispatch(&ToolCallRequest::new("strict", Map::new()))
            .await;
        match outcome {
            ToolOutcome::Failure { error } => {
                assert_eq!(
                    error,
                    "Tool execution error: Missing required parameter: psu_name"
                );
            }
            ToolOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_success_passes_payload_through() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let mut params = Map::new();
        params.insert("psu_name".into(), json!("PSU_3"));
        let outcome = registry
            .dispatch(&ToolCallRequest::new("echo", params))
            .await;

        assert!(!outcome.is_failure());
        assert_eq!(outcome.summary(), "Data for PSU_3");
    }

    #[test]
    fn test_summary_shapes() {
        let err = ToolOutcome::Success(json!({"error": "PSU 'X' not found"}));
        assert_eq!(err.summary(), "Error: PSU 'X' not found");

        let sector = ToolOutcome::Success(json!({"sector": "Energy"}));
        assert_eq!(sector.summary(), "Data for Energy sector");

        let metric = ToolOutcome::Success(json!({"metric": "ROE"}));
        assert_eq!(metric.summary(), "Top performers by ROE");

        let records = ToolOutcome::Success(json!([1, 2, 3]));
        assert_eq!(records.summary(), "Retrieved 3 records");

        let plain = ToolOutcome::Success(json!({"sectors": ["Energy"]}));
        assert_eq!(plain.summary(), "Data retrieved successfully");
    }

    #[test]
    fn test_conversation_message_tags_tool_name() {
        let outcome = ToolOutcome::Success(json!({"ok": true}));
        let msg = outcome.conversation_message("analyze_psu");
        assert!(msg.starts_with("TOOL RESULT (analyze_psu): "));

        let failure = ToolOutcome::failure("Unknown tool: nope");
        assert_eq!(
            failure.conversation_message("nope"),
            "TOOL ERROR: Unknown tool: nope"
        );
    }
}
