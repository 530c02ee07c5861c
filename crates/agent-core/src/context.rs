//! Conversation Context Construction
//!
//! Assembles the ordered message sequence sent to the model at session
//! start: the mode-specific role prompt, the raw user query, and a
//! dataset-overview primer. Pure functions of their inputs.
//!
//! The two modes share one tool-catalogue description interpolated into
//! mode-specific instruction templates, so the catalogue is defined once.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::Message;
use crate::tool::ToolRegistry;

/// Delivery mode for the agent's role prompt
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    /// Detailed financial analysis with highlighted findings
    #[default]
    Analyst,
    /// Prioritized, actionable policy recommendations
    Policy,
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentMode::Analyst => write!(f, "analyst"),
            AgentMode::Policy => write!(f, "policy"),
        }
    }
}

impl std::str::FromStr for AgentMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "analyst" => Ok(AgentMode::Analyst),
            "policy" => Ok(AgentMode::Policy),
            other => Err(format!("unknown agent mode: {other}")),
        }
    }
}

const ANALYST_INSTRUCTIONS: &str = "\
You are a financial analysis AI for the Ministry of Industries of India.
You analyze Public Sector Undertaking (PSU) data to provide insights.

INSTRUCTIONS:
1. First understand the user's query and what data is needed to answer it
2. Collect all necessary data using the available tools
3. Provide a clear, concise analysis based on the data
4. Be direct and specific with your insights
5. Format your response with markdown for better readability
6. Highlight critical findings with bullet points
7. Never ask if the user wants more information";

const POLICY_INSTRUCTIONS: &str = "\
You are a policy drafting AI for the Ministry of Industries of India.
Your job is to create actionable policy recommendations for PSUs (Public Sector Undertakings).

INSTRUCTIONS:
1. First understand what policy guidance is needed and what data will inform it
2. Collect all necessary data using the available tools
3. Draft clear, specific policy recommendations based on the data
4. Structure recommendations by priority (High/Medium/Low)
5. Use numbered lists for specific action items
6. Include implementation steps where relevant
7. Be direct and specific with recommendations";

/// Tool-catalogue section shared by both modes, generated from the registry
fn catalogue_section(registry: &ToolRegistry) -> String {
    let mut section = String::from(
        "TOOLS:\n\
         When you need data, output a JSON tool call between <TOOL> and </TOOL> tags:\n\n\
         <TOOL>\n\
         {\n    \"tool\": \"tool_name\",\n    \"parameters\": {\"param1\": \"value1\"}\n}\n\
         </TOOL>\n\n\
         Available tools:\n",
    );

    for schema in registry.schemas() {
        let params = if schema.parameters.is_empty() {
            "no parameters".to_string()
        } else {
            let names: Vec<&str> = schema
                .parameters
                .iter()
                .map(|p| p.name.as_str())
                .collect();
            format!("parameters: {}", names.join(", "))
        };
        section.push_str(&format!(
            "- {}: {} ({})\n",
            schema.name, schema.description, params
        ));
    }

    section.push_str(
        "\nExample of using a tool:\n\
         <TOOL>\n\
         {\n    \"tool\": \"analyze_psu\",\n    \"parameters\": {\"psu_name\": \"PSU_1\"}\n}\n\
         </TOOL>",
    );

    section
}

/// Full role prompt for a mode: instruction template plus the shared catalogue
pub fn role_prompt(mode: AgentMode, registry: &ToolRegistry) -> String {
    let instructions = match mode {
        AgentMode::Analyst => ANALYST_INSTRUCTIONS,
        AgentMode::Policy => POLICY_INSTRUCTIONS,
    };
    format!("{instructions}\n\n{}", catalogue_section(registry))
}

fn overview_field(overview: &Value, key: &str) -> String {
    match overview.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "unknown".into(),
    }
}

/// Human-readable primer summarizing a dataset-overview payload, appended to
/// the context before the first model turn so the model has baseline
/// orientation before any tool call.
pub fn overview_primer(overview: &Value) -> String {
    format!(
        "Here's an overview of the dataset:\n\
         - {} PSUs across {} sectors\n\
         - Data from {}\n\
         - In the latest year ({}), there are {} profitable PSUs and {} loss-making PSUs",
        overview_field(overview, "psu_count"),
        overview_field(overview, "sector_count"),
        overview_field(overview, "year_range"),
        overview_field(overview, "latest_year"),
        overview_field(overview, "profitable_psus"),
        overview_field(overview, "loss_making_psus"),
    )
}

/// Seed the conversation: role prompt, raw query, overview primer.
/// No side effects beyond message construction.
pub fn build_context(
    mode: AgentMode,
    query: &str,
    overview: &Value,
    registry: &ToolRegistry,
) -> Vec<Message> {
    vec![
        Message::system(role_prompt(mode, registry)),
        Message::user(query),
        Message::user(overview_primer(overview)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::message::Role;
    use crate::tool::{ParameterSchema, Tool, ToolSchema};
    use async_trait::async_trait;
    use serde_json::{json, Map};

    struct StubTool(&'static str, Vec<ParameterSchema>);

    #[async_trait]
    impl Tool for StubTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.0.into(),
                description: "Stub".into(),
                parameters: self.1.clone(),
            }
        }

        async fn execute(&self, _parameters: &Map<String, Value>) -> Result<Value> {
            Ok(json!({}))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(StubTool("get_dataset_overview", vec![]));
        registry.register(StubTool(
            "analyze_psu",
            vec![ParameterSchema::string("psu_name", "Name of the PSU", true)],
        ));
        registry
    }

    #[test]
    fn test_context_shape() {
        let overview = json!({
            "psu_count": 20,
            "sector_count": 5,
            "year_range": "2021 to 2025",
            "latest_year": 2025,
            "profitable_psus": 14,
            "loss_making_psus": 6,
        });
        let messages = build_context(AgentMode::Analyst, "How is PSU_1 doing?", &overview, &registry());

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "How is PSU_1 doing?");
        assert!(messages[2].content.contains("20 PSUs across 5 sectors"));
        assert!(messages[2].content.contains("2021 to 2025"));
        assert!(messages[2].content.contains("14 profitable PSUs and 6 loss-making PSUs"));
    }

    #[test]
    fn test_modes_share_catalogue_differ_in_instructions() {
        let registry = registry();
        let analyst = role_prompt(AgentMode::Analyst, &registry);
        let policy = role_prompt(AgentMode::Policy, &registry);

        for prompt in [&analyst, &policy] {
            assert!(prompt.contains("<TOOL>"));
            assert!(prompt.contains("- analyze_psu: Stub (parameters: psu_name)"));
            assert!(prompt.contains("- get_dataset_overview: Stub (no parameters)"));
        }
        assert!(analyst.contains("financial analysis AI"));
        assert!(policy.contains("policy drafting AI"));
        assert!(policy.contains("priority (High/Medium/Low)"));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Analyst".parse::<AgentMode>().unwrap(), AgentMode::Analyst);
        assert_eq!("policy".parse::<AgentMode>().unwrap(), AgentMode::Policy);
        assert!("manager".parse::<AgentMode>().is_err());
    }
}
