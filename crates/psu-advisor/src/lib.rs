//! # psu-advisor
//!
//! Public Sector Undertaking (PSU) financial dataset and analysis tools for
//! the agent loop in `agent-core`.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      psu-advisor                           │
//! │  ┌────────────┐  ┌─────────────────┐  ┌────────────────┐   │
//! │  │ PsuDataset │──│ AnalysisToolkit │──│ svckit (Tools) │   │
//! │  │ (CSV/gen)  │  │  7 operations   │  │ agent_core     │   │
//! │  └────────────┘  └─────────────────┘  └────────────────┘   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The dataset is loaded (or generated) once at startup and stays read-only
//! for the life of the process; every tool lookup is a pure function over it.

pub mod analytics;
pub mod dataset;
pub mod error;
pub mod model;
pub mod svckit;

pub use analytics::AnalysisToolkit;
pub use dataset::{GeneratorConfig, PsuDataset};
pub use error::{AdvisorError, Result};
pub use model::{Metric, PsuRecord};
pub use svckit::build_registry;

#[cfg(test)]
mod agent_flow_tests {
    //! End-to-end scenarios: the real tool catalogue driven by a scripted
    //! provider through the full session loop.

    use super::*;
    use agent_core::error::{AgentError, Result as CoreResult};
    use agent_core::message::Message;
    use agent_core::provider::{Completion, GenerationOptions, LlmProvider, ModelInfo};
    use agent_core::{AgentMode, AgentSessionBuilder};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct ScriptedProvider {
        responses: Mutex<VecDeque<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|s| (*s).to_string()).collect()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn health_check(&self) -> CoreResult<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            _messages: &[Message],
            options: &GenerationOptions,
        ) -> CoreResult<Completion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let content = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AgentError::Provider("script exhausted".into()))?;
            Ok(Completion {
                content,
                model: options.model.clone(),
                usage: None,
            })
        }

        async fn list_models(&self) -> CoreResult<Vec<ModelInfo>> {
            Ok(vec![])
        }
    }

    fn session(provider: Arc<ScriptedProvider>) -> agent_core::AgentSession {
        let toolkit = AnalysisToolkit::new(Arc::new(PsuDataset::generate(
            &GeneratorConfig::default(),
        )));
        AgentSessionBuilder::new()
            .provider(provider)
            .tools(build_registry(&toolkit))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_top_performers_query_two_turns() {
        let sector = PsuDataset::generate(&GeneratorConfig::default()).sectors()[0].clone();
        let first_turn = format!(
            "Let me pull the rankings.\n<TOOL>{{\"tool\":\"identify_top_performers\",\"parameters\":{{\"sector\":\"{sector}\",\"metric\":\"ROE\",\"top_n\":5}}}}</TOOL>"
        );
        let provider = Arc::new(ScriptedProvider::new(&[
            &first_turn,
            "The strongest performers by ROE are listed above.",
        ]));

        let report = session(provider.clone())
            .process_query(
                &format!("Top performers in {sector} sector"),
                AgentMode::Analyst,
            )
            .await
            .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            report.answer,
            "The strongest performers by ROE are listed above."
        );
        assert_eq!(report.tool_log.len(), 1);
        assert_eq!(report.tool_log[0].summary, "Top performers by ROE");
    }

    #[tokio::test]
    async fn test_domain_error_payload_flows_back_as_tool_result() {
        let provider = Arc::new(ScriptedProvider::new(&[
            r#"<TOOL>{"tool":"analyze_psu","parameters":{"psu_name":"PSU_999"}}</TOOL>"#,
            "That PSU does not exist in the dataset.",
        ]));

        let report = session(provider)
            .process_query("Tell me about PSU_999", AgentMode::Analyst)
            .await
            .unwrap();

        // Lookup miss is a tool RESULT (domain error), not a dispatch failure
        assert_eq!(report.tool_log[0].summary, "Error: PSU 'PSU_999' not found");
        assert_eq!(report.answer, "That PSU does not exist in the dataset.");
    }

    #[tokio::test]
    async fn test_policy_mode_synthesis_path() {
        let tool_turn = r#"<TOOL>{"tool":"get_psu_data","parameters":{"psu_name":"PSU_1"}}</TOOL>"#;
        let provider = Arc::new(ScriptedProvider::new(&[
            tool_turn,
            tool_turn,
            tool_turn,
            "Recommendations: 1. Reduce leverage. Would you like more details on each step.",
        ]));

        let report = session(provider.clone())
            .process_query("Draft policy for PSU_1", AgentMode::Policy)
            .await
            .unwrap();

        // 3 loop calls + 1 synthesis call, closing phrase stripped
        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
        assert_eq!(report.answer, "Recommendations: 1. Reduce leverage.");
        assert_eq!(report.tool_log.len(), 3);
        assert!(report
            .tool_log
            .iter()
            .all(|entry| entry.summary == "Retrieved 5 records"));
    }
}
