//! Performance Analysis Tools
//!
//! PSU trend analysis, sector comparison, and sector-wide aggregates.

use async_trait::async_trait;
use serde_json::{Map, Value};

use agent_core::{
    tool::{ParameterSchema, ToolSchema},
    AgentError, Result as CoreResult, Tool,
};

use crate::analytics::AnalysisToolkit;

/// A missing required parameter is an execution error, not a domain
/// payload: it surfaces to the model as `TOOL ERROR`, matching a call
/// that could not be invoked at all.
fn required_str<'a>(parameters: &'a Map<String, Value>, key: &str) -> CoreResult<&'a str> {
    parameters
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AgentError::ToolExecution(format!("Missing required parameter: {key}")))
}

/// `analyze_psu` - yearly metric series and trend analysis for one PSU
pub struct AnalyzePsuTool {
    toolkit: AnalysisToolkit,
}

impl AnalyzePsuTool {
    pub fn new(toolkit: AnalysisToolkit) -> Self {
        Self { toolkit }
    }
}

#[async_trait]
impl Tool for AnalyzePsuTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "analyze_psu".into(),
            description: "Analyze a PSU's performance".into(),
            parameters: vec![ParameterSchema::string("psu_name", "Name of the PSU", true)],
        }
    }

    async fn execute(&self, parameters: &Map<String, Value>) -> CoreResult<Value> {
        let name = required_str(parameters, "psu_name")?;
        Ok(self.toolkit.analyze_psu(name))
    }
}

/// `compare_with_sector` - PSU metrics against sector averages/percentiles
pub struct CompareWithSectorTool {
    toolkit: AnalysisToolkit,
}

impl CompareWithSectorTool {
    pub fn new(toolkit: AnalysisToolkit) -> Self {
        Self { toolkit }
    }
}

#[async_trait]
impl Tool for CompareWithSectorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "compare_with_sector".into(),
            description: "Compare a PSU with sector averages".into(),
            parameters: vec![ParameterSchema::string("psu_name", "Name of the PSU", true)],
        }
    }

    async fn execute(&self, parameters: &Map<String, Value>) -> CoreResult<Value> {
        let name = required_str(parameters, "psu_name")?;
        Ok(self.toolkit.compare_with_sector(name))
    }
}

/// `analyze_sector` - yearly aggregates and best/worst performers
pub struct AnalyzeSectorTool {
    toolkit: AnalysisToolkit,
}

impl AnalyzeSectorTool {
    pub fn new(toolkit: AnalysisToolkit) -> Self {
        Self { toolkit }
    }
}

#[async_trait]
impl Tool for AnalyzeSectorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "analyze_sector".into(),
            description: "Analyze a sector's performance".into(),
            parameters: vec![ParameterSchema::string("sector", "Name of the sector", true)],
        }
    }

    async fn execute(&self, parameters: &Map<String, Value>) -> CoreResult<Value> {
        let sector = required_str(parameters, "sector")?;
        Ok(self.toolkit.analyze_sector(sector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{GeneratorConfig, PsuDataset};
    use serde_json::json;
    use std::sync::Arc;

    fn toolkit() -> AnalysisToolkit {
        AnalysisToolkit::new(Arc::new(PsuDataset::generate(
            &GeneratorConfig::default(),
        )))
    }

    #[tokio::test]
    async fn test_analyze_psu_tool() {
        let tool = AnalyzePsuTool::new(toolkit());
        let mut params = Map::new();
        params.insert("psu_name".into(), json!("PSU_5"));

        let result = tool.execute(&params).await.unwrap();
        assert_eq!(result["psu_name"], "PSU_5");
        assert!(result["trends"].is_object());
    }

    #[tokio::test]
    async fn test_missing_required_parameter_is_execution_error() {
        let tool = AnalyzePsuTool::new(toolkit());
        let err = tool.execute(&Map::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolExecution(_)));
        assert!(err.to_string().contains("Missing required parameter: psu_name"));
    }

    #[tokio::test]
    async fn test_compare_tool_includes_averages() {
        let tool = CompareWithSectorTool::new(toolkit());
        let mut params = Map::new();
        params.insert("psu_name".into(), json!("PSU_2"));

        let result = tool.execute(&params).await.unwrap();
        assert!(result["sector_averages"]["roe"].is_number());
        assert!(result["percentile_rankings"]["revenue"].is_number());
    }

    #[tokio::test]
    async fn test_analyze_sector_tool() {
        let handle = toolkit();
        let sector = handle.dataset().sectors()[0].clone();
        let tool = AnalyzeSectorTool::new(handle);

        let mut params = Map::new();
        params.insert("sector".into(), json!(sector));
        let result = tool.execute(&params).await.unwrap();
        assert_eq!(result["sector"], json!(sector));
        assert!(result["psu_count"].as_u64().unwrap() > 0);
    }
}
