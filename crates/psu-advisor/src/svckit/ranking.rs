//! Ranking Tool
//!
//! Top-performer identification by a chosen financial metric.

use async_trait::async_trait;
use serde_json::{Map, Value};

use agent_core::{
    tool::{ParameterSchema, ToolSchema},
    Result as CoreResult, Tool,
};

use crate::analytics::AnalysisToolkit;

const DEFAULT_METRIC: &str = "ROE";
const DEFAULT_TOP_N: usize = 5;

/// `identify_top_performers` - rank PSUs by metric over latest-year records
pub struct TopPerformersTool {
    toolkit: AnalysisToolkit,
}

impl TopPerformersTool {
    pub fn new(toolkit: AnalysisToolkit) -> Self {
        Self { toolkit }
    }
}

#[async_trait]
impl Tool for TopPerformersTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "identify_top_performers".into(),
            description: "Find top PSUs by metric".into(),
            parameters: vec![
                ParameterSchema::string("sector", "Optional sector filter", false),
                ParameterSchema::string(
                    "metric",
                    "Metric to rank by: ROE, Profit_Margin, Revenue, Net_Profit, or Debt_Equity",
                    false,
                ),
                ParameterSchema::integer("top_n", "Number of top performers to return", false),
            ],
        }
    }

    async fn execute(&self, parameters: &Map<String, Value>) -> CoreResult<Value> {
        let sector = parameters.get("sector").and_then(Value::as_str);
        let metric = parameters
            .get("metric")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_METRIC);
        let top_n = parameters
            .get("top_n")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_TOP_N, |n| n as usize);

        Ok(self.toolkit.identify_top_performers(sector, metric, top_n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{GeneratorConfig, PsuDataset};
    use serde_json::json;
    use std::sync::Arc;

    fn tool() -> TopPerformersTool {
        TopPerformersTool::new(AnalysisToolkit::new(Arc::new(PsuDataset::generate(
            &GeneratorConfig::default(),
        ))))
    }

    #[tokio::test]
    async fn test_defaults_applied() {
        let result = tool().execute(&Map::new()).await.unwrap();
        assert_eq!(result["metric"], "ROE");
        assert_eq!(result["top_performers"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_explicit_parameters() {
        let mut params = Map::new();
        params.insert("metric".into(), json!("Revenue"));
        params.insert("top_n".into(), json!(3));

        let result = tool().execute(&params).await.unwrap();
        assert_eq!(result["metric"], "Revenue");
        assert_eq!(result["top_performers"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_metric_is_error_payload() {
        let mut params = Map::new();
        params.insert("metric".into(), json!("Sharpe"));

        let result = tool().execute(&params).await.unwrap();
        assert!(result["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid metric: Sharpe"));
    }
}
