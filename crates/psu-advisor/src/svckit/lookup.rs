//! Raw Data Lookup Tools
//!
//! Overview, per-PSU, and per-sector record retrieval.

use async_trait::async_trait;
use serde_json::{Map, Value};

use agent_core::{
    tool::{ParameterSchema, ToolSchema},
    Result as CoreResult, Tool,
};

use crate::analytics::AnalysisToolkit;

fn str_param<'a>(parameters: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    parameters.get(key).and_then(Value::as_str)
}

/// `get_dataset_overview` - high-level overview of the entire dataset
pub struct DatasetOverviewTool {
    toolkit: AnalysisToolkit,
}

impl DatasetOverviewTool {
    pub fn new(toolkit: AnalysisToolkit) -> Self {
        Self { toolkit }
    }
}

#[async_trait]
impl Tool for DatasetOverviewTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_dataset_overview".into(),
            description: "Gets a high-level overview of the entire dataset".into(),
            parameters: vec![],
        }
    }

    async fn execute(&self, _parameters: &Map<String, Value>) -> CoreResult<Value> {
        Ok(self.toolkit.dataset_overview())
    }
}

/// `get_psu_data` - yearly financial records for one PSU (or all)
pub struct PsuDataTool {
    toolkit: AnalysisToolkit,
}

impl PsuDataTool {
    pub fn new(toolkit: AnalysisToolkit) -> Self {
        Self { toolkit }
    }
}

#[async_trait]
impl Tool for PsuDataTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_psu_data".into(),
            description: "Get data for a PSU".into(),
            parameters: vec![ParameterSchema::string(
                "psu_name",
                "Name of the PSU, or \"all\" for all PSUs",
                false,
            )],
        }
    }

    async fn execute(&self, parameters: &Map<String, Value>) -> CoreResult<Value> {
        Ok(self.toolkit.psu_data(str_param(parameters, "psu_name")))
    }
}

/// `get_sector_data` - latest-year records for a sector (or the sector list)
pub struct SectorDataTool {
    toolkit: AnalysisToolkit,
}

impl SectorDataTool {
    pub fn new(toolkit: AnalysisToolkit) -> Self {
        Self { toolkit }
    }
}

#[async_trait]
impl Tool for SectorDataTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_sector_data".into(),
            description: "Get data for a sector".into(),
            parameters: vec![ParameterSchema::string(
                "sector",
                "Name of the sector, or \"all\" for the sector list",
                false,
            )],
        }
    }

    async fn execute(&self, parameters: &Map<String, Value>) -> CoreResult<Value> {
        Ok(self.toolkit.sector_data(str_param(parameters, "sector")))
    }
}
