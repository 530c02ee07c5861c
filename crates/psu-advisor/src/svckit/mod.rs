//! Service Kit - Agent Tools
//!
//! Adapters exposing the analysis toolkit operations as `agent_core::Tool`
//! implementations, one registered name per catalogue operation.

mod analysis;
mod lookup;
mod ranking;

pub use analysis::{AnalyzePsuTool, AnalyzeSectorTool, CompareWithSectorTool};
pub use lookup::{DatasetOverviewTool, PsuDataTool, SectorDataTool};
pub use ranking::TopPerformersTool;

use agent_core::ToolRegistry;

use crate::analytics::AnalysisToolkit;

/// Registry with the full seven-operation tool catalogue
pub fn build_registry(toolkit: &AnalysisToolkit) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(DatasetOverviewTool::new(toolkit.clone()));
    registry.register(PsuDataTool::new(toolkit.clone()));
    registry.register(SectorDataTool::new(toolkit.clone()));
    registry.register(AnalyzePsuTool::new(toolkit.clone()));
    registry.register(CompareWithSectorTool::new(toolkit.clone()));
    registry.register(TopPerformersTool::new(toolkit.clone()));
    registry.register(AnalyzeSectorTool::new(toolkit.clone()));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{GeneratorConfig, PsuDataset};
    use std::sync::Arc;

    #[test]
    fn test_registry_carries_full_catalogue() {
        let toolkit = AnalysisToolkit::new(Arc::new(PsuDataset::generate(
            &GeneratorConfig::default(),
        )));
        let registry = build_registry(&toolkit);

        assert_eq!(registry.len(), 7);
        assert_eq!(
            registry.names(),
            vec![
                "analyze_psu",
                "analyze_sector",
                "compare_with_sector",
                "get_dataset_overview",
                "get_psu_data",
                "get_sector_data",
                "identify_top_performers",
            ]
        );
    }
}
