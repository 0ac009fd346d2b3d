use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{PlanError, PlanResult};
use crate::orchestrator::RunOptions;

/// ## Structure
/// A plan describes where the inventory comes from, how pairs are resolved
/// and which files are produced.
///
/// ```text
/// Plan
///   ├── meta: Option<Meta>
///   │   └── name: Option<String>
///   ├── inventory: InventoryConfig
///   │   └── snapshot: String
///   ├── regions: Option<Vec<String>>
///   ├── resolve: RunOptions
///   │   ├── max_concurrent_regions: usize
///   │   ├── port_policy: PortPolicy (Dedup | PerRuleSet)
///   │   └── chain_style: ChainStyle (Collapsed | Full)
///   └── export: ExportProfile
///       └── profiles: Vec<ExportProfileItem>
///           ├── filename: String
///           ├── exporter: ExportFileType
///           │   ├── JSON
///           │   ├── VisNetwork
///           │   ├── DOT
///           │   ├── CSVNodes
///           │   └── CSVEdges
///           └── render_config: Option<ExportProfileRenderConfig>
///               └── orientation: Option<RenderConfigOrientation>
/// ```

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InventoryConfig {
    pub snapshot: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            snapshot: "inventory.json".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Plan {
    pub meta: Option<Meta>,
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub resolve: RunOptions,
    #[serde(default)]
    pub export: ExportProfile,
}

//
// Export configuration
//

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ExportProfile {
    pub profiles: Vec<ExportProfileItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExportProfileItem {
    pub filename: String,
    pub exporter: ExportFileType,
    #[serde(default)]
    pub render_config: Option<ExportProfileRenderConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Copy, Default)]
pub struct ExportProfileRenderConfig {
    pub orientation: Option<RenderConfigOrientation>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Copy, Default, PartialEq, Eq)]
pub enum RenderConfigOrientation {
    LR,
    #[default]
    TB,
}

impl RenderConfigOrientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderConfigOrientation::LR => "LR",
            RenderConfigOrientation::TB => "TB",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Copy, Default)]
pub struct RenderConfig {
    pub orientation: RenderConfigOrientation,
}

impl ExportProfileItem {
    pub fn get_render_config(&self) -> RenderConfig {
        let render_config = self.render_config.unwrap_or_default();
        RenderConfig {
            orientation: render_config.orientation.unwrap_or_default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFileType {
    JSON,
    VisNetwork,
    DOT,
    CSVNodes,
    CSVEdges,
}

impl Plan {
    pub fn from_file(path: &Path) -> PlanResult<Self> {
        if !path.is_file() {
            return Err(PlanError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| PlanError::Invalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| PlanError::Invalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Starting point written by `init`
    pub fn sample() -> Self {
        Self {
            meta: Some(Meta {
                name: Some("Network reachability".to_string()),
            }),
            inventory: InventoryConfig::default(),
            regions: None,
            resolve: RunOptions::default(),
            export: ExportProfile {
                profiles: vec![
                    ExportProfileItem {
                        filename: "out/graph.json".to_string(),
                        exporter: ExportFileType::JSON,
                        render_config: None,
                    },
                    ExportProfileItem {
                        filename: "out/network.vis.json".to_string(),
                        exporter: ExportFileType::VisNetwork,
                        render_config: None,
                    },
                    ExportProfileItem {
                        filename: "out/graph.dot".to_string(),
                        exporter: ExportFileType::DOT,
                        render_config: Some(ExportProfileRenderConfig {
                            orientation: Some(RenderConfigOrientation::LR),
                        }),
                    },
                ],
            },
        }
    }

    pub fn name(&self) -> String {
        self.meta
            .as_ref()
            .and_then(|m| m.name.clone())
            .unwrap_or_else(|| "Unnamed Graph".to_string())
    }
}

/// Resolves `file` against the directory holding the plan.
pub fn resolve_path(plan_file_path: &Path, file: &str) -> PathBuf {
    let file = Path::new(file);
    if file.is_absolute() {
        return file.to_path_buf();
    }
    match plan_file_path.parent() {
        Some(parent) => parent.join(file),
        None => file.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::ChainStyle;
    use crate::rules::PortPolicy;

    #[test]
    fn test_minimal_plan() {
        let plan: Plan = serde_yaml::from_str("inventory:\n  snapshot: inv.yaml\n").unwrap();
        assert_eq!(plan.inventory.snapshot, "inv.yaml");
        assert!(plan.regions.is_none());
        assert_eq!(plan.resolve, RunOptions::default());
        assert!(plan.export.profiles.is_empty());
        assert_eq!(plan.name(), "Unnamed Graph");
    }

    #[test]
    fn test_full_plan() {
        let plan: Plan = serde_yaml::from_str(
            r#"
meta:
  name: Production
inventory:
  snapshot: inventory.json
regions: [eu-west-1, us-east-1]
resolve:
  max_concurrent_regions: 2
  port_policy: PerRuleSet
  chain_style: Full
export:
  profiles:
    - filename: out.dot
      exporter: DOT
      render_config:
        orientation: LR
    - filename: nodes.csv
      exporter: CSVNodes
"#,
        )
        .unwrap();

        assert_eq!(plan.name(), "Production");
        assert_eq!(plan.regions.as_ref().unwrap().len(), 2);
        assert_eq!(plan.resolve.max_concurrent_regions, 2);
        assert_eq!(plan.resolve.resolve.port_policy, PortPolicy::PerRuleSet);
        assert_eq!(plan.resolve.resolve.chain_style, ChainStyle::Full);
        assert_eq!(plan.export.profiles[0].exporter, ExportFileType::DOT);
        assert_eq!(
            plan.export.profiles[0].get_render_config().orientation,
            RenderConfigOrientation::LR
        );
        assert_eq!(
            plan.export.profiles[1].get_render_config().orientation,
            RenderConfigOrientation::TB
        );
    }

    #[test]
    fn test_sample_plan_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Plan::sample()).unwrap();
        let plan: Plan = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(plan.export.profiles.len(), 3);
        assert_eq!(plan.inventory.snapshot, "inventory.json");
    }

    #[test]
    fn test_missing_plan_file() {
        let err = Plan::from_file(Path::new("/nonexistent/plan.yaml")).unwrap_err();
        assert!(matches!(err, PlanError::NotFound(_)));
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            resolve_path(Path::new("plans/prod.yaml"), "inventory.json"),
            PathBuf::from("plans/inventory.json")
        );
        assert_eq!(
            resolve_path(Path::new("plans/prod.yaml"), "/tmp/inventory.json"),
            PathBuf::from("/tmp/inventory.json")
        );
    }
}
