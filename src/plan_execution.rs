use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::common::write_string_to_file;
use crate::errors::{PlanError, PlanResult, RunError};
use crate::export;
use crate::fetcher::{ResourceFetcher, SnapshotFetcher};
use crate::graph::Graph;
use crate::orchestrator::{Orchestrator, RunReport};
use crate::plan::{resolve_path, Plan};

/// Loads the plan at `plan_path`, resolves its snapshot and writes every
/// export profile.
///
/// Exports are written for a cancelled run as well; they hold the regions
/// that were merged before cancellation.
pub async fn execute_plan(plan_path: &Path, cancel: CancellationToken) -> Result<RunReport, RunError> {
    info!("Executing plan {}", plan_path.display());

    let plan = Plan::from_file(plan_path)?;
    debug!("Executing plan: {:?}", plan);

    let snapshot_path = resolve_path(plan_path, &plan.inventory.snapshot);
    let fetcher = Arc::new(SnapshotFetcher::from_file(&snapshot_path)?);

    execute_plan_with_fetcher(&plan, plan_path, fetcher, cancel).await
}

/// Runs `plan` against any fetcher; export paths resolve against `plan_path`.
pub async fn execute_plan_with_fetcher(
    plan: &Plan,
    plan_path: &Path,
    fetcher: Arc<dyn ResourceFetcher>,
    cancel: CancellationToken,
) -> Result<RunReport, RunError> {
    let orchestrator = Orchestrator::new(fetcher, plan.resolve);
    let report = orchestrator
        .run(&plan.name(), plan.regions.clone(), cancel)
        .await?;

    export_graph(plan, plan_path, &report.graph)?;
    Ok(report)
}

pub fn export_graph(plan: &Plan, plan_path: &Path, graph: &Graph) -> PlanResult<()> {
    for profile in &plan.export.profiles {
        let output_path = resolve_path(plan_path, &profile.filename);
        info!(
            "Exporting file: {} using exporter {:?}",
            output_path.display(),
            profile.exporter
        );

        let export_error = |reason: String| PlanError::Export {
            filename: output_path.display().to_string(),
            reason,
        };
        let output = export::render(graph, profile.exporter, &profile.get_render_config())
            .map_err(|e| export_error(e.to_string()))?;
        write_string_to_file(&output_path, &output).map_err(|e| export_error(e.to_string()))?;
    }
    Ok(())
}

/// Writes the sample plan unless a file already exists at `plan_path`.
pub fn init_plan(plan_path: &Path) -> PlanResult<()> {
    let invalid = |reason: String| PlanError::Invalid {
        path: plan_path.display().to_string(),
        reason,
    };
    if plan_path.exists() {
        return Err(invalid("file already exists".to_string()));
    }

    let content = serde_yaml::to_string(&Plan::sample()).map_err(|e| invalid(e.to_string()))?;
    write_string_to_file(plan_path, &content).map_err(|e| invalid(e.to_string()))?;
    info!("Wrote plan {}", plan_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchError;

    #[tokio::test]
    async fn test_missing_plan_maps_to_no_plan_exit_code() {
        let err = execute_plan(Path::new("/nonexistent/plan.yaml"), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Plan(PlanError::NotFound(_))));
        assert_eq!(err.exit_code(), crate::errors::NO_PLAN);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let plan_path = dir.path().join("plan.yaml");
        std::fs::write(&plan_path, "inventory:\n  snapshot: missing.json\n").unwrap();

        let err = execute_plan(&plan_path, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Fetch(FetchError::Snapshot { .. })));
    }

    #[test]
    fn test_init_plan_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let plan_path = dir.path().join("plans/plan.yaml");

        init_plan(&plan_path).unwrap();
        let plan = Plan::from_file(&plan_path).unwrap();
        assert_eq!(plan.export.profiles.len(), 3);

        let err = init_plan(&plan_path).unwrap_err();
        assert!(matches!(err, PlanError::Invalid { .. }));
    }

    #[test]
    fn test_export_graph_writes_every_profile() {
        let dir = tempfile::tempdir().unwrap();
        let plan_path = dir.path().join("plan.yaml");
        let plan = Plan::sample();

        export_graph(&plan, &plan_path, &Graph::new("empty")).unwrap();

        assert!(dir.path().join("out/graph.json").is_file());
        assert!(dir.path().join("out/network.vis.json").is_file());
        assert!(dir.path().join("out/graph.dot").is_file());
    }
}
