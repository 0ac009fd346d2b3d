//! Region orchestration.
//!
//! Every region is fetched and resolved by its own task, at most
//! `max_concurrent_regions` at a time. Tasks hand back self-contained
//! fragments; only the orchestrator touches the run's [`Graph`], merging one
//! fragment at a time as tasks finish.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{FetchError, GraphError, RunError};
use crate::fetcher::ResourceFetcher;
use crate::graph::{Graph, GraphFragment};
use crate::inventory::RegionResources;
use crate::relationships::{resolve_region, RegionResolution, ResolveOptions, ResolveStats};

pub const DEFAULT_MAX_CONCURRENT_REGIONS: usize = 4;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct RunOptions {
    pub max_concurrent_regions: usize,
    #[serde(flatten)]
    pub resolve: ResolveOptions,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_concurrent_regions: DEFAULT_MAX_CONCURRENT_REGIONS,
            resolve: ResolveOptions::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RegionFailure {
    pub region: String,
    pub reason: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RunReport {
    pub graph: Graph,
    pub failed_regions: Vec<RegionFailure>,
    pub cancelled: bool,
    pub stats: ResolveStats,
}

enum RegionTaskError {
    Fetch(FetchError),
    Graph(GraphError),
    Cancelled,
    Panicked(String),
}

struct RegionOutcome {
    region: String,
    result: Result<RegionResolution, RegionTaskError>,
}

pub struct Orchestrator {
    fetcher: Arc<dyn ResourceFetcher>,
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, options: RunOptions) -> Self {
        Self { fetcher, options }
    }

    /// Builds the graph for `regions`, or every region the fetcher knows.
    ///
    /// Credential failures and graph invariant violations abort the run.
    /// Region fetch failures leave that region empty and are listed in the
    /// report. After `cancel` fires no further region starts; fragments
    /// already merged are kept.
    pub async fn run(
        &self,
        name: &str,
        regions: Option<Vec<String>>,
        cancel: CancellationToken,
    ) -> Result<RunReport, RunError> {
        self.fetcher.verify_session().await?;

        let regions = match regions {
            Some(regions) => regions,
            None => self.fetcher.list_regions().await?,
        };
        let regions = unique_regions(regions);
        info!(
            "Resolving {} regions, {} at a time",
            regions.len(),
            self.options.max_concurrent_regions.max(1)
        );

        let mut report = RunReport {
            graph: Graph::new(name),
            ..Default::default()
        };
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrent_regions.max(1)));
        let mut tasks = JoinSet::new();

        for region in &regions {
            if cancel.is_cancelled() {
                break;
            }
            tasks.spawn(resolve_region_task(
                self.fetcher.clone(),
                region.clone(),
                self.options.resolve,
                semaphore.clone(),
                cancel.clone(),
            ));
        }

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("Run cancelled, abandoning {} region task(s)", tasks.len());
                    tasks.abort_all();
                    report.cancelled = true;
                    break;
                }
                joined = tasks.join_next() => joined,
            };
            let Some(joined) = joined else {
                break;
            };

            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => continue,
                Err(e) => return Err(RunError::Task(e.to_string())),
            };

            match outcome.result {
                Ok(resolution) => {
                    debug!("Region {} finished", outcome.region);
                    report.stats.absorb(&resolution.stats);
                    report.graph.merge(resolution.fragment)?;
                }
                Err(RegionTaskError::Fetch(e)) if e.is_fatal() => {
                    tasks.abort_all();
                    return Err(e.into());
                }
                Err(RegionTaskError::Fetch(e)) => {
                    warn!("Skipping region {}: {}", outcome.region, e);
                    report.failed_regions.push(RegionFailure {
                        region: outcome.region.clone(),
                        reason: e.to_string(),
                    });
                    report.graph.merge(GraphFragment::new(&outcome.region))?;
                }
                Err(RegionTaskError::Graph(e)) => {
                    tasks.abort_all();
                    return Err(e.into());
                }
                Err(RegionTaskError::Panicked(reason)) => {
                    tasks.abort_all();
                    return Err(RunError::Task(format!("{}: {}", outcome.region, reason)));
                }
                Err(RegionTaskError::Cancelled) => {
                    report.cancelled = true;
                }
            }
        }

        report.graph.sort_by_regions(&regions);
        report
            .graph
            .verify_graph_integrity()
            .map_err(GraphError::Integrity)?;

        info!(
            "Run finished: {} ({} failed regions{})",
            report.graph.stats(),
            report.failed_regions.len(),
            if report.cancelled { ", cancelled" } else { "" }
        );
        Ok(report)
    }
}

/// Drops repeated regions, keeping the first occurrence.
fn unique_regions(regions: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    regions
        .into_iter()
        .filter(|region| {
            let first = seen.insert(region.clone());
            if !first {
                warn!("Region {} listed more than once, resolving it once", region);
            }
            first
        })
        .collect()
}

async fn resolve_region_task(
    fetcher: Arc<dyn ResourceFetcher>,
    region: String,
    options: ResolveOptions,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
) -> RegionOutcome {
    let result = fetch_and_resolve(fetcher, &region, options, semaphore, cancel).await;
    RegionOutcome { region, result }
}

async fn fetch_and_resolve(
    fetcher: Arc<dyn ResourceFetcher>,
    region: &str,
    options: ResolveOptions,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
) -> Result<RegionResolution, RegionTaskError> {
    let _permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(RegionTaskError::Cancelled),
        permit = semaphore.acquire_owned() => permit.map_err(|_| RegionTaskError::Cancelled)?,
    };

    debug!("Fetching region {}", region);
    let inventory = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(RegionTaskError::Cancelled),
        inventory = fetcher.fetch_region(region) => inventory.map_err(RegionTaskError::Fetch)?,
    };

    let region = region.to_string();
    tokio::task::spawn_blocking(move || {
        let resources = RegionResources::from_inventory(&region, &inventory);
        resolve_region(&resources, &options)
    })
    .await
    .map_err(|e| RegionTaskError::Panicked(e.to_string()))?
    .map_err(RegionTaskError::Graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_options_defaults() {
        let options = RunOptions::default();
        assert_eq!(options.max_concurrent_regions, 4);
        assert_eq!(options.resolve, ResolveOptions::default());
    }

    #[test]
    fn test_run_options_from_yaml() {
        let options: RunOptions = serde_yaml::from_str(
            "max_concurrent_regions: 2\nport_policy: PerRuleSet\nchain_style: Full\n",
        )
        .unwrap();
        assert_eq!(options.max_concurrent_regions, 2);
        assert_eq!(
            options.resolve.port_policy,
            crate::rules::PortPolicy::PerRuleSet
        );
        assert_eq!(
            options.resolve.chain_style,
            crate::relationships::ChainStyle::Full
        );
    }

    #[test]
    fn test_unique_regions_keeps_first_occurrence() {
        let regions = vec![
            "eu-west-1".to_string(),
            "us-east-1".to_string(),
            "eu-west-1".to_string(),
        ];
        assert_eq!(unique_regions(regions), vec!["eu-west-1", "us-east-1"]);
    }

    #[test]
    fn test_run_options_partial_yaml() {
        let options: RunOptions = serde_yaml::from_str("chain_style: Full\n").unwrap();
        assert_eq!(options.max_concurrent_regions, 4);
    }
}
