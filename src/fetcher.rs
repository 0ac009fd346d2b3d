//! Boundary to the cloud inventory.
//!
//! The engine only sees the [`ResourceFetcher`] trait. A live API client
//! lives outside this crate; [`SnapshotFetcher`] serves a frozen inventory
//! captured earlier, which makes runs reproducible.

use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::{FetchError, FetchResult};
use crate::inventory::{InventorySnapshot, RegionInventory};

#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Establishes (or checks) the session; a failure here aborts the run.
    async fn verify_session(&self) -> FetchResult<()>;

    async fn list_regions(&self) -> FetchResult<Vec<String>>;

    /// Retries, if any, are the fetcher's business.
    async fn fetch_region(&self, region: &str) -> FetchResult<RegionInventory>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(std::ffi::OsStr::to_str) {
            Some("json") => Some(SnapshotFormat::Json),
            Some("yaml") | Some("yml") => Some(SnapshotFormat::Yaml),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SnapshotFetcher {
    snapshot: InventorySnapshot,
}

impl SnapshotFetcher {
    pub fn new(snapshot: InventorySnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_file(path: &Path) -> FetchResult<Self> {
        let snapshot_error = |reason: String| FetchError::Snapshot {
            path: path.display().to_string(),
            reason,
        };

        let format = SnapshotFormat::from_path(path)
            .ok_or_else(|| snapshot_error("unsupported extension".to_string()))?;
        let content = std::fs::read_to_string(path).map_err(|e| snapshot_error(e.to_string()))?;
        let snapshot = Self::parse(&content, format).map_err(snapshot_error)?;

        info!(
            "Loaded inventory snapshot {} with {} regions",
            path.display(),
            snapshot.regions.len()
        );
        Ok(Self::new(snapshot))
    }

    pub fn parse(content: &str, format: SnapshotFormat) -> Result<InventorySnapshot, String> {
        match format {
            SnapshotFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            SnapshotFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    pub fn snapshot(&self) -> &InventorySnapshot {
        &self.snapshot
    }
}

#[async_trait]
impl ResourceFetcher for SnapshotFetcher {
    async fn verify_session(&self) -> FetchResult<()> {
        Ok(())
    }

    async fn list_regions(&self) -> FetchResult<Vec<String>> {
        Ok(self.snapshot.regions.keys().cloned().collect())
    }

    async fn fetch_region(&self, region: &str) -> FetchResult<RegionInventory> {
        debug!("Serving region {} from snapshot", region);
        self.snapshot
            .regions
            .get(region)
            .cloned()
            .ok_or_else(|| FetchError::UnknownRegion(region.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SNAPSHOT_YAML: &str = r#"
Regions:
  eu-west-1:
    Vpcs:
      - VpcId: vpc-1
        CidrBlock: 10.0.0.0/16
  us-east-1:
    Vpcs: []
"#;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SnapshotFormat::from_path(Path::new("a/b.json")),
            Some(SnapshotFormat::Json)
        );
        assert_eq!(
            SnapshotFormat::from_path(Path::new("b.yml")),
            Some(SnapshotFormat::Yaml)
        );
        assert_eq!(SnapshotFormat::from_path(Path::new("b.csv")), None);
    }

    #[tokio::test]
    async fn test_snapshot_preserves_region_order() {
        let snapshot = SnapshotFetcher::parse(SNAPSHOT_YAML, SnapshotFormat::Yaml).unwrap();
        let fetcher = SnapshotFetcher::new(snapshot);
        assert_eq!(
            fetcher.list_regions().await.unwrap(),
            vec!["eu-west-1", "us-east-1"]
        );
        let inventory = fetcher.fetch_region("eu-west-1").await.unwrap();
        assert_eq!(inventory.vpcs[0].vpc_id, "vpc-1");
    }

    #[tokio::test]
    async fn test_unknown_region() {
        let fetcher = SnapshotFetcher::default();
        let err = fetcher.fetch_region("ap-south-1").await.unwrap_err();
        assert!(matches!(err, FetchError::UnknownRegion(ref r) if r == "ap-south-1"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(SNAPSHOT_YAML.as_bytes()).unwrap();
        let fetcher = SnapshotFetcher::from_file(file.path()).unwrap();
        assert_eq!(fetcher.snapshot().regions.len(), 2);
    }

    #[test]
    fn test_from_file_rejects_bad_content() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = SnapshotFetcher::from_file(file.path()).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, FetchError::Snapshot { .. }));
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let err = SnapshotFetcher::from_file(Path::new("inventory.txt")).unwrap_err();
        assert!(err.to_string().contains("unsupported extension"));
    }
}
