//! Result output: per-cluster record files and the JSON mission report.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::coordinator::CoordinatorPhase;
use super::explorer::{ExplorerOutcome, ExplorerStats};
use super::partition::Cluster;
use super::rescuer::RescuerOutcome;
use super::types::{AgentId, Cycle, PointId, REPORT_VERSION};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
    #[error("unsupported {kind} version {version}, expected {expected}")]
    UnsupportedVersion {
        kind: String,
        version: u32,
        expected: u32,
    },
}

impl From<io::Error> for PersistError {
    fn from(err: io::Error) -> Self {
        PersistError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(err: serde_json::Error) -> Self {
        PersistError::Serde(err.to_string())
    }
}

// ============================================================================
// Cluster files
// ============================================================================

pub fn cluster_file_name(cluster: &Cluster) -> String {
    format!("cluster{}.txt", cluster.id)
}

/// Writes `cluster<n>.txt` into `dir` for every cluster, one
/// `point_id,x,y,attribute...` line per point. Returns the written paths.
pub fn write_cluster_files(
    dir: impl AsRef<Path>,
    clusters: &[Cluster],
) -> Result<Vec<PathBuf>, PersistError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        let path = dir.join(cluster_file_name(cluster));
        let mut file = io::BufWriter::new(fs::File::create(&path)?);
        for point in &cluster.points {
            let mut fields = vec![
                point.id.to_string(),
                point.coord.x.to_string(),
                point.coord.y.to_string(),
            ];
            fields.extend(point.attributes.iter().map(|value| value.to_string()));
            writeln!(file, "{}", fields.join(","))?;
        }
        file.flush()?;
        written.push(path);
    }
    Ok(written)
}

// ============================================================================
// Mission report
// ============================================================================

fn default_report_version() -> u32 {
    REPORT_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionReport {
    #[serde(default = "default_report_version")]
    pub version: u32,
    pub cycles: Cycle,
    /// True when the coordinator reached its terminal phase.
    pub completed: bool,
    pub phase: CoordinatorPhase,
    pub partition_runs: u32,
    pub merged_cells: usize,
    pub points_total: usize,
    pub points_discovered: usize,
    pub points_rescued: usize,
    pub explorers: Vec<ExplorerReport>,
    pub rescuers: Vec<RescuerReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerReport {
    pub agent_id: AgentId,
    pub outcome: Option<ExplorerOutcome>,
    pub cells_mapped: usize,
    pub points_found: usize,
    pub remaining_budget: f64,
    pub stats: ExplorerStats,
    pub decisions: u64,
    pub idle_since: Option<Cycle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescuerReport {
    pub agent_id: AgentId,
    pub cluster_id: Option<usize>,
    pub assigned: Vec<PointId>,
    pub rescued: Vec<PointId>,
    pub skipped: Vec<PointId>,
    pub outcome: Option<RescuerOutcome>,
    pub remaining_budget: f64,
    pub decisions: u64,
    pub idle_since: Option<Cycle>,
}

impl MissionReport {
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(input: &str) -> Result<Self, PersistError> {
        let report: Self = serde_json::from_str(input)?;
        report.validate_version()?;
        Ok(report)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        write_json_to_path(self, path.as_ref())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let report: Self = read_json_from_path(path.as_ref())?;
        report.validate_version()?;
        Ok(report)
    }

    fn validate_version(&self) -> Result<(), PersistError> {
        if self.version == REPORT_VERSION {
            Ok(())
        } else {
            Err(PersistError::UnsupportedVersion {
                kind: "report".to_string(),
                version: self.version,
                expected: REPORT_VERSION,
            })
        }
    }
}

pub(crate) fn write_json_to_path<T: Serialize>(value: &T, path: &Path) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(value)?;
    fs::write(path, data)?;
    Ok(())
}

pub(crate) fn read_json_from_path<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}
