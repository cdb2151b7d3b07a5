//! Mission configuration: layout, team sizes, body costs, partition tuning.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::geometry::{DirectionPriority, GridCoord};

use super::explorer::ExplorerSettings;
use super::types::{
    BodyCosts, DEFAULT_MAX_CYCLES, DEFAULT_PARTITION_MAX_ITERATIONS, DEFAULT_RETURN_FRACTION,
    DEFAULT_RETURN_SAFETY_MARGIN,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("invalid mission toml: {0}")]
    Parse(String),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("unknown scenario {0:?}")]
    UnknownScenario(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub seed: u64,
    pub max_cycles: u64,
    pub environment: EnvironmentConfig,
    pub explorers: ExplorerTeamConfig,
    pub rescuers: RescuerTeamConfig,
    pub partition: PartitionConfig,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_cycles: DEFAULT_MAX_CYCLES,
            environment: EnvironmentConfig::default(),
            explorers: ExplorerTeamConfig::default(),
            rescuers: RescuerTeamConfig::default(),
            partition: PartitionConfig::default(),
        }
    }
}

impl MissionConfig {
    pub fn sanitized(mut self) -> Self {
        if self.max_cycles == 0 {
            self.max_cycles = DEFAULT_MAX_CYCLES;
        }
        self.explorers = self.explorers.sanitized();
        self.rescuers = self.rescuers.sanitized();
        self.partition = self.partition.sanitized();
        self
    }

    /// Checks what `sanitized` cannot repair. Layout problems (walls or
    /// points outside the grid) are reported when the environment is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment.width <= 0 || self.environment.height <= 0 {
            return Err(ConfigError::Invalid {
                field: "environment.width/height",
                reason: format!(
                    "must be positive, got {}x{}",
                    self.environment.width, self.environment.height
                ),
            });
        }
        if self.explorers.count == 0 {
            return Err(ConfigError::Invalid {
                field: "explorers.count",
                reason: "at least one explorer is required".to_string(),
            });
        }
        if self.explorers.priorities.len() > self.explorers.count {
            return Err(ConfigError::Invalid {
                field: "explorers.priorities",
                reason: format!(
                    "{} priority lists for {} explorers",
                    self.explorers.priorities.len(),
                    self.explorers.count
                ),
            });
        }
        Ok(())
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: MissionConfig =
            toml::from_str(input).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let config = config.sanitized();
        config.validate()?;
        Ok(config)
    }

    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&input)
    }
}

/// Absolute layout of the area. `base` is where every agent starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub width: i32,
    pub height: i32,
    pub base: GridCoord,
    pub walls: Vec<GridCoord>,
    pub points: Vec<PointConfig>,
    pub difficulties: Vec<DifficultyConfig>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            base: GridCoord::new(2, 2),
            walls: Vec::new(),
            points: Vec::new(),
            difficulties: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointConfig {
    pub coord: GridCoord,
    #[serde(default)]
    pub attributes: Vec<f64>,
}

impl PointConfig {
    pub fn new(x: i32, y: i32, attributes: Vec<f64>) -> Self {
        Self {
            coord: GridCoord::new(x, y),
            attributes,
        }
    }
}

/// Terrain multiplier applied to the cost of entering `coord`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    pub coord: GridCoord,
    pub difficulty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerTeamConfig {
    pub count: usize,
    pub id_prefix: String,
    /// Per-explorer direction orders, possibly partial. Explorers without an
    /// entry use the rotated team default.
    pub priorities: Vec<DirectionPriority>,
    pub body: BodyCosts,
    pub return_fraction: f64,
    pub return_safety_margin: f64,
}

impl Default for ExplorerTeamConfig {
    fn default() -> Self {
        Self {
            count: 4,
            id_prefix: "explorer-".to_string(),
            priorities: Vec::new(),
            body: BodyCosts::default(),
            return_fraction: DEFAULT_RETURN_FRACTION,
            return_safety_margin: DEFAULT_RETURN_SAFETY_MARGIN,
        }
    }
}

impl ExplorerTeamConfig {
    pub fn sanitized(mut self) -> Self {
        if self.id_prefix.is_empty() {
            self.id_prefix = "explorer-".to_string();
        }
        self.body = self.body.sanitized();
        if !self.return_fraction.is_finite() || self.return_fraction <= 0.0 {
            self.return_fraction = DEFAULT_RETURN_FRACTION;
        }
        self.return_fraction = self.return_fraction.min(1.0);
        if !self.return_safety_margin.is_finite() || self.return_safety_margin < 1.0 {
            self.return_safety_margin = DEFAULT_RETURN_SAFETY_MARGIN;
        }
        self
    }

    pub fn agent_id(&self, index: usize) -> String {
        format!("{}{}", self.id_prefix, index + 1)
    }

    pub fn settings_for(&self, index: usize) -> ExplorerSettings {
        ExplorerSettings {
            priority: self
                .priorities
                .get(index)
                .copied()
                .unwrap_or_else(|| DirectionPriority::for_team_member(index)),
            return_fraction: self.return_fraction,
            return_safety_margin: self.return_safety_margin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RescuerTeamConfig {
    pub count: usize,
    pub id_prefix: String,
    pub body: BodyCosts,
}

impl Default for RescuerTeamConfig {
    fn default() -> Self {
        Self {
            count: 4,
            id_prefix: "rescuer-".to_string(),
            body: BodyCosts::default(),
        }
    }
}

impl RescuerTeamConfig {
    pub fn sanitized(mut self) -> Self {
        if self.id_prefix.is_empty() {
            self.id_prefix = "rescuer-".to_string();
        }
        self.body = self.body.sanitized();
        self
    }

    pub fn agent_id(&self, index: usize) -> String {
        format!("{}{}", self.id_prefix, index + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    pub max_iterations: usize,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_PARTITION_MAX_ITERATIONS,
        }
    }
}

impl PartitionConfig {
    pub fn sanitized(mut self) -> Self {
        if self.max_iterations == 0 {
            self.max_iterations = DEFAULT_PARTITION_MAX_ITERATIONS;
        }
        self
    }
}
