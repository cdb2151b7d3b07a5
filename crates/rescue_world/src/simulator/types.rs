//! Core type definitions: IDs, constants, agent state and sensing results.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::geometry::{Direction, GridCoord};

// ============================================================================
// Type Aliases
// ============================================================================

pub type AgentId = String;
pub type PointId = u32;
pub type Cycle = u64;

// ============================================================================
// Constants
// ============================================================================

pub const DEFAULT_TIME_LIMIT: f64 = 1000.0;
pub const DEFAULT_COST_LINE: f64 = 1.0;
pub const DEFAULT_COST_DIAG: f64 = 1.5;
pub const DEFAULT_COST_READ: f64 = 2.0;
pub const DEFAULT_COST_FIRST_AID: f64 = 1.0;
pub const DEFAULT_RETURN_FRACTION: f64 = 0.5;
pub const DEFAULT_RETURN_SAFETY_MARGIN: f64 = 1.5;
pub const DEFAULT_PARTITION_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_MAX_CYCLES: u64 = 10_000;
pub const REPORT_VERSION: u32 = 1;

/// Base cell of every team; agent coordinates are relative to it.
pub const BASE: GridCoord = GridCoord::ORIGIN;

// ============================================================================
// Sensing
// ============================================================================

/// What is known about the neighbour of a cell in one compass direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborOutcome {
    Clear,
    Blocked,
    OutOfBounds,
    #[default]
    Unknown,
}

impl NeighborOutcome {
    pub fn is_passable(self) -> bool {
        !matches!(self, NeighborOutcome::Blocked | NeighborOutcome::OutOfBounds)
    }
}

/// 8-slot outcome vector in compass order (N, NE, E, SE, S, SW, W, NW).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeighborScan(pub [NeighborOutcome; 8]);

impl NeighborScan {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn all_clear() -> Self {
        Self([NeighborOutcome::Clear; 8])
    }

    pub fn get(&self, direction: Direction) -> NeighborOutcome {
        self.0[direction.index()]
    }

    pub fn set(&mut self, direction: Direction, outcome: NeighborOutcome) {
        self.0[direction.index()] = outcome;
    }
}

/// Result of asking the body to move one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveResult {
    Executed,
    Blocked,
    /// The remaining time budget cannot pay for the move; nothing changed.
    Exhausted,
}

/// Time costs of one agent body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyCosts {
    pub time_limit: f64,
    pub cost_line: f64,
    pub cost_diag: f64,
    pub cost_read: f64,
    pub cost_first_aid: f64,
}

impl Default for BodyCosts {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            cost_line: DEFAULT_COST_LINE,
            cost_diag: DEFAULT_COST_DIAG,
            cost_read: DEFAULT_COST_READ,
            cost_first_aid: DEFAULT_COST_FIRST_AID,
        }
    }
}

impl BodyCosts {
    pub fn step_cost(&self, direction: Direction) -> f64 {
        if direction.is_diagonal() {
            self.cost_diag
        } else {
            self.cost_line
        }
    }

    pub fn sanitized(mut self) -> Self {
        let defaults = BodyCosts::default();
        let positive = |value: f64| value.is_finite() && value > 0.0;
        let non_negative = |value: f64| value.is_finite() && value >= 0.0;
        if !positive(self.time_limit) {
            self.time_limit = defaults.time_limit;
        }
        if !positive(self.cost_line) {
            self.cost_line = defaults.cost_line;
        }
        if !positive(self.cost_diag) {
            self.cost_diag = defaults.cost_diag;
        }
        if !non_negative(self.cost_read) {
            self.cost_read = defaults.cost_read;
        }
        if !non_negative(self.cost_first_aid) {
            self.cost_first_aid = defaults.cost_first_aid;
        }
        self
    }
}

// ============================================================================
// Points of interest
// ============================================================================

/// A point of interest recorded at discovery time. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredPoint {
    pub id: PointId,
    pub coord: GridCoord,
    pub attributes: Vec<f64>,
}

impl DiscoveredPoint {
    pub fn new(id: PointId, coord: GridCoord, attributes: Vec<f64>) -> Self {
        Self {
            id,
            coord,
            attributes,
        }
    }
}

// ============================================================================
// Agent state
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Active,
    Idle,
}

/// Everything an agent needs to resume on its next cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentState {
    pub coord: GridCoord,
    /// Previously visited coordinates, most recent last.
    pub backtrack: Vec<GridCoord>,
    pub status: AgentStatus,
    /// Moves still to execute, front first.
    pub plan: VecDeque<Direction>,
}

impl AgentState {
    pub fn at_base() -> Self {
        Self {
            coord: BASE,
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    pub fn is_at_base(&self) -> bool {
        self.coord == BASE
    }
}
