//! Agent interface: the body capability trait, AgentBehavior, AgentDecision,
//! and the read/dispatch handles the coordinator works through.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::geometry::Direction;

use super::grid_map::GridMap;
use super::rescuer::Assignment;
use super::types::{AgentStatus, BodyCosts, DiscoveredPoint, MoveResult, NeighborScan, PointId};

// ============================================================================
// Body capabilities (sense → move)
// ============================================================================

/// What an agent can do with its physical body.
///
/// The physical simulation that implements this trait is the only place that
/// knows absolute positions, walls and time accounting. Agents compose it in
/// rather than inherit from it, so policies can be driven by any body.
pub trait AgentBody {
    /// Tries to move one step towards `direction`.
    fn attempt_move(&mut self, direction: Direction) -> MoveResult;

    /// Clear / blocked / out-of-bounds for the eight neighbours, compass order.
    fn sense_neighbors(&mut self) -> NeighborScan;

    /// Point of interest at the current position, if any.
    fn sense_local_point(&mut self) -> Option<PointId>;

    /// Attribute vector of the point at the current position.
    fn read_point_attributes(&mut self, point: PointId) -> Option<Vec<f64>>;

    /// Services the point at the current position. Returns true the first
    /// time a point is serviced.
    fn first_aid(&mut self, point: PointId) -> bool;

    /// Remaining time budget.
    fn remaining_budget(&self) -> f64;

    fn costs(&self) -> BodyCosts;
}

// ============================================================================
// Agent behavior (one decision per cycle)
// ============================================================================

/// Core trait for agents driven by the lock-step runner.
///
/// The runner calls [`AgentBehavior::deliberate`] once per cycle for every
/// active agent. All continuation state lives in the agent itself.
pub trait AgentBehavior {
    fn agent_id(&self) -> &str;

    fn status(&self) -> AgentStatus;

    fn deliberate(&mut self, body: &mut dyn AgentBody) -> AgentDecision;

    /// Called by the driver once the agent reported it has no more work.
    fn deactivate(&mut self);
}

/// Outcome of one deliberation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentDecision {
    /// More work pending.
    Continue,
    /// No more work; the driver deactivates the agent.
    Finished,
}

impl AgentDecision {
    pub fn has_more_work(&self) -> bool {
        matches!(self, AgentDecision::Continue)
    }
}

impl From<bool> for AgentDecision {
    fn from(more_work: bool) -> Self {
        if more_work {
            AgentDecision::Continue
        } else {
            AgentDecision::Finished
        }
    }
}

// ============================================================================
// Coordinator-facing handles
// ============================================================================

/// Read access to an exploring agent's results.
pub trait ExplorerHandle: AgentBehavior {
    fn map(&self) -> &GridMap;
    fn discovered_points(&self) -> &BTreeMap<PointId, DiscoveredPoint>;
}

/// Dispatch access to a servicing agent.
pub trait ServiceHandle: AgentBehavior {
    fn costs(&self) -> BodyCosts;
    fn assign(&mut self, assignment: Assignment);
}
