//! RescuerAgent: waits at base until dispatched, then walks its route one
//! step per cycle and gives first aid at every assigned point on the way.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::geometry::GridCoord;

use super::agent::{AgentBehavior, AgentBody, AgentDecision, ServiceHandle};
use super::partition::Cluster;
use super::planner::Route;
use super::types::{AgentId, AgentState, AgentStatus, BodyCosts, MoveResult, PointId};

/// A cluster and the route computed for it. Written once by the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub cluster: Cluster,
    pub route: Route,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescuerOutcome {
    Completed,
    /// A planned move was blocked; the agent stops where it stands.
    Blocked,
    /// The time budget ran out before the route was done.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct RescuerAgent {
    id: AgentId,
    costs: BodyCosts,
    state: AgentState,
    assignment: Option<Assignment>,
    pending: BTreeMap<GridCoord, Vec<PointId>>,
    rescued: Vec<PointId>,
    moves: u64,
    outcome: Option<RescuerOutcome>,
}

impl RescuerAgent {
    pub fn new(id: impl Into<AgentId>, costs: BodyCosts) -> Self {
        Self {
            id: id.into(),
            costs,
            state: AgentState::at_base(),
            assignment: None,
            pending: BTreeMap::new(),
            rescued: Vec::new(),
            moves: 0,
            outcome: None,
        }
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    pub fn rescued(&self) -> &[PointId] {
        &self.rescued
    }

    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn outcome(&self) -> Option<RescuerOutcome> {
        self.outcome
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    fn aid_here(&mut self, body: &mut dyn AgentBody) {
        let Some(points) = self.pending.remove(&self.state.coord) else {
            return;
        };
        for point in points {
            if body.first_aid(point) {
                info!(agent_id = %self.id, point, x = self.state.coord.x, y = self.state.coord.y, "first aid given");
                self.rescued.push(point);
            } else {
                warn!(agent_id = %self.id, point, "first aid not applied");
            }
        }
    }

    fn finish(&mut self, outcome: RescuerOutcome) -> AgentDecision {
        info!(
            agent_id = %self.id,
            ?outcome,
            rescued = self.rescued.len(),
            left = self.pending.values().map(Vec::len).sum::<usize>(),
            "rescuer done"
        );
        self.outcome = Some(outcome);
        self.state.plan.clear();
        AgentDecision::Finished
    }
}

impl AgentBehavior for RescuerAgent {
    fn agent_id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> AgentStatus {
        self.state.status
    }

    fn deliberate(&mut self, body: &mut dyn AgentBody) -> AgentDecision {
        if !self.state.is_active() || self.outcome.is_some() {
            return AgentDecision::Finished;
        }
        if self.assignment.is_none() {
            return AgentDecision::Continue;
        }

        self.aid_here(body);
        let Some(direction) = self.state.plan.pop_front() else {
            return self.finish(RescuerOutcome::Completed);
        };
        match body.attempt_move(direction) {
            MoveResult::Executed => {
                self.state.coord = self.state.coord.offset(direction);
                self.moves += 1;
                debug!(agent_id = %self.id, %direction, x = self.state.coord.x, y = self.state.coord.y, "rescuer moved");
                self.aid_here(body);
                if self.state.plan.is_empty() {
                    return self.finish(RescuerOutcome::Completed);
                }
                AgentDecision::Continue
            }
            MoveResult::Blocked => {
                warn!(agent_id = %self.id, %direction, x = self.state.coord.x, y = self.state.coord.y, "planned move blocked, stopping");
                self.finish(RescuerOutcome::Blocked)
            }
            MoveResult::Exhausted => {
                warn!(agent_id = %self.id, remaining = body.remaining_budget(), "budget exhausted, stopping");
                self.finish(RescuerOutcome::Exhausted)
            }
        }
    }

    fn deactivate(&mut self) {
        self.state.status = AgentStatus::Idle;
    }
}

impl ServiceHandle for RescuerAgent {
    fn costs(&self) -> BodyCosts {
        self.costs
    }

    /// Accepts the first assignment only; clusters are never reassigned.
    fn assign(&mut self, assignment: Assignment) {
        if self.assignment.is_some() {
            warn!(agent_id = %self.id, cluster = assignment.cluster.id, "already assigned, ignoring");
            return;
        }
        self.pending.clear();
        for visit in &assignment.route.visits {
            self.pending.entry(visit.coord).or_default().push(visit.point);
        }
        self.state.plan = assignment.route.moves();
        info!(
            agent_id = %self.id,
            cluster = assignment.cluster.id,
            points = assignment.cluster.len(),
            planned = assignment.route.visits.len(),
            skipped = assignment.route.skipped.len(),
            moves = self.state.plan.len(),
            "assignment received"
        );
        self.assignment = Some(assignment);
    }
}
