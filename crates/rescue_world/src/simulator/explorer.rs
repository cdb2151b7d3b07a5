//! ExplorerAgent: depth-first exploration of an unknown grid with an explicit
//! backtracking stack, followed by an A* return to base.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::geometry::{Direction, DirectionPriority, GridCoord};

use super::agent::{AgentBehavior, AgentBody, AgentDecision, ExplorerHandle};
use super::grid_map::GridMap;
use super::planner::{estimate_path_cost, PathPlanner};
use super::types::{
    AgentId, AgentState, AgentStatus, DiscoveredPoint, MoveResult, NeighborOutcome, PointId,
    BASE, DEFAULT_RETURN_FRACTION, DEFAULT_RETURN_SAFETY_MARGIN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorerPhase {
    Exploring,
    Returning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorerOutcome {
    /// Back on the base cell.
    Returned,
    /// Ran out of budget (or of known moves) away from the base.
    Stranded,
}

/// Why an explorer stopped exploring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnTrigger {
    FrontierExhausted,
    BudgetFraction,
    SafetyMargin,
    MoveExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplorerSettings {
    pub priority: DirectionPriority,
    /// Fraction of the time limit after which exploration stops.
    pub return_fraction: f64,
    /// Exploration also stops once the remaining budget is within this factor
    /// of the estimated cost of the way back.
    pub return_safety_margin: f64,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            priority: DirectionPriority::default(),
            return_fraction: DEFAULT_RETURN_FRACTION,
            return_safety_margin: DEFAULT_RETURN_SAFETY_MARGIN,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerStats {
    pub forward_moves: u64,
    pub backtrack_moves: u64,
    pub return_moves: u64,
    pub bumps: u64,
    pub held_cycles: u64,
}

#[derive(Debug, Clone)]
pub struct ExplorerAgent {
    id: AgentId,
    settings: ExplorerSettings,
    phase: ExplorerPhase,
    state: AgentState,
    map: GridMap,
    points: BTreeMap<PointId, DiscoveredPoint>,
    planner: PathPlanner,
    stats: ExplorerStats,
    trigger: Option<ReturnTrigger>,
    outcome: Option<ExplorerOutcome>,
}

impl ExplorerAgent {
    pub fn new(id: impl Into<AgentId>, settings: ExplorerSettings) -> Self {
        Self {
            id: id.into(),
            settings,
            phase: ExplorerPhase::Exploring,
            state: AgentState::at_base(),
            map: GridMap::new(),
            points: BTreeMap::new(),
            planner: PathPlanner::with_neighbor_order(settings.priority),
            stats: ExplorerStats::default(),
            trigger: None,
            outcome: None,
        }
    }

    pub fn phase(&self) -> ExplorerPhase {
        self.phase
    }

    pub fn coord(&self) -> GridCoord {
        self.state.coord
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn settings(&self) -> &ExplorerSettings {
        &self.settings
    }

    pub fn stats(&self) -> ExplorerStats {
        self.stats
    }

    pub fn outcome(&self) -> Option<ExplorerOutcome> {
        self.outcome
    }

    pub fn return_trigger(&self) -> Option<ReturnTrigger> {
        self.trigger
    }

    pub fn points(&self) -> &BTreeMap<PointId, DiscoveredPoint> {
        &self.points
    }

    /// Senses the current cell and records it in the map. A point of
    /// interest found here is read once and kept.
    fn record_arrival(&mut self, body: &mut dyn AgentBody, difficulty: f64) {
        let coord = self.state.coord;
        let outcomes = body.sense_neighbors();
        let point = body.sense_local_point();
        if let Some(point_id) = point {
            if !self.points.contains_key(&point_id) {
                let attributes = body.read_point_attributes(point_id).unwrap_or_default();
                info!(agent_id = %self.id, point = point_id, x = coord.x, y = coord.y, "point discovered");
                self.points
                    .insert(point_id, DiscoveredPoint::new(point_id, coord, attributes));
            }
        }
        self.map.add(coord, difficulty, point, outcomes);
    }

    fn begin_return(&mut self, trigger: ReturnTrigger) {
        if self.phase == ExplorerPhase::Returning {
            return;
        }
        info!(
            agent_id = %self.id,
            ?trigger,
            x = self.state.coord.x,
            y = self.state.coord.y,
            cells = self.map.len(),
            points = self.points.len(),
            "exploring -> returning"
        );
        self.phase = ExplorerPhase::Returning;
        self.trigger = Some(trigger);
        self.state.plan.clear();
    }

    fn finish(&mut self, outcome: ExplorerOutcome) -> AgentDecision {
        match outcome {
            ExplorerOutcome::Returned => info!(agent_id = %self.id, "explorer back at base"),
            ExplorerOutcome::Stranded => warn!(
                agent_id = %self.id,
                x = self.state.coord.x,
                y = self.state.coord.y,
                "explorer stranded away from base"
            ),
        }
        self.outcome = Some(outcome);
        self.state.plan.clear();
        AgentDecision::Finished
    }

    fn return_due(&self, body: &dyn AgentBody) -> Option<ReturnTrigger> {
        let costs = body.costs();
        let remaining = body.remaining_budget();
        let consumed = costs.time_limit - remaining;
        if consumed >= self.settings.return_fraction * costs.time_limit {
            return Some(ReturnTrigger::BudgetFraction);
        }
        if self.state.is_at_base() {
            return None;
        }
        let path = self.planner.plan(&self.map, self.state.coord, BASE).ok()?;
        let estimate = estimate_path_cost(&self.map, &path, &costs);
        if remaining <= self.settings.return_safety_margin * estimate {
            return Some(ReturnTrigger::SafetyMargin);
        }
        None
    }

    fn next_frontier_move(&self, body: &mut dyn AgentBody) -> Option<Direction> {
        let scan = body.sense_neighbors();
        let recorded = self.map.get(self.state.coord).map(|cell| cell.outcomes);
        self.settings.priority.iter().find(|direction| {
            scan.get(*direction) == NeighborOutcome::Clear
                && recorded.map_or(true, |outcomes| outcomes.get(*direction).is_passable())
                && !self.map.is_known(self.state.coord.offset(*direction))
        })
    }

    fn explore_step(&mut self, body: &mut dyn AgentBody) -> AgentDecision {
        if let Some(direction) = self.next_frontier_move(body) {
            let from = self.state.coord;
            let before = body.remaining_budget();
            match body.attempt_move(direction) {
                MoveResult::Executed => {
                    let spent = before - body.remaining_budget();
                    let difficulty = spent / body.costs().step_cost(direction);
                    self.state.backtrack.push(from);
                    self.state.coord = from.offset(direction);
                    self.stats.forward_moves += 1;
                    debug!(agent_id = %self.id, %direction, x = self.state.coord.x, y = self.state.coord.y, difficulty, "explored");
                    self.record_arrival(body, difficulty);
                }
                MoveResult::Blocked => {
                    warn!(agent_id = %self.id, %direction, x = from.x, y = from.y, "bumped into unexpected obstacle");
                    self.stats.bumps += 1;
                    self.map
                        .record_outcome(from, direction, NeighborOutcome::Blocked);
                }
                MoveResult::Exhausted => {
                    self.begin_return(ReturnTrigger::MoveExhausted);
                }
            }
            return AgentDecision::Continue;
        }

        let Some(previous) = self.state.backtrack.pop() else {
            self.begin_return(ReturnTrigger::FrontierExhausted);
            return self.return_step(body);
        };
        let Some(direction) = self.state.coord.step_to(previous) else {
            // The stack only ever holds cells adjacent to their successor.
            self.state.backtrack.push(previous);
            self.begin_return(ReturnTrigger::FrontierExhausted);
            return self.return_step(body);
        };
        match body.attempt_move(direction) {
            MoveResult::Executed => {
                self.state.coord = previous;
                self.stats.backtrack_moves += 1;
                debug!(agent_id = %self.id, %direction, x = previous.x, y = previous.y, depth = self.state.backtrack.len(), "backtracked");
            }
            MoveResult::Blocked => {
                self.state.backtrack.push(previous);
                self.stats.bumps += 1;
                self.stats.held_cycles += 1;
                warn!(agent_id = %self.id, %direction, "backtrack move blocked, holding position");
            }
            MoveResult::Exhausted => {
                self.state.backtrack.push(previous);
                self.begin_return(ReturnTrigger::MoveExhausted);
            }
        }
        AgentDecision::Continue
    }

    fn return_step(&mut self, body: &mut dyn AgentBody) -> AgentDecision {
        if self.state.is_at_base() {
            return self.finish(ExplorerOutcome::Returned);
        }
        if body.remaining_budget() <= 0.0 {
            return self.finish(ExplorerOutcome::Stranded);
        }
        if self.state.plan.is_empty() {
            match self.planner.plan(&self.map, self.state.coord, BASE) {
                Ok(path) => {
                    debug!(agent_id = %self.id, steps = path.step_count(), "return path planned");
                    self.state.plan = path.moves();
                }
                Err(err) => {
                    warn!(agent_id = %self.id, error = %err, "no return path, retracing backtrack stack");
                    if let Some(direction) = self
                        .state
                        .backtrack
                        .last()
                        .and_then(|previous| self.state.coord.step_to(*previous))
                    {
                        self.state.plan.push_back(direction);
                    }
                }
            }
        }

        let Some(direction) = self.state.plan.pop_front() else {
            return self.finish(ExplorerOutcome::Stranded);
        };
        match body.attempt_move(direction) {
            MoveResult::Executed => {
                self.state.coord = self.state.coord.offset(direction);
                self.stats.return_moves += 1;
                if self.state.backtrack.last() == Some(&self.state.coord) {
                    self.state.backtrack.pop();
                }
                debug!(agent_id = %self.id, %direction, x = self.state.coord.x, y = self.state.coord.y, "returning");
                if self.state.is_at_base() {
                    return self.finish(ExplorerOutcome::Returned);
                }
                AgentDecision::Continue
            }
            MoveResult::Blocked => {
                warn!(agent_id = %self.id, %direction, "return move blocked, replanning");
                self.stats.bumps += 1;
                self.map
                    .record_outcome(self.state.coord, direction, NeighborOutcome::Blocked);
                self.state.plan.clear();
                AgentDecision::Continue
            }
            MoveResult::Exhausted => self.finish(ExplorerOutcome::Stranded),
        }
    }
}

impl AgentBehavior for ExplorerAgent {
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
        if !self.map.is_known(self.state.coord) {
            self.record_arrival(body, 1.0);
        }
        match self.phase {
            ExplorerPhase::Exploring => {
                if let Some(trigger) = self.return_due(body) {
                    self.begin_return(trigger);
                    return self.return_step(body);
                }
                self.explore_step(body)
            }
            ExplorerPhase::Returning => self.return_step(body),
        }
    }

    fn deactivate(&mut self) {
        self.state.status = AgentStatus::Idle;
    }
}

impl ExplorerHandle for ExplorerAgent {
    fn map(&self) -> &GridMap {
        &self.map
    }

    fn discovered_points(&self) -> &BTreeMap<PointId, DiscoveredPoint> {
        &self.points
    }
}
