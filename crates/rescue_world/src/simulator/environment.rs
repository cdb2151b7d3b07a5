//! GridEnvironment: the physical side of a mission.
//!
//! Holds the true layout (bounds, walls, terrain difficulty, points of
//! interest) and every agent body's position and time budget. Coordinates
//! here are absolute; agents only ever see coordinates relative to the base.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

use crate::geometry::{Direction, GridCoord};

use super::agent::AgentBody;
use super::config::EnvironmentConfig;
use super::types::{AgentId, BodyCosts, MoveResult, NeighborOutcome, NeighborScan, PointId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvironmentError {
    #[error("grid size must be positive, got {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    #[error("base {base} lies outside the grid")]
    BaseOutOfBounds { base: GridCoord },
    #[error("base {base} is a wall")]
    BaseBlocked { base: GridCoord },
    #[error("wall {coord} lies outside the grid")]
    WallOutOfBounds { coord: GridCoord },
    #[error("point at {coord} lies outside the grid")]
    PointOutOfBounds { coord: GridCoord },
    #[error("point at {coord} is inside a wall")]
    PointOnWall { coord: GridCoord },
    #[error("more than one point at {coord}")]
    DuplicatePoint { coord: GridCoord },
    #[error("difficulty at {coord} must be positive, got {difficulty}")]
    InvalidDifficulty { coord: GridCoord, difficulty: f64 },
    #[error("agent {agent_id} is already spawned")]
    DuplicateAgent { agent_id: AgentId },
    #[error("agent {agent_id} is not spawned")]
    UnknownAgent { agent_id: AgentId },
}

#[derive(Debug, Clone, PartialEq)]
struct GridLayout {
    width: i32,
    height: i32,
    base: GridCoord,
    walls: HashSet<GridCoord>,
    difficulty: HashMap<GridCoord, f64>,
}

impl GridLayout {
    fn contains(&self, coord: GridCoord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }

    fn outcome(&self, coord: GridCoord) -> NeighborOutcome {
        if !self.contains(coord) {
            NeighborOutcome::OutOfBounds
        } else if self.walls.contains(&coord) {
            NeighborOutcome::Blocked
        } else {
            NeighborOutcome::Clear
        }
    }

    fn difficulty(&self, coord: GridCoord) -> f64 {
        self.difficulty.get(&coord).copied().unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvPoint {
    pub id: PointId,
    pub attributes: Vec<f64>,
    pub aided_by: BTreeSet<AgentId>,
}

#[derive(Debug, Clone, PartialEq)]
struct BodyState {
    agent_id: AgentId,
    position: GridCoord,
    remaining: f64,
    costs: BodyCosts,
}

impl BodyState {
    fn pay(&mut self, cost: f64) -> bool {
        if cost > self.remaining {
            return false;
        }
        self.remaining -= cost;
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridEnvironment {
    layout: GridLayout,
    points: BTreeMap<GridCoord, EnvPoint>,
    bodies: BTreeMap<AgentId, BodyState>,
}

impl GridEnvironment {
    pub fn from_config(config: &EnvironmentConfig) -> Result<Self, EnvironmentError> {
        if config.width <= 0 || config.height <= 0 {
            return Err(EnvironmentError::InvalidSize {
                width: config.width,
                height: config.height,
            });
        }
        let mut layout = GridLayout {
            width: config.width,
            height: config.height,
            base: config.base,
            walls: HashSet::new(),
            difficulty: HashMap::new(),
        };
        if !layout.contains(config.base) {
            return Err(EnvironmentError::BaseOutOfBounds { base: config.base });
        }
        for wall in &config.walls {
            if !layout.contains(*wall) {
                return Err(EnvironmentError::WallOutOfBounds { coord: *wall });
            }
            if *wall == config.base {
                return Err(EnvironmentError::BaseBlocked { base: config.base });
            }
            layout.walls.insert(*wall);
        }
        for terrain in &config.difficulties {
            if !(terrain.difficulty.is_finite() && terrain.difficulty > 0.0) {
                return Err(EnvironmentError::InvalidDifficulty {
                    coord: terrain.coord,
                    difficulty: terrain.difficulty,
                });
            }
            layout.difficulty.insert(terrain.coord, terrain.difficulty);
        }

        let mut points = BTreeMap::new();
        for (index, spec) in config.points.iter().enumerate() {
            match layout.outcome(spec.coord) {
                NeighborOutcome::OutOfBounds => {
                    return Err(EnvironmentError::PointOutOfBounds { coord: spec.coord })
                }
                NeighborOutcome::Blocked => {
                    return Err(EnvironmentError::PointOnWall { coord: spec.coord })
                }
                _ => {}
            }
            let point = EnvPoint {
                id: index as PointId,
                attributes: spec.attributes.clone(),
                aided_by: BTreeSet::new(),
            };
            if points.insert(spec.coord, point).is_some() {
                return Err(EnvironmentError::DuplicatePoint { coord: spec.coord });
            }
        }

        Ok(Self {
            layout,
            points,
            bodies: BTreeMap::new(),
        })
    }

    /// Places a new body on the base with a full time budget.
    pub fn spawn(&mut self, agent_id: &str, costs: BodyCosts) -> Result<(), EnvironmentError> {
        if self.bodies.contains_key(agent_id) {
            return Err(EnvironmentError::DuplicateAgent {
                agent_id: agent_id.to_string(),
            });
        }
        self.bodies.insert(
            agent_id.to_string(),
            BodyState {
                agent_id: agent_id.to_string(),
                position: self.layout.base,
                remaining: costs.time_limit,
                costs,
            },
        );
        Ok(())
    }

    /// The body of `agent_id`, ready to be driven for one cycle.
    pub fn body(&mut self, agent_id: &str) -> Option<EnvBody<'_>> {
        let state = self.bodies.get_mut(agent_id)?;
        Some(EnvBody {
            layout: &self.layout,
            points: &mut self.points,
            state,
        })
    }

    pub fn width(&self) -> i32 {
        self.layout.width
    }

    pub fn height(&self) -> i32 {
        self.layout.height
    }

    pub fn base(&self) -> GridCoord {
        self.layout.base
    }

    pub fn to_relative(&self, absolute: GridCoord) -> GridCoord {
        absolute - self.layout.base
    }

    pub fn to_absolute(&self, relative: GridCoord) -> GridCoord {
        relative + self.layout.base
    }

    /// Position of an agent relative to the base.
    pub fn position_of(&self, agent_id: &str) -> Result<GridCoord, EnvironmentError> {
        self.bodies
            .get(agent_id)
            .map(|body| self.to_relative(body.position))
            .ok_or_else(|| EnvironmentError::UnknownAgent {
                agent_id: agent_id.to_string(),
            })
    }

    pub fn remaining_budget_of(&self, agent_id: &str) -> Result<f64, EnvironmentError> {
        self.bodies
            .get(agent_id)
            .map(|body| body.remaining)
            .ok_or_else(|| EnvironmentError::UnknownAgent {
                agent_id: agent_id.to_string(),
            })
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Points, keyed by their coordinate relative to the base.
    pub fn points(&self) -> impl Iterator<Item = (GridCoord, &EnvPoint)> + '_ {
        self.points
            .iter()
            .map(move |(coord, point)| (self.to_relative(*coord), point))
    }

    pub fn aided_points(&self) -> Vec<PointId> {
        self.points
            .values()
            .filter(|point| !point.aided_by.is_empty())
            .map(|point| point.id)
            .collect()
    }

    pub fn is_passable(&self, absolute: GridCoord) -> bool {
        self.layout.outcome(absolute) == NeighborOutcome::Clear
    }
}

/// One agent's body, borrowed from the environment for the length of a
/// decision.
#[derive(Debug)]
pub struct EnvBody<'a> {
    layout: &'a GridLayout,
    points: &'a mut BTreeMap<GridCoord, EnvPoint>,
    state: &'a mut BodyState,
}

impl EnvBody<'_> {
    pub fn agent_id(&self) -> &str {
        &self.state.agent_id
    }

    fn point_here_with_id(&mut self, point: PointId) -> Option<&mut EnvPoint> {
        self.points
            .get_mut(&self.state.position)
            .filter(|here| here.id == point)
    }
}

impl AgentBody for EnvBody<'_> {
    fn attempt_move(&mut self, direction: Direction) -> MoveResult {
        let target = self.state.position.offset(direction);
        let base_cost = self.state.costs.step_cost(direction);
        match self.layout.outcome(target) {
            NeighborOutcome::Clear | NeighborOutcome::Unknown => {
                let cost = base_cost * self.layout.difficulty(target);
                if !self.state.pay(cost) {
                    return MoveResult::Exhausted;
                }
                self.state.position = target;
                MoveResult::Executed
            }
            NeighborOutcome::Blocked | NeighborOutcome::OutOfBounds => {
                if !self.state.pay(base_cost) {
                    return MoveResult::Exhausted;
                }
                debug!(agent_id = %self.state.agent_id, %direction, "move bumped");
                MoveResult::Blocked
            }
        }
    }

    fn sense_neighbors(&mut self) -> NeighborScan {
        let mut scan = NeighborScan::unknown();
        for direction in Direction::ALL {
            scan.set(
                direction,
                self.layout.outcome(self.state.position.offset(direction)),
            );
        }
        scan
    }

    fn sense_local_point(&mut self) -> Option<PointId> {
        self.points.get(&self.state.position).map(|point| point.id)
    }

    fn read_point_attributes(&mut self, point: PointId) -> Option<Vec<f64>> {
        let cost = self.state.costs.cost_read;
        let attributes = self.point_here_with_id(point)?.attributes.clone();
        if !self.state.pay(cost) {
            return None;
        }
        Some(attributes)
    }

    fn first_aid(&mut self, point: PointId) -> bool {
        let cost = self.state.costs.cost_first_aid;
        let already_aided = match self.point_here_with_id(point) {
            Some(here) => !here.aided_by.is_empty(),
            None => return false,
        };
        if already_aided || !self.state.pay(cost) {
            return false;
        }
        let agent_id = self.state.agent_id.clone();
        if let Some(here) = self.point_here_with_id(point) {
            here.aided_by.insert(agent_id);
        }
        true
    }

    fn remaining_budget(&self) -> f64 {
        self.state.remaining
    }

    fn costs(&self) -> BodyCosts {
        self.state.costs
    }
}
