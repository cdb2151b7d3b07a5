//! PathPlanner: A* over the known part of a GridMap, plus tour construction
//! for servicing agents.
//!
//! Every step, straight or diagonal, costs one unit while planning. The
//! heuristic is the Euclidean distance scaled by 1/√2, which never exceeds
//! the number of 8-connected steps left, so returned paths have the minimum
//! step count. Time estimates price each step with the body cost model.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::f64::consts::SQRT_2;
use thiserror::Error;
use tracing::{debug, warn};

use crate::geometry::{euclidean_distance, Direction, DirectionPriority, GridCoord};

use super::grid_map::GridMap;
use super::types::{BodyCosts, DiscoveredPoint, PointId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("start {start} is not a known cell")]
    StartUnknown { start: GridCoord },
    #[error("goal {goal} is not a known cell")]
    GoalUnknown { goal: GridCoord },
    #[error("no known path from {start} to {goal}")]
    Unreachable { start: GridCoord, goal: GridCoord },
}

/// Coordinates from start to goal, both inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub cells: Vec<GridCoord>,
}

impl Path {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of moves needed to walk the path.
    pub fn step_count(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<GridCoord> {
        self.cells.first().copied()
    }

    pub fn goal(&self) -> Option<GridCoord> {
        self.cells.last().copied()
    }

    pub fn moves(&self) -> VecDeque<Direction> {
        moves_along(&self.cells)
    }
}

fn moves_along(cells: &[GridCoord]) -> VecDeque<Direction> {
    cells
        .windows(2)
        .filter_map(|pair| pair[0].step_to(pair[1]))
        .collect()
}

/// Time needed to walk `path`, using the recorded difficulty of each entered
/// cell (1.0 where none is recorded).
pub fn estimate_path_cost(map: &GridMap, path: &Path, costs: &BodyCosts) -> f64 {
    path.cells
        .windows(2)
        .filter_map(|pair| {
            let direction = pair[0].step_to(pair[1])?;
            let difficulty = map.difficulty(pair[1]).unwrap_or(1.0);
            Some(costs.step_cost(direction) * difficulty)
        })
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f_score: OrderedFloat<f64>,
    seq: u64,
    coord: GridCoord,
}

// BinaryHeap is a max-heap: the smallest f-score, then the earliest
// insertion, must compare greatest.
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(a: GridCoord, b: GridCoord) -> f64 {
    euclidean_distance(a, b) / SQRT_2
}

#[derive(Debug, Clone, Default)]
pub struct PathPlanner {
    neighbor_order: DirectionPriority,
}

impl PathPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expands neighbours in `order` instead of compass order. Only affects
    /// which of several equally short paths is returned.
    pub fn with_neighbor_order(order: DirectionPriority) -> Self {
        Self {
            neighbor_order: order,
        }
    }

    pub fn plan(&self, map: &GridMap, start: GridCoord, goal: GridCoord) -> Result<Path, PlanError> {
        if !map.is_known(start) {
            return Err(PlanError::StartUnknown { start });
        }
        if !map.is_known(goal) {
            return Err(PlanError::GoalUnknown { goal });
        }
        if start == goal {
            return Ok(Path { cells: vec![start] });
        }

        let mut open = BinaryHeap::new();
        let mut g_score: HashMap<GridCoord, u32> = HashMap::new();
        let mut came_from: HashMap<GridCoord, GridCoord> = HashMap::new();
        let mut closed: HashSet<GridCoord> = HashSet::new();
        let mut seq = 0u64;

        g_score.insert(start, 0);
        open.push(OpenEntry {
            f_score: OrderedFloat(heuristic(start, goal)),
            seq,
            coord: start,
        });

        while let Some(entry) = open.pop() {
            let current = entry.coord;
            if !closed.insert(current) {
                continue;
            }
            if current == goal {
                let path = reconstruct(&came_from, goal);
                debug!(%start, %goal, steps = path.step_count(), expanded = closed.len(), "path found");
                return Ok(path);
            }

            let current_g = g_score.get(&current).copied().unwrap_or(u32::MAX);
            for next in map.neighbors_with_priority(current, &self.neighbor_order) {
                if closed.contains(&next) {
                    continue;
                }
                let tentative = current_g.saturating_add(1);
                let improves = g_score
                    .get(&next)
                    .map_or(true, |known| tentative < *known);
                if improves {
                    g_score.insert(next, tentative);
                    came_from.insert(next, current);
                    seq += 1;
                    open.push(OpenEntry {
                        f_score: OrderedFloat(tentative as f64 + heuristic(next, goal)),
                        seq,
                        coord: next,
                    });
                }
            }
        }

        Err(PlanError::Unreachable { start, goal })
    }

    /// Route from `base` through `points` and back to `base`.
    ///
    /// Points are taken in nearest-neighbour order (Euclidean, ties by id).
    /// A point is skipped when it cannot be reached on `map`, or when its leg
    /// plus first aid plus the way back would not fit in the time budget left
    /// after the legs already planned.
    pub fn plan_tour(
        &self,
        map: &GridMap,
        base: GridCoord,
        points: &[DiscoveredPoint],
        costs: &BodyCosts,
    ) -> Route {
        let mut pending: Vec<&DiscoveredPoint> = points.iter().collect();
        let mut current = base;
        let mut waypoints = vec![base];
        let mut visits = Vec::new();
        let mut skipped = Vec::new();
        let mut spent = 0.0;

        while let Some(index) = nearest_index(current, &pending) {
            let point = pending.remove(index);
            let (leg, back) = match (
                self.plan(map, current, point.coord),
                self.plan(map, point.coord, base),
            ) {
                (Ok(leg), Ok(back)) => (leg, back),
                (Err(err), _) | (_, Err(err)) => {
                    warn!(point = point.id, error = %err, "point unreachable on known map");
                    skipped.push(SkippedPoint {
                        point: point.id,
                        reason: SkipReason::Unreachable,
                    });
                    continue;
                }
            };
            let leg_cost = estimate_path_cost(map, &leg, costs) + costs.cost_first_aid;
            let back_cost = estimate_path_cost(map, &back, costs);
            if spent + leg_cost + back_cost > costs.time_limit {
                debug!(point = point.id, spent, leg_cost, back_cost, "point does not fit the budget");
                skipped.push(SkippedPoint {
                    point: point.id,
                    reason: SkipReason::OverBudget,
                });
                continue;
            }
            spent += leg_cost;
            waypoints.extend(leg.cells.iter().skip(1).copied());
            visits.push(PlannedVisit {
                point: point.id,
                coord: point.coord,
            });
            current = point.coord;
        }

        if current != base {
            match self.plan(map, current, base) {
                Ok(back) => {
                    spent += estimate_path_cost(map, &back, costs);
                    waypoints.extend(back.cells.iter().skip(1).copied());
                }
                Err(err) => warn!(error = %err, "no way back to base from last visit"),
            }
        }

        Route {
            waypoints,
            visits,
            skipped,
            estimated_cost: spent,
        }
    }
}

fn nearest_index(from: GridCoord, pending: &[&DiscoveredPoint]) -> Option<usize> {
    pending
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            euclidean_distance(from, a.coord)
                .total_cmp(&euclidean_distance(from, b.coord))
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|(index, _)| index)
}

fn reconstruct(came_from: &HashMap<GridCoord, GridCoord>, goal: GridCoord) -> Path {
    let mut cells = vec![goal];
    let mut current = goal;
    while let Some(previous) = came_from.get(&current) {
        cells.push(*previous);
        current = *previous;
    }
    cells.reverse();
    Path { cells }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedVisit {
    pub point: PointId,
    pub coord: GridCoord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Unreachable,
    OverBudget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPoint {
    pub point: PointId,
    pub reason: SkipReason,
}

/// A servicing agent's full route: waypoints from base back to base, the
/// points served along the way, and those left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub waypoints: Vec<GridCoord>,
    pub visits: Vec<PlannedVisit>,
    pub skipped: Vec<SkippedPoint>,
    pub estimated_cost: f64,
}

impl Route {
    pub fn empty(base: GridCoord) -> Self {
        Self {
            waypoints: vec![base],
            visits: Vec::new(),
            skipped: Vec::new(),
            estimated_cost: 0.0,
        }
    }

    pub fn moves(&self) -> VecDeque<Direction> {
        moves_along(&self.waypoints)
    }
}
