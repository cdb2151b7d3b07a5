//! Coordinator: the team lead's phase state machine.
//!
//! AwaitingExploration -> Partitioning -> Dispatched -> AwaitingService -> Done.
//! The partition step runs at most once per mission; the merged map and the
//! clusters it produces are frozen behind `Arc` afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::agent::{AgentBehavior, AgentDecision, ExplorerHandle, ServiceHandle};
use super::grid_map::GridMap;
use super::partition::{Cluster, PartitionError, TaskPartitioner};
use super::planner::{PathPlanner, Route};
use super::rescuer::Assignment;
use super::types::{AgentId, AgentStatus, DiscoveredPoint, PointId, BASE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorPhase {
    #[default]
    AwaitingExploration,
    Partitioning,
    Dispatched,
    AwaitingService,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("partition already ran for this mission")]
    AlreadyPartitioned,
    #[error("explorers still active: {active:?}")]
    ExplorationPending { active: Vec<AgentId> },
    #[error("partition failed: {0}")]
    Partition(#[from] PartitionError),
}

#[derive(Debug, Clone, Default)]
pub struct Coordinator {
    phase: CoordinatorPhase,
    partitioned: bool,
    partition_runs: u32,
    partitioner: TaskPartitioner,
    planner: PathPlanner,
    merged_map: Option<Arc<GridMap>>,
    points: Vec<DiscoveredPoint>,
    clusters: Option<Arc<[Cluster]>>,
    routes: BTreeMap<AgentId, Route>,
}

impl Coordinator {
    pub fn new(partitioner: TaskPartitioner) -> Self {
        Self {
            partitioner,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> CoordinatorPhase {
        self.phase
    }

    pub fn is_partitioned(&self) -> bool {
        self.partitioned
    }

    pub fn partition_runs(&self) -> u32 {
        self.partition_runs
    }

    pub fn merged_map(&self) -> Option<&Arc<GridMap>> {
        self.merged_map.as_ref()
    }

    /// Every point found by the team, ordered by id.
    pub fn points(&self) -> &[DiscoveredPoint] {
        &self.points
    }

    pub fn clusters(&self) -> Option<&Arc<[Cluster]>> {
        self.clusters.as_ref()
    }

    pub fn route_for(&self, agent_id: &str) -> Option<&Route> {
        self.routes.get(agent_id)
    }

    fn transition(&mut self, next: CoordinatorPhase) {
        info!(from = ?self.phase, to = ?next, "coordinator phase");
        self.phase = next;
    }

    /// One coordinator cycle. Reports `Finished` only once every servicing
    /// agent is idle after dispatch.
    pub fn deliberate<E, R>(&mut self, explorers: &[E], rescuers: &mut [R]) -> AgentDecision
    where
        E: ExplorerHandle,
        R: ServiceHandle,
    {
        match self.phase {
            CoordinatorPhase::AwaitingExploration => {
                if explorers.iter().all(|e| e.status() == AgentStatus::Idle) {
                    self.transition(CoordinatorPhase::Partitioning);
                }
                AgentDecision::Continue
            }
            CoordinatorPhase::Partitioning => {
                match self.run_partition(explorers, rescuers) {
                    Ok(_) => {}
                    Err(CoordinatorError::ExplorationPending { active }) => {
                        warn!(?active, "explorers reactivated, waiting again");
                        self.transition(CoordinatorPhase::AwaitingExploration);
                        return AgentDecision::Continue;
                    }
                    Err(err) => warn!(error = %err, "partition step produced no dispatch"),
                }
                self.transition(CoordinatorPhase::Dispatched);
                AgentDecision::Continue
            }
            CoordinatorPhase::Dispatched => {
                self.transition(CoordinatorPhase::AwaitingService);
                AgentDecision::Continue
            }
            CoordinatorPhase::AwaitingService => {
                if rescuers.iter().all(|r| r.status() == AgentStatus::Idle) {
                    self.transition(CoordinatorPhase::Done);
                    AgentDecision::Finished
                } else {
                    AgentDecision::Continue
                }
            }
            CoordinatorPhase::Done => AgentDecision::Finished,
        }
    }

    /// Merges the explorers' maps and points, partitions the points over the
    /// rescuers and dispatches one cluster and route to each of them.
    ///
    /// Rejected with [`CoordinatorError::AlreadyPartitioned`] on every call
    /// after the first successful guard check.
    pub fn run_partition<E, R>(
        &mut self,
        explorers: &[E],
        rescuers: &mut [R],
    ) -> Result<usize, CoordinatorError>
    where
        E: ExplorerHandle,
        R: ServiceHandle,
    {
        if self.partitioned {
            warn!(runs = self.partition_runs, "re-entrant partition request rejected");
            return Err(CoordinatorError::AlreadyPartitioned);
        }
        let active: Vec<AgentId> = explorers
            .iter()
            .filter(|e| e.status() != AgentStatus::Idle)
            .map(|e| e.agent_id().to_string())
            .collect();
        if !active.is_empty() {
            return Err(CoordinatorError::ExplorationPending { active });
        }
        self.partitioned = true;
        self.partition_runs += 1;

        let mut merged = GridMap::new();
        let mut points: BTreeMap<PointId, DiscoveredPoint> = BTreeMap::new();
        for explorer in explorers {
            let inserted = merged.merge(explorer.map());
            for (id, point) in explorer.discovered_points() {
                points.entry(*id).or_insert_with(|| point.clone());
            }
            info!(agent_id = %explorer.agent_id(), inserted, total = merged.len(), "explorer map merged");
        }
        let merged = Arc::new(merged);
        self.merged_map = Some(Arc::clone(&merged));
        self.points = points.into_values().collect();

        let agent_ids: Vec<AgentId> = rescuers.iter().map(|r| r.agent_id().to_string()).collect();
        let clusters = self.partitioner.partition(&self.points, &agent_ids)?;
        for (cluster, rescuer) in clusters.iter().zip(rescuers.iter_mut()) {
            let route = self
                .planner
                .plan_tour(&merged, BASE, &cluster.points, &rescuer.costs());
            self.routes.insert(cluster.agent_id.clone(), route.clone());
            rescuer.assign(Assignment {
                cluster: cluster.clone(),
                route,
            });
        }
        info!(
            points = self.points.len(),
            clusters = clusters.len(),
            cells = merged.len(),
            "partition dispatched"
        );
        let dispatched = clusters.len();
        self.clusters = Some(clusters.into());
        Ok(dispatched)
    }
}
