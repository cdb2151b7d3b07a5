//! MissionRunner: lock-step driver for explorers, rescuers and the
//! coordinator.
//!
//! Every cycle runs each active explorer, then each active rescuer, then the
//! coordinator, one decision each. Agents that report `Finished` are
//! deactivated; the mission ends when the coordinator finishes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::agent::{AgentBehavior, AgentDecision, ExplorerHandle};
use super::config::{ConfigError, MissionConfig};
use super::coordinator::{Coordinator, CoordinatorPhase};
use super::environment::{EnvironmentError, GridEnvironment};
use super::explorer::ExplorerAgent;
use super::partition::TaskPartitioner;
use super::report::{ExplorerReport, MissionReport, RescuerReport};
use super::rescuer::RescuerAgent;
use super::types::{AgentId, AgentStatus, Cycle, REPORT_VERSION};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MissionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}

/// Per-agent scheduling statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStats {
    pub decision_count: u64,
    /// Cycle in which the agent was deactivated.
    pub idle_since: Option<Cycle>,
}

#[derive(Debug, Clone)]
pub struct MissionRunner {
    environment: GridEnvironment,
    explorers: Vec<ExplorerAgent>,
    rescuers: Vec<RescuerAgent>,
    coordinator: Coordinator,
    total_cycles: Cycle,
    stats: BTreeMap<AgentId, AgentStats>,
}

impl MissionRunner {
    pub fn from_config(config: &MissionConfig) -> Result<Self, MissionError> {
        config.validate()?;
        let mut environment = GridEnvironment::from_config(&config.environment)?;

        let mut explorers = Vec::with_capacity(config.explorers.count);
        for index in 0..config.explorers.count {
            let agent_id = config.explorers.agent_id(index);
            environment.spawn(&agent_id, config.explorers.body)?;
            explorers.push(ExplorerAgent::new(
                agent_id,
                config.explorers.settings_for(index),
            ));
        }
        let mut rescuers = Vec::with_capacity(config.rescuers.count);
        for index in 0..config.rescuers.count {
            let agent_id = config.rescuers.agent_id(index);
            environment.spawn(&agent_id, config.rescuers.body)?;
            rescuers.push(RescuerAgent::new(agent_id, config.rescuers.body));
        }

        info!(
            width = environment.width(),
            height = environment.height(),
            points = environment.point_count(),
            explorers = explorers.len(),
            rescuers = rescuers.len(),
            "mission initialized"
        );
        Ok(Self::new(
            environment,
            explorers,
            rescuers,
            Coordinator::new(TaskPartitioner::new(config.partition.max_iterations)),
        ))
    }

    /// Assembles a runner from parts. Every agent must already be spawned in
    /// `environment`.
    pub fn new(
        environment: GridEnvironment,
        explorers: Vec<ExplorerAgent>,
        rescuers: Vec<RescuerAgent>,
        coordinator: Coordinator,
    ) -> Self {
        let stats = explorers
            .iter()
            .map(|e| e.agent_id().to_string())
            .chain(rescuers.iter().map(|r| r.agent_id().to_string()))
            .map(|agent_id| (agent_id, AgentStats::default()))
            .collect();
        Self {
            environment,
            explorers,
            rescuers,
            coordinator,
            total_cycles: 0,
            stats,
        }
    }

    pub fn environment(&self) -> &GridEnvironment {
        &self.environment
    }

    pub fn explorers(&self) -> &[ExplorerAgent] {
        &self.explorers
    }

    pub fn rescuers(&self) -> &[RescuerAgent] {
        &self.rescuers
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn total_cycles(&self) -> Cycle {
        self.total_cycles
    }

    pub fn agent_stats(&self, agent_id: &str) -> Option<&AgentStats> {
        self.stats.get(agent_id)
    }

    pub fn is_done(&self) -> bool {
        self.coordinator.phase() == CoordinatorPhase::Done
    }

    /// Runs one cycle. Returns `Continue` while the mission has work left.
    pub fn cycle(&mut self) -> AgentDecision {
        self.total_cycles += 1;
        let cycle = self.total_cycles;

        for explorer in &mut self.explorers {
            drive(&mut self.environment, explorer, &mut self.stats, cycle);
        }
        for rescuer in &mut self.rescuers {
            drive(&mut self.environment, rescuer, &mut self.stats, cycle);
        }
        let decision = self
            .coordinator
            .deliberate(&self.explorers, &mut self.rescuers);
        debug!(cycle, phase = ?self.coordinator.phase(), "cycle done");
        decision
    }

    /// Cycles until the mission finishes or `max_cycles` is reached.
    pub fn run(&mut self, max_cycles: Cycle) -> MissionReport {
        while self.total_cycles < max_cycles {
            if !self.cycle().has_more_work() {
                break;
            }
        }
        if self.is_done() {
            info!(cycles = self.total_cycles, "mission complete");
        } else {
            warn!(
                cycles = self.total_cycles,
                phase = ?self.coordinator.phase(),
                "cycle limit reached before mission completion"
            );
        }
        self.report()
    }

    pub fn report(&self) -> MissionReport {
        let stats = |agent_id: &str| self.stats.get(agent_id).cloned().unwrap_or_default();
        let explorers = self
            .explorers
            .iter()
            .map(|explorer| {
                let agent_stats = stats(explorer.agent_id());
                ExplorerReport {
                    agent_id: explorer.agent_id().to_string(),
                    outcome: explorer.outcome(),
                    cells_mapped: explorer.map().len(),
                    points_found: explorer.points().len(),
                    remaining_budget: self
                        .environment
                        .remaining_budget_of(explorer.agent_id())
                        .unwrap_or(0.0),
                    stats: explorer.stats(),
                    decisions: agent_stats.decision_count,
                    idle_since: agent_stats.idle_since,
                }
            })
            .collect();
        let rescuers = self
            .rescuers
            .iter()
            .map(|rescuer| {
                let agent_stats = stats(rescuer.agent_id());
                let assignment = rescuer.assignment();
                RescuerReport {
                    agent_id: rescuer.agent_id().to_string(),
                    cluster_id: assignment.map(|a| a.cluster.id),
                    assigned: assignment
                        .map(|a| a.cluster.points.iter().map(|p| p.id).collect())
                        .unwrap_or_default(),
                    rescued: rescuer.rescued().to_vec(),
                    skipped: assignment
                        .map(|a| a.route.skipped.iter().map(|s| s.point).collect())
                        .unwrap_or_default(),
                    outcome: rescuer.outcome(),
                    remaining_budget: self
                        .environment
                        .remaining_budget_of(rescuer.agent_id())
                        .unwrap_or(0.0),
                    decisions: agent_stats.decision_count,
                    idle_since: agent_stats.idle_since,
                }
            })
            .collect();

        MissionReport {
            version: REPORT_VERSION,
            cycles: self.total_cycles,
            completed: self.is_done(),
            phase: self.coordinator.phase(),
            partition_runs: self.coordinator.partition_runs(),
            merged_cells: self.coordinator.merged_map().map_or(0, |map| map.len()),
            points_total: self.environment.point_count(),
            points_discovered: self.coordinator.points().len(),
            points_rescued: self.environment.aided_points().len(),
            explorers,
            rescuers,
        }
    }
}

/// One decision for one agent, with deactivation on `Finished`.
fn drive<A: AgentBehavior>(
    environment: &mut GridEnvironment,
    agent: &mut A,
    stats: &mut BTreeMap<AgentId, AgentStats>,
    cycle: Cycle,
) {
    if agent.status() == AgentStatus::Idle {
        return;
    }
    let agent_stats = stats.entry(agent.agent_id().to_string()).or_default();
    let Some(mut body) = environment.body(agent.agent_id()) else {
        warn!(agent_id = %agent.agent_id(), "agent has no body, deactivating");
        agent.deactivate();
        agent_stats.idle_since = Some(cycle);
        return;
    };
    agent_stats.decision_count += 1;
    if agent.deliberate(&mut body) == AgentDecision::Finished {
        agent.deactivate();
        agent_stats.idle_since = Some(cycle);
        debug!(agent_id = %agent.agent_id(), cycle, "agent deactivated");
    }
}
