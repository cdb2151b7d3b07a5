//! Rescue mission simulator: grid exploration, return planning, partitioning
//! and dispatch of servicing agents.
//!
//! This module is organized into submodules:
//! - `types`: Core type definitions (IDs, constants, sensing, agent state)
//! - `grid_map`: Per-agent knowledge of the explored area
//! - `agent`: Body capability trait, agent behavior trait and handles
//! - `environment`: Physical grid, walls, points and time budgets
//! - `explorer`: Exploration with backtracking and return to base
//! - `planner`: A* over known cells and tour construction
//! - `partition`: Deterministic k-means over discovered points
//! - `rescuer`: Servicing agent that walks a dispatched route
//! - `coordinator`: Team lead phase state machine
//! - `runner`: Lock-step mission driver
//! - `config` / `scenario`: Mission configuration and built-in layouts
//! - `report`: Cluster files and the JSON mission report

mod agent;
mod config;
mod coordinator;
mod environment;
mod explorer;
mod grid_map;
mod partition;
mod planner;
mod report;
mod rescuer;
mod runner;
mod scenario;
mod types;


pub use agent::{AgentBehavior, AgentBody, AgentDecision, ExplorerHandle, ServiceHandle};
pub use config::{
    ConfigError, DifficultyConfig, EnvironmentConfig, ExplorerTeamConfig, MissionConfig,
    PartitionConfig, PointConfig, RescuerTeamConfig,
};
pub use coordinator::{Coordinator, CoordinatorError, CoordinatorPhase};
pub use environment::{EnvBody, EnvPoint, EnvironmentError, GridEnvironment};
pub use explorer::{
    ExplorerAgent, ExplorerOutcome, ExplorerPhase, ExplorerSettings, ExplorerStats, ReturnTrigger,
};
pub use grid_map::{Cell, CellProbe, GridMap};
pub use partition::{Cluster, PartitionError, TaskPartitioner};
pub use planner::{
    estimate_path_cost, Path, PathPlanner, PlanError, PlannedVisit, Route, SkipReason,
    SkippedPoint,
};
pub use report::{
    cluster_file_name, write_cluster_files, ExplorerReport, MissionReport, PersistError,
    RescuerReport,
};
pub use rescuer::{Assignment, RescuerAgent, RescuerOutcome};
pub use runner::{AgentStats, MissionError, MissionRunner};
pub use scenario::{MissionScenario, SplitMix64};
pub use types::{
    AgentId, AgentState, AgentStatus, BodyCosts, Cycle, DiscoveredPoint, MoveResult,
    NeighborOutcome, NeighborScan, PointId, BASE, DEFAULT_COST_DIAG, DEFAULT_COST_FIRST_AID,
    DEFAULT_COST_LINE, DEFAULT_COST_READ, DEFAULT_MAX_CYCLES, DEFAULT_PARTITION_MAX_ITERATIONS,
    DEFAULT_RETURN_FRACTION, DEFAULT_RETURN_SAFETY_MARGIN, DEFAULT_TIME_LIMIT, REPORT_VERSION,
};
