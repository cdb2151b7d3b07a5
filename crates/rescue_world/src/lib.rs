pub mod geometry;
pub mod simulator;

pub use geometry::{
    chebyshev_distance, euclidean_distance, euclidean_distance_f64, Direction, DirectionPriority,
    GridCoord,
};

// Agent interface (sense → decide → move)
pub use simulator::{
    AgentBehavior, AgentBody, AgentDecision, AgentState, AgentStatus, ExplorerHandle,
    ServiceHandle,
};

// Knowledge and planning
pub use simulator::{
    estimate_path_cost, Cell, CellProbe, GridMap, Path, PathPlanner, PlanError, PlannedVisit,
    Route, SkipReason, SkippedPoint,
};

// Agents and coordination
pub use simulator::{
    Assignment, Cluster, Coordinator, CoordinatorError, CoordinatorPhase, ExplorerAgent,
    ExplorerOutcome, ExplorerPhase, ExplorerSettings, ExplorerStats, PartitionError, RescuerAgent,
    RescuerOutcome, ReturnTrigger, TaskPartitioner,
};

// Environment, configuration and driver
pub use simulator::{
    AgentStats, ConfigError, EnvBody, EnvironmentConfig, EnvironmentError, GridEnvironment,
    MissionConfig, MissionError, MissionRunner, MissionScenario,
};

// Results
pub use simulator::{
    write_cluster_files, DiscoveredPoint, MissionReport, PersistError, BASE,
};
