use super::*;
use std::collections::BTreeMap;

struct FakeExplorer {
    id: String,
    status: AgentStatus,
    map: GridMap,
    points: BTreeMap<PointId, DiscoveredPoint>,
}

impl FakeExplorer {
    fn idle(id: &str, map: GridMap, points: &[DiscoveredPoint]) -> Self {
        Self {
            id: id.to_string(),
            status: AgentStatus::Idle,
            map,
            points: points.iter().map(|p| (p.id, p.clone())).collect(),
        }
    }
}

impl AgentBehavior for FakeExplorer {
    fn agent_id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> AgentStatus {
        self.status
    }

    fn deliberate(&mut self, _body: &mut dyn AgentBody) -> AgentDecision {
        AgentDecision::Finished
    }

    fn deactivate(&mut self) {
        self.status = AgentStatus::Idle;
    }
}

impl ExplorerHandle for FakeExplorer {
    fn map(&self) -> &GridMap {
        &self.map
    }

    fn discovered_points(&self) -> &BTreeMap<PointId, DiscoveredPoint> {
        &self.points
    }
}

struct FakeRescuer {
    id: String,
    status: AgentStatus,
    assignments: Vec<Assignment>,
}

impl FakeRescuer {
    fn active(id: &str) -> Self {
        Self {
            id: id.to_string(),
            status: AgentStatus::Active,
            assignments: Vec::new(),
        }
    }
}

impl AgentBehavior for FakeRescuer {
    fn agent_id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> AgentStatus {
        self.status
    }

    fn deliberate(&mut self, _body: &mut dyn AgentBody) -> AgentDecision {
        AgentDecision::Finished
    }

    fn deactivate(&mut self) {
        self.status = AgentStatus::Idle;
    }
}

impl ServiceHandle for FakeRescuer {
    fn costs(&self) -> BodyCosts {
        BodyCosts::default()
    }

    fn assign(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }
}

fn sample_points() -> Vec<DiscoveredPoint> {
    vec![
        DiscoveredPoint::new(0, coord(1, 0), vec![1.0]),
        DiscoveredPoint::new(1, coord(4, 4), vec![2.0]),
        DiscoveredPoint::new(2, coord(0, 3), vec![3.0]),
    ]
}

fn rescuers(count: usize) -> Vec<FakeRescuer> {
    (1..=count)
        .map(|i| FakeRescuer::active(&format!("rescuer-{i}")))
        .collect()
}

#[test]
fn coordinator_waits_for_active_explorers() {
    let mut explorer = FakeExplorer::idle("explorer-1", full_map(3, 3, &[]), &[]);
    explorer.status = AgentStatus::Active;
    let explorers = vec![explorer];
    let mut team = rescuers(1);
    let mut coordinator = Coordinator::default();

    for _ in 0..5 {
        assert_eq!(
            coordinator.deliberate(&explorers, &mut team),
            AgentDecision::Continue
        );
    }

    assert_eq!(coordinator.phase(), CoordinatorPhase::AwaitingExploration);
    assert!(!coordinator.is_partitioned());
    assert!(team[0].assignments.is_empty());
}

#[test]
fn coordinator_walks_through_every_phase() {
    let explorers = vec![FakeExplorer::idle("explorer-1", full_map(5, 5, &[]), &sample_points())];
    let mut team = rescuers(2);
    let mut coordinator = Coordinator::default();
    let mut phases = vec![coordinator.phase()];

    for _ in 0..4 {
        assert_eq!(
            coordinator.deliberate(&explorers, &mut team),
            AgentDecision::Continue
        );
        if phases.last() != Some(&coordinator.phase()) {
            phases.push(coordinator.phase());
        }
    }
    assert_eq!(
        phases,
        vec![
            CoordinatorPhase::AwaitingExploration,
            CoordinatorPhase::Partitioning,
            CoordinatorPhase::Dispatched,
            CoordinatorPhase::AwaitingService,
        ]
    );
    assert!(team.iter().all(|rescuer| rescuer.assignments.len() == 1));

    team[0].deactivate();
    assert_eq!(
        coordinator.deliberate(&explorers, &mut team),
        AgentDecision::Continue
    );
    team[1].deactivate();
    assert_eq!(
        coordinator.deliberate(&explorers, &mut team),
        AgentDecision::Finished
    );
    assert_eq!(coordinator.phase(), CoordinatorPhase::Done);
    assert_eq!(
        coordinator.deliberate(&explorers, &mut team),
        AgentDecision::Finished
    );
    assert_eq!(coordinator.partition_runs(), 1);
}

#[test]
fn partition_runs_only_once() {
    let explorers = vec![FakeExplorer::idle("explorer-1", full_map(5, 5, &[]), &sample_points())];
    let mut team = rescuers(2);
    let mut coordinator = Coordinator::default();

    assert_eq!(coordinator.run_partition(&explorers, &mut team), Ok(2));
    assert_eq!(
        coordinator.run_partition(&explorers, &mut team),
        Err(CoordinatorError::AlreadyPartitioned)
    );

    assert_eq!(coordinator.partition_runs(), 1);
    assert!(team.iter().all(|rescuer| rescuer.assignments.len() == 1));
    let clusters = coordinator.clusters().unwrap();
    let assigned: usize = clusters.iter().map(Cluster::len).sum();
    assert_eq!(assigned, 3);
    for rescuer in &team {
        let route = coordinator.route_for(&rescuer.id).unwrap();
        assert_eq!(route, &rescuer.assignments[0].route);
        assert_eq!(route.waypoints.first(), Some(&BASE));
        assert_eq!(route.waypoints.last(), Some(&BASE));
    }
}

#[test]
fn partition_refused_while_exploring() {
    let mut busy = FakeExplorer::idle("explorer-2", full_map(2, 2, &[]), &[]);
    busy.status = AgentStatus::Active;
    let explorers = vec![FakeExplorer::idle("explorer-1", full_map(2, 2, &[]), &[]), busy];
    let mut team = rescuers(1);
    let mut coordinator = Coordinator::default();

    assert_eq!(
        coordinator.run_partition(&explorers, &mut team),
        Err(CoordinatorError::ExplorationPending {
            active: vec!["explorer-2".to_string()],
        })
    );
    assert!(!coordinator.is_partitioned());
    assert_eq!(coordinator.partition_runs(), 0);
}

#[test]
fn no_points_dispatches_empty_routes() {
    let explorers = vec![FakeExplorer::idle("explorer-1", full_map(3, 3, &[]), &[])];
    let mut team = rescuers(3);
    let mut coordinator = Coordinator::default();

    assert_eq!(coordinator.run_partition(&explorers, &mut team), Ok(3));
    for rescuer in &team {
        let assignment = &rescuer.assignments[0];
        assert!(assignment.cluster.is_empty());
        assert_eq!(assignment.route, Route::empty(BASE));
    }
}

#[test]
fn explorer_maps_and_points_are_merged() {
    let mut left = GridMap::new();
    left.add(coord(0, 0), 1.0, None, NeighborScan::all_clear());
    left.add(coord(-1, 0), 1.0, Some(4), NeighborScan::all_clear());
    let mut right = GridMap::new();
    right.add(coord(0, 0), 3.0, None, NeighborScan::all_clear());
    right.add(coord(1, 0), 1.0, Some(5), NeighborScan::all_clear());

    let explorers = vec![
        FakeExplorer::idle(
            "explorer-1",
            left,
            &[DiscoveredPoint::new(4, coord(-1, 0), vec![1.0])],
        ),
        FakeExplorer::idle(
            "explorer-2",
            right,
            &[
                DiscoveredPoint::new(4, coord(9, 9), vec![9.0]),
                DiscoveredPoint::new(5, coord(1, 0), vec![2.0]),
            ],
        ),
    ];
    let mut team = rescuers(1);
    let mut coordinator = Coordinator::default();
    coordinator.run_partition(&explorers, &mut team).unwrap();

    let merged = coordinator.merged_map().unwrap();
    assert_eq!(merged.len(), 3);
    assert_eq!(merged.difficulty(BASE), Some(1.0));
    let ids: Vec<PointId> = coordinator.points().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![4, 5]);
    assert_eq!(coordinator.points()[0].coord, coord(-1, 0));

    let route = &team[0].assignments[0].route;
    assert_eq!(route.visits.len(), 2);
    assert!(route.skipped.is_empty());
}

#[test]
fn no_rescuers_still_reaches_done() {
    let explorers = vec![FakeExplorer::idle("explorer-1", full_map(3, 3, &[]), &sample_points())];
    let mut team: Vec<FakeRescuer> = Vec::new();
    let mut coordinator = Coordinator::default();

    let mut cycles = 0;
    while coordinator.deliberate(&explorers, &mut team) == AgentDecision::Continue {
        cycles += 1;
        assert!(cycles < 10);
    }

    assert_eq!(coordinator.phase(), CoordinatorPhase::Done);
    assert!(coordinator.is_partitioned());
    assert!(coordinator.clusters().is_none());
}
