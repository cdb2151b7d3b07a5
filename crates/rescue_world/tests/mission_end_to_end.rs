use rescue_world::simulator::{BodyCosts, PointConfig};
use rescue_world::{
    AgentBehavior, AgentDecision, AgentStatus, Direction, DirectionPriority, DiscoveredPoint,
    EnvironmentConfig, ExplorerAgent, ExplorerHandle, ExplorerOutcome, ExplorerSettings,
    GridCoord, GridEnvironment, MissionConfig, MissionRunner, MissionScenario, PathPlanner,
    TaskPartitioner, BASE,
};

#[test]
fn explorer_finds_point_then_plans_shortest_return() {
    let config = EnvironmentConfig {
        width: 5,
        height: 5,
        base: GridCoord::new(2, 2),
        walls: Vec::new(),
        points: vec![PointConfig::new(4, 4, vec![72.0, 18.0])],
        difficulties: Vec::new(),
    };
    let mut env = GridEnvironment::from_config(&config).unwrap();
    env.spawn("explorer-1", BodyCosts::default()).unwrap();
    let settings = ExplorerSettings {
        priority: DirectionPriority::complete(&[
            Direction::E,
            Direction::S,
            Direction::W,
            Direction::N,
        ]),
        ..ExplorerSettings::default()
    };
    let mut explorer = ExplorerAgent::new("explorer-1", settings);

    let mut cycles = 0;
    while explorer.discovered_points().is_empty() {
        cycles += 1;
        assert!(cycles <= 9, "point not found within 9 cycles");
        let mut body = env.body("explorer-1").unwrap();
        assert_eq!(explorer.deliberate(&mut body), AgentDecision::Continue);
    }

    let path = PathPlanner::new()
        .plan(explorer.map(), explorer.coord(), BASE)
        .unwrap();
    assert_eq!(explorer.coord(), GridCoord::new(2, 2));
    assert_eq!(path.len(), 4);

    loop {
        let mut body = env.body("explorer-1").unwrap();
        if explorer.deliberate(&mut body) == AgentDecision::Finished {
            break;
        }
    }
    assert_eq!(explorer.outcome(), Some(ExplorerOutcome::Returned));
    assert_eq!(env.position_of("explorer-1").unwrap(), BASE);
}

#[test]
fn four_symmetric_points_split_into_single_clusters() {
    let points: Vec<DiscoveredPoint> = [(1, 1), (1, -1), (-1, 1), (-1, -1)]
        .iter()
        .enumerate()
        .map(|(id, (x, y))| DiscoveredPoint::new(id as u32, GridCoord::new(*x, *y), vec![]))
        .collect();
    let agents: Vec<String> = (1..=4).map(|i| format!("rescuer-{i}")).collect();

    let clusters = TaskPartitioner::default().partition(&points, &agents).unwrap();

    assert_eq!(clusters.len(), 4);
    assert!(clusters.iter().all(|cluster| cluster.len() == 1));
}

#[test]
fn generated_missions_rescue_what_they_find() {
    for seed in [1, 2, 3] {
        let config = MissionConfig::from_scenario(MissionScenario::Generated, seed);
        let mut runner = MissionRunner::from_config(&config).unwrap();
        let report = runner.run(config.max_cycles);

        assert!(report.completed, "seed {seed}");
        assert_eq!(report.partition_runs, 1, "seed {seed}");
        assert!(report.points_rescued <= report.points_discovered, "seed {seed}");
        assert!(report.points_discovered <= report.points_total, "seed {seed}");
        for rescuer in &report.rescuers {
            assert!(rescuer.rescued.iter().all(|id| rescuer.assigned.contains(id)));
        }
        assert!(runner
            .explorers()
            .iter()
            .all(|explorer| explorer.status() == AgentStatus::Idle));
    }
}
