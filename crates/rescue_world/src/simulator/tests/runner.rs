use super::*;

fn runner_for(scenario: MissionScenario) -> MissionRunner {
    MissionRunner::from_config(&MissionConfig::from_scenario(scenario, 0)).unwrap()
}

#[test]
fn open_scenario_runs_to_completion() {
    let mut runner = runner_for(MissionScenario::Open5x5);
    let report = runner.run(DEFAULT_MAX_CYCLES);

    assert!(report.completed);
    assert_eq!(report.phase, CoordinatorPhase::Done);
    assert_eq!(report.partition_runs, 1);
    assert_eq!(report.merged_cells, 25);
    assert_eq!(report.points_total, 1);
    assert_eq!(report.points_discovered, 1);
    assert_eq!(report.points_rescued, 1);
    assert_eq!(report.cycles, runner.total_cycles());
    assert!(runner.is_done());

    let explorer = &report.explorers[0];
    assert_eq!(explorer.outcome, Some(ExplorerOutcome::Returned));
    assert_eq!(explorer.stats.forward_moves, 24);
    let rescuer = &report.rescuers[0];
    assert_eq!(rescuer.cluster_id, Some(1));
    assert_eq!(rescuer.assigned, vec![0]);
    assert_eq!(rescuer.rescued, vec![0]);
    assert_eq!(rescuer.outcome, Some(RescuerOutcome::Completed));
    assert_eq!(runner.environment().position_of("rescuer-1").unwrap(), BASE);
}

#[test]
fn walled_scenario_rescues_every_discovered_point() {
    let mut runner = runner_for(MissionScenario::Walled12x12);
    let report = runner.run(DEFAULT_MAX_CYCLES);

    assert!(report.completed);
    assert!(report.points_discovered > 0);
    assert_eq!(report.points_rescued, report.points_discovered);
    assert_eq!(report.explorers.len(), 4);
    assert_eq!(report.rescuers.len(), 4);
    assert!(report
        .explorers
        .iter()
        .all(|explorer| explorer.outcome == Some(ExplorerOutcome::Returned)));

    let clusters = runner.coordinator().clusters().unwrap();
    let assigned: usize = clusters.iter().map(Cluster::len).sum();
    assert_eq!(assigned, report.points_discovered);
}

#[test]
fn rescuers_stay_at_base_until_exploration_ends() {
    let mut runner = runner_for(MissionScenario::Open5x5);
    while runner.explorers()[0].status() == AgentStatus::Active {
        runner.cycle();
        assert_eq!(runner.environment().position_of("rescuer-1").unwrap(), BASE);
        assert!(runner.rescuers()[0].assignment().is_none());
    }
    assert!(runner.total_cycles() > 4);
}

#[test]
fn cycle_limit_stops_early() {
    let mut runner = runner_for(MissionScenario::Open5x5);
    let report = runner.run(3);

    assert!(!report.completed);
    assert_eq!(report.cycles, 3);
    assert_eq!(report.phase, CoordinatorPhase::AwaitingExploration);
    assert_eq!(report.points_rescued, 0);
    assert_eq!(report.merged_cells, 0);
}

#[test]
fn deactivated_agents_record_idle_cycle() {
    let mut runner = runner_for(MissionScenario::Open5x5);
    runner.run(DEFAULT_MAX_CYCLES);

    let explorer = runner.agent_stats("explorer-1").unwrap();
    let idle_since = explorer.idle_since.unwrap();
    assert_eq!(explorer.decision_count, idle_since);
    let rescuer = runner.agent_stats("rescuer-1").unwrap();
    assert!(rescuer.idle_since.unwrap() > idle_since);
    assert!(runner.agent_stats("nobody").is_none());
}

#[test]
fn mission_without_rescuers_still_finishes() {
    let mut config = MissionConfig::from_scenario(MissionScenario::Open5x5, 0);
    config.rescuers.count = 0;
    let mut runner = MissionRunner::from_config(&config).unwrap();
    let report = runner.run(DEFAULT_MAX_CYCLES);

    assert!(report.completed);
    assert_eq!(report.points_discovered, 1);
    assert_eq!(report.points_rescued, 0);
    assert!(report.rescuers.is_empty());
}

#[test]
fn from_config_reports_config_and_layout_errors() {
    let mut config = MissionConfig::default();
    config.explorers.count = 0;
    assert!(matches!(
        MissionRunner::from_config(&config),
        Err(MissionError::Config(ConfigError::Invalid { .. }))
    ));

    let mut config = MissionConfig::default();
    config.environment.points = vec![PointConfig::new(9, 9, vec![])];
    assert_eq!(
        MissionRunner::from_config(&config).unwrap_err(),
        MissionError::Environment(EnvironmentError::PointOutOfBounds { coord: coord(9, 9) })
    );

    let mut config = MissionConfig::default();
    config.rescuers.id_prefix = config.explorers.id_prefix.clone();
    assert!(matches!(
        MissionRunner::from_config(&config),
        Err(MissionError::Environment(EnvironmentError::DuplicateAgent { .. }))
    ));
}
