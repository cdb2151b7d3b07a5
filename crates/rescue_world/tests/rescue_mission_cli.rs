#![cfg(any(feature = "test_tier_required", feature = "test_tier_full"))]

#[cfg(feature = "test_tier_full")]
use std::fs;
use std::process::Command;

#[cfg(feature = "test_tier_required")]
#[test]
fn rescue_mission_runs_open_scenario() {
    let bin = env!("CARGO_BIN_EXE_rescue_mission");
    let output = Command::new(bin)
        .args(["--scenario", "open_5x5"])
        .output()
        .expect("run rescue_mission");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("scenario: open_5x5"));
    assert!(stdout.contains("phase: Done"));
    assert!(stdout.contains("points: 1 discovered, 1 rescued, 1 total"));
}

#[cfg(feature = "test_tier_required")]
#[test]
fn rescue_mission_lists_scenarios() {
    let bin = env!("CARGO_BIN_EXE_rescue_mission");
    let output = Command::new(bin)
        .arg("--list-scenarios")
        .output()
        .expect("run rescue_mission");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let names: Vec<&str> = stdout.lines().collect();
    assert_eq!(names, vec!["open_5x5", "walled_12x12", "generated"]);
}

#[cfg(feature = "test_tier_required")]
#[test]
fn rescue_mission_rejects_unknown_scenario() {
    let bin = env!("CARGO_BIN_EXE_rescue_mission");
    let output = Command::new(bin)
        .args(["--scenario", "moon"])
        .output()
        .expect("run rescue_mission");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown scenario"));
}

#[cfg(feature = "test_tier_required")]
#[test]
fn rescue_mission_exits_with_two_at_cycle_limit() {
    let bin = env!("CARGO_BIN_EXE_rescue_mission");
    let output = Command::new(bin)
        .args(["--scenario", "open_5x5", "--max-cycles", "3"])
        .output()
        .expect("run rescue_mission");

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cycles: 3"));
}

#[cfg(feature = "test_tier_full")]
#[test]
fn rescue_mission_writes_cluster_files_and_report() {
    let dir = std::env::temp_dir().join(format!("rescue-mission-cli-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    let report = dir.join("report.json");

    let bin = env!("CARGO_BIN_EXE_rescue_mission");
    let output = Command::new(bin)
        .args(["--scenario", "walled_12x12", "--out-dir"])
        .arg(&dir)
        .arg("--report")
        .arg(&report)
        .output()
        .expect("run rescue_mission");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cluster_files: 4"));
    for id in 1..=4 {
        assert!(dir.join(format!("cluster{id}.txt")).exists());
    }
    let json = fs::read_to_string(&report).expect("read report");
    assert!(json.contains("\"completed\": true"));
    let _ = fs::remove_dir_all(&dir);
}

#[cfg(feature = "test_tier_full")]
#[test]
fn rescue_mission_loads_toml_config() {
    let dir = std::env::temp_dir().join(format!("rescue-mission-toml-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let config = dir.join("mission.toml");
    fs::write(
        &config,
        "[environment]\nwidth = 4\nheight = 4\nbase = { x = 0, y = 0 }\n\n\
         [[environment.points]]\ncoord = { x = 3, y = 3 }\n\n\
         [explorers]\ncount = 1\n\n[rescuers]\ncount = 1\n",
    )
    .expect("write config");

    let bin = env!("CARGO_BIN_EXE_rescue_mission");
    let output = Command::new(bin)
        .arg("--config")
        .arg(&config)
        .output()
        .expect("run rescue_mission");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mission.toml"));
    assert!(stdout.contains("cells_mapped: 16"));
    let _ = fs::remove_dir_all(&dir);
}
