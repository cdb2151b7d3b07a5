use clap::Parser;
use rescue_world::{write_cluster_files, MissionConfig, MissionRunner, MissionScenario};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_CYCLE_LIMIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "rescue_mission")]
#[command(about = "Explore a grid, partition the points found and dispatch rescuers", long_about = None)]
struct Cli {
    /// Built-in scenario to run (ignored when --config is given)
    #[arg(short, long, default_value = "open_5x5")]
    scenario: String,

    /// Mission config file (TOML)
    #[arg(short, long, env = "RESCUE_MISSION_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for generated layouts
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Override the configured cycle limit
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Directory receiving one cluster<n>.txt per rescuer
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Write the JSON mission report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print the built-in scenarios and exit
    #[arg(long)]
    list_scenarios: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rescue_world=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<(String, MissionConfig), String> {
    if let Some(path) = &cli.config {
        let config = MissionConfig::load_toml(path).map_err(|err| err.to_string())?;
        return Ok((path.display().to_string(), config));
    }
    let scenario = cli.scenario.parse::<MissionScenario>().map_err(|err| {
        format!(
            "{err} (available: {})",
            MissionScenario::variants().join(", ")
        )
    })?;
    Ok((
        scenario.as_str().to_string(),
        MissionConfig::from_scenario(scenario, cli.seed),
    ))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.list_scenarios {
        for name in MissionScenario::variants() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }
    init_logging();

    let (source, mut config) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(max_cycles) = cli.max_cycles {
        config.max_cycles = max_cycles;
    }

    let mut runner = match MissionRunner::from_config(&config) {
        Ok(runner) => runner,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let report = runner.run(config.max_cycles);

    if let Some(dir) = &cli.out_dir {
        let clusters = runner
            .coordinator()
            .clusters()
            .map(|clusters| clusters.to_vec())
            .unwrap_or_default();
        match write_cluster_files(dir, &clusters) {
            Ok(paths) => println!("cluster_files: {}", paths.len()),
            Err(err) => {
                eprintln!("failed to write cluster files: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
    if let Some(path) = &cli.report {
        if let Err(err) = report.save_json(path) {
            eprintln!("failed to write report: {err}");
            return ExitCode::FAILURE;
        }
    }

    println!("scenario: {source}");
    println!("cycles: {}", report.cycles);
    println!("phase: {:?}", report.phase);
    println!("cells_mapped: {}", report.merged_cells);
    println!(
        "points: {} discovered, {} rescued, {} total",
        report.points_discovered, report.points_rescued, report.points_total
    );

    if report.completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_CYCLE_LIMIT)
    }
}
