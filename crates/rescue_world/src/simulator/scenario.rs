//! Built-in mission scenarios (stable IDs).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::geometry::{Direction, DirectionPriority, GridCoord};

use super::config::{ConfigError, DifficultyConfig, EnvironmentConfig, MissionConfig, PointConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionScenario {
    Open5x5,
    Walled12x12,
    Generated,
}

impl MissionScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionScenario::Open5x5 => "open_5x5",
            MissionScenario::Walled12x12 => "walled_12x12",
            MissionScenario::Generated => "generated",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "open_5x5" | "open-5x5" | "open" | "minimal" => Some(MissionScenario::Open5x5),
            "walled_12x12" | "walled-12x12" | "walled" | "rooms" => {
                Some(MissionScenario::Walled12x12)
            }
            "generated" | "random" | "seeded" => Some(MissionScenario::Generated),
            _ => None,
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["open_5x5", "walled_12x12", "generated"]
    }

    pub fn build(&self, seed: u64) -> MissionConfig {
        let mut config = match self {
            MissionScenario::Open5x5 => open_5x5(),
            MissionScenario::Walled12x12 => walled_12x12(),
            MissionScenario::Generated => generated(seed),
        };
        config.seed = seed;
        config.sanitized()
    }
}

impl FromStr for MissionScenario {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        MissionScenario::parse(input).ok_or_else(|| ConfigError::UnknownScenario(input.to_string()))
    }
}

impl MissionConfig {
    pub fn from_scenario(scenario: MissionScenario, seed: u64) -> Self {
        scenario.build(seed)
    }
}

/// Single explorer sweeping east then south towards one point in the far
/// corner.
fn open_5x5() -> MissionConfig {
    let mut config = MissionConfig::default();
    config.environment = EnvironmentConfig {
        width: 5,
        height: 5,
        base: GridCoord::new(2, 2),
        walls: Vec::new(),
        points: vec![PointConfig::new(4, 4, vec![72.0, 18.0, 2.0])],
        difficulties: Vec::new(),
    };
    config.explorers.count = 1;
    config.explorers.priorities = vec![DirectionPriority::complete(&[
        Direction::E,
        Direction::S,
        Direction::W,
        Direction::N,
    ])];
    config.rescuers.count = 1;
    config
}

/// Two rooms split by walls with narrow gaps, rough terrain and six points.
fn walled_12x12() -> MissionConfig {
    let mut walls = Vec::new();
    for y in 0..=8 {
        walls.push(GridCoord::new(6, y));
    }
    for x in 0..=3 {
        walls.push(GridCoord::new(x, 4));
    }
    let mut config = MissionConfig::default();
    config.environment = EnvironmentConfig {
        width: 12,
        height: 12,
        base: GridCoord::new(2, 2),
        walls,
        points: vec![
            PointConfig::new(5, 0, vec![88.0, 22.0, 3.0]),
            PointConfig::new(0, 7, vec![64.0, 14.0, 1.0]),
            PointConfig::new(9, 2, vec![120.0, 30.0, 4.0]),
            PointConfig::new(10, 10, vec![55.0, 12.0, 2.0]),
            PointConfig::new(4, 9, vec![97.0, 25.0, 3.0]),
            PointConfig::new(8, 6, vec![70.0, 16.0, 1.0]),
        ],
        difficulties: vec![
            DifficultyConfig {
                coord: GridCoord::new(3, 7),
                difficulty: 2.0,
            },
            DifficultyConfig {
                coord: GridCoord::new(4, 7),
                difficulty: 2.0,
            },
            DifficultyConfig {
                coord: GridCoord::new(9, 9),
                difficulty: 3.0,
            },
        ],
    };
    config
}

const GENERATED_SIZE: i32 = 16;
const GENERATED_POINTS: usize = 10;
const GENERATED_WALL_PERCENT: u64 = 15;

/// 16x16 layout drawn from `seed`: roughly 15% walls, ten points and a few
/// rough cells. The base and its neighbours are always clear.
fn generated(seed: u64) -> MissionConfig {
    let mut rng = SplitMix64::new(seed);
    let base = GridCoord::new(GENERATED_SIZE / 2, GENERATED_SIZE / 2);
    let near_base = |coord: GridCoord| (coord.x - base.x).abs() <= 1 && (coord.y - base.y).abs() <= 1;

    let mut walls = Vec::new();
    let mut difficulties = Vec::new();
    for y in 0..GENERATED_SIZE {
        for x in 0..GENERATED_SIZE {
            let coord = GridCoord::new(x, y);
            if near_base(coord) {
                continue;
            }
            let roll = rng.next_below(100);
            if roll < GENERATED_WALL_PERCENT {
                walls.push(coord);
            } else if roll < GENERATED_WALL_PERCENT + 5 {
                difficulties.push(DifficultyConfig {
                    coord,
                    difficulty: 1.5 + rng.next_f64() * 1.5,
                });
            }
        }
    }

    let mut points: Vec<PointConfig> = Vec::new();
    let mut attempts = 0;
    while points.len() < GENERATED_POINTS && attempts < 10_000 {
        attempts += 1;
        let coord = GridCoord::new(
            rng.next_below(GENERATED_SIZE as u64) as i32,
            rng.next_below(GENERATED_SIZE as u64) as i32,
        );
        if coord == base || walls.contains(&coord) || points.iter().any(|p| p.coord == coord) {
            continue;
        }
        let attributes = vec![
            40.0 + (rng.next_below(100) as f64),
            8.0 + (rng.next_below(25) as f64),
            1.0 + (rng.next_below(4) as f64),
        ];
        points.push(PointConfig {
            coord,
            attributes,
        });
    }

    let mut config = MissionConfig::default();
    config.environment = EnvironmentConfig {
        width: GENERATED_SIZE,
        height: GENERATED_SIZE,
        base,
        walls,
        points,
        difficulties,
    };
    config
}

/// splitmix64 stream; small, seedable and stable across platforms.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut x = self.state;
        x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        x ^ (x >> 31)
    }

    pub fn next_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.next_u64() % bound
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}
