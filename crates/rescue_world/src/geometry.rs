use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Integer grid coordinate. Agents use coordinates relative to the base,
/// the environment uses absolute ones; `y` grows southwards.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const ORIGIN: GridCoord = GridCoord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Direction of the single step leading from `self` to `other`, if the two
    /// coordinates are 8-adjacent.
    pub fn step_to(self, other: GridCoord) -> Option<Direction> {
        Direction::from_delta(other.x - self.x, other.y - self.y)
    }

    /// Packs the coordinate into one `u64` map key.
    pub fn pack(self) -> u64 {
        ((self.x as u32 as u64) << 32) | (self.y as u32 as u64)
    }

    pub fn unpack(key: u64) -> Self {
        Self::new((key >> 32) as u32 as i32, key as u32 as i32)
    }
}

impl Add for GridCoord {
    type Output = GridCoord;

    fn add(self, rhs: GridCoord) -> GridCoord {
        GridCoord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for GridCoord {
    type Output = GridCoord;

    fn sub(self, rhs: GridCoord) -> GridCoord {
        GridCoord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The eight compass directions, in the fixed sensing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(alias = "UP", alias = "n")]
    N,
    #[serde(alias = "UP-RIGHT", alias = "ne")]
    NE,
    #[serde(alias = "RIGHT", alias = "e")]
    E,
    #[serde(alias = "DOWN-RIGHT", alias = "se")]
    SE,
    #[serde(alias = "DOWN", alias = "s")]
    S,
    #[serde(alias = "DOWN-LEFT", alias = "sw")]
    SW,
    #[serde(alias = "LEFT", alias = "w")]
    W,
    #[serde(alias = "UP-LEFT", alias = "nw")]
    NW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::N => (0, -1),
            Direction::NE => (1, -1),
            Direction::E => (1, 0),
            Direction::SE => (1, 1),
            Direction::S => (0, 1),
            Direction::SW => (-1, 1),
            Direction::W => (-1, 0),
            Direction::NW => (-1, -1),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        Direction::ALL
            .iter()
            .copied()
            .find(|direction| direction.delta() == (dx, dy))
    }

    /// Slot of this direction in an 8-slot outcome vector.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_diagonal(self) -> bool {
        let (dx, dy) = self.delta();
        dx != 0 && dy != 0
    }

    pub fn opposite(self) -> Self {
        Direction::ALL[(self.index() + 4) % 8]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::N => "N",
            Direction::NE => "NE",
            Direction::E => "E",
            Direction::SE => "SE",
            Direction::S => "S",
            Direction::SW => "SW",
            Direction::W => "W",
            Direction::NW => "NW",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_uppercase().as_str() {
            "N" | "UP" | "NORTH" => Some(Direction::N),
            "NE" | "UP-RIGHT" | "UP_RIGHT" => Some(Direction::NE),
            "E" | "RIGHT" | "EAST" => Some(Direction::E),
            "SE" | "DOWN-RIGHT" | "DOWN_RIGHT" => Some(Direction::SE),
            "S" | "DOWN" | "SOUTH" => Some(Direction::S),
            "SW" | "DOWN-LEFT" | "DOWN_LEFT" => Some(Direction::SW),
            "W" | "LEFT" | "WEST" => Some(Direction::W),
            "NW" | "UP-LEFT" | "UP_LEFT" => Some(Direction::NW),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn euclidean_distance(a: GridCoord, b: GridCoord) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    ((dx * dx) + (dy * dy)).sqrt()
}

pub fn euclidean_distance_f64(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    ((dx * dx) + (dy * dy)).sqrt()
}

/// Minimum number of 8-connected steps between two coordinates.
pub fn chebyshev_distance(a: GridCoord, b: GridCoord) -> u32 {
    (a.x - b.x).unsigned_abs().max((a.y - b.y).unsigned_abs())
}

/// A total ordering of the eight compass directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Direction>", into = "Vec<Direction>")]
pub struct DirectionPriority([Direction; 8]);

impl Default for DirectionPriority {
    fn default() -> Self {
        Self(Direction::ALL)
    }
}

impl DirectionPriority {
    /// Builds a total order from a possibly partial or repetitive list: the
    /// first occurrence of each direction is kept, missing directions are
    /// appended in compass order.
    pub fn complete(preferred: &[Direction]) -> Self {
        let mut order = Vec::with_capacity(8);
        for direction in preferred.iter().chain(Direction::ALL.iter()) {
            if !order.contains(direction) {
                order.push(*direction);
            }
        }
        let mut slots = Direction::ALL;
        slots.copy_from_slice(&order[..8]);
        Self(slots)
    }

    /// Default order for the `index`-th member of an exploring team. The four
    /// cardinal leads (N, S, W, E) make neighbouring explorers diverge.
    pub fn for_team_member(index: usize) -> Self {
        use Direction::*;
        let lead: &[Direction] = match index % 4 {
            0 => &[N, E, S, W, NW, SW, SE, NE],
            1 => &[S, W, N, E, SW, NW, NE, SE],
            2 => &[W, S, E, N, SW, NW, SE, NE],
            _ => &[E, N, W, S, NE, SE, SW, NW],
        };
        Self::complete(lead)
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Direction] {
        &self.0
    }
}

impl TryFrom<Vec<Direction>> for DirectionPriority {
    type Error = String;

    fn try_from(value: Vec<Direction>) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err("direction priority must name at least one direction".to_string());
        }
        Ok(Self::complete(&value))
    }
}

impl From<DirectionPriority> for Vec<Direction> {
    fn from(value: DirectionPriority) -> Self {
        value.0.to_vec()
    }
}
