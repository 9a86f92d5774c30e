use serde::{Deserialize, Serialize};

pub mod enemy;
pub mod level;
pub mod map;
pub mod maze;
pub mod mover;
pub mod player;
pub mod random;
pub mod simulation;

/// A continuous 2D coordinate measured in tiles.
///
/// The integer part names the cell, the fractional part is progress across it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Position { x, y }
    }

    /// Returns this position moved `distance` tiles along `direction`.
    pub fn step(self, direction: Direction, distance: f32) -> Self {
        let (dx, dy) = direction.delta();
        Position {
            x: self.x + dx * distance,
            y: self.y + dy * distance,
        }
    }

    pub fn distance_squared(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Position) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Column and row of the cell containing this position.
    ///
    /// Both are negative when the position lies left of or above the origin.
    pub fn cell(self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}

/// One of the four movement directions. There is no idle direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Fixed iteration order used wherever ties are broken by order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector in tile space (y grows downwards).
    #[inline]
    pub fn delta(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

/// Represents the state of a single maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellKind {
    Wall,
    Pickup,
    PowerPickup,
    #[default]
    Empty,
}

/// The kind of consumable removed from a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    Pickup,
    PowerPickup,
}
