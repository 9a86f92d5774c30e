//! Sub-tile movement and wall collision shared by the player and the enemies.
//!
//! An entity's hitbox is the square from its position to `PROBE_MARGIN` tiles
//! right and down. Only its four corners are tested against the maze, so the
//! box may clip a wall corner that lies strictly between them.

use crate::{Direction, Position, maze::Maze};

/// Offset of the far probe corners from the position, in tiles.
pub const PROBE_MARGIN: f32 = 0.4;

/// The four cells sampled for a hitbox at `position`.
pub fn probe_cells(position: Position) -> [(i32, i32); 4] {
    let near_x = position.x.floor() as i32;
    let near_y = position.y.floor() as i32;
    let far_x = (position.x + PROBE_MARGIN).floor() as i32;
    let far_y = (position.y + PROBE_MARGIN).floor() as i32;
    [
        (near_x, near_y),
        (far_x, near_y),
        (near_x, far_y),
        (far_x, far_y),
    ]
}

/// Whether a hitbox at `position` would overlap a wall or leave the maze.
pub fn is_blocked(maze: &Maze, position: Position) -> bool {
    probe_cells(position)
        .iter()
        .any(|&(col, row)| maze.is_blocked(col, row))
}

/// Moves `speed` tiles along `direction` if the destination is clear.
///
/// A blocked move leaves the position untouched; there is no sliding along
/// walls and no partial step.
pub fn try_move(maze: &Maze, position: Position, direction: Direction, speed: f32) -> Position {
    let candidate = position.step(direction, speed);
    if is_blocked(maze, candidate) {
        position
    } else {
        candidate
    }
}

/// Whether a move of `distance` tiles along `direction` would be refused.
#[inline]
pub fn would_block(maze: &Maze, position: Position, direction: Direction, distance: f32) -> bool {
    is_blocked(maze, position.step(direction, distance))
}
