use serde::{Deserialize, Serialize};

use crate::{
    Position,
    enemy::Personality,
    maze::{LayoutError, Maze},
    mover,
};

/// The reference 28 x 31 maze. The middle row is an open tunnel whose ends are
/// sealed by the maze boundary.
pub const CLASSIC_LAYOUT: &str = "\
############################
#............##............#
#.####.#####.##.#####.####.#
#o####.#####.##.#####.####o#
#.####.#####.##.#####.####.#
#..........................#
#.####.##.########.##.####.#
#.####.##.########.##.####.#
#......##....##....##......#
######.##### ## #####.######
######.##### ## #####.######
######.##          ##.######
######.## ###  ### ##.######
######.## #      # ##.######
      .   #      #   .      
######.## #      # ##.######
######.## ######## ##.######
######.##          ##.######
######.## ######## ##.######
######.## ######## ##.######
#............##............#
#.####.#####.##.#####.####.#
#.####.#####.##.#####.####.#
#o..##.......  .......##..o#
###.##.##.########.##.##.###
###.##.##.########.##.##.###
#......##....##....##......#
#.##########.##.##########.#
#.##########.##.##########.#
#..........................#
############################";

/// Errors raised while assembling a [`Level`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LevelError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("Cannot place {what} inside a wall at ({x}, {y}).")]
    SpawnBlocked { what: &'static str, x: f32, y: f32 },
}

/// Where one enemy enters the maze, and how it behaves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub position: Position,
    pub personality: Personality,
}

/// Fixed entry points for one playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawns {
    pub player: Position,
    /// Enemies in update order.
    pub enemies: Vec<EnemySpawn>,
    /// Where an eaten enemy reappears.
    pub enemy_home: Position,
}

impl Spawns {
    /// Spawn points of the reference maze.
    pub fn classic() -> Self {
        let columns = [12.0, 14.0, 13.0, 15.0];
        Spawns {
            player: Position::new(14.0, 23.0),
            enemies: Personality::ROSTER
                .into_iter()
                .zip(columns)
                .map(|(personality, x)| EnemySpawn {
                    position: Position::new(x, 14.0),
                    personality,
                })
                .collect(),
            enemy_home: Position::new(14.0, 14.0),
        }
    }
}

/// A pristine maze together with its spawn points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    maze: Maze,
    spawns: Spawns,
}

impl Level {
    /// Pairs a maze with spawn points, rejecting any spawn that sits in a wall.
    pub fn new(maze: Maze, spawns: Spawns) -> Result<Self, LevelError> {
        let placements = std::iter::once(("the player", spawns.player))
            .chain(spawns.enemies.iter().map(|spawn| ("an enemy", spawn.position)))
            .chain(std::iter::once(("the enemy home", spawns.enemy_home)));
        for (what, position) in placements {
            if mover::is_blocked(&maze, position) {
                return Err(LevelError::SpawnBlocked {
                    what,
                    x: position.x,
                    y: position.y,
                });
            }
        }
        Ok(Level { maze, spawns })
    }

    /// The reference maze with the standard four enemies.
    pub fn classic() -> Result<Self, LevelError> {
        Self::new(Maze::parse(CLASSIC_LAYOUT)?, Spawns::classic())
    }

    /// Returns the maze as it looks before anything is eaten.
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// Returns the spawn points.
    pub fn spawns(&self) -> &Spawns {
        &self.spawns
    }
}
