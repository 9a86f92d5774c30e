use serde::{Deserialize, Serialize};

use crate::{Direction, Position, maze::Maze, mover};

/// Upper bound of the mouth animation phase.
pub const MOUTH_MAX: u8 = 45;
/// Phase change per tick.
pub const MOUTH_STEP: u8 = 5;

/// The player-controlled character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Position,
    pub direction: Direction,
    /// Buffered turn request, retried every tick until it becomes possible.
    pub desired: Direction,
    pub speed: f32,
    mouth: u8,
    mouth_opening: bool,
}

impl Player {
    /// Creates a player facing right, mouth closed.
    pub fn new(position: Position, speed: f32) -> Self {
        Player {
            position,
            direction: Direction::Right,
            desired: Direction::Right,
            speed,
            mouth: 0,
            mouth_opening: true,
        }
    }

    /// Advances the player by one tick.
    pub fn update(&mut self, maze: &Maze) {
        if !mover::would_block(maze, self.position, self.desired, self.speed) {
            self.direction = self.desired;
        }
        self.position = mover::try_move(maze, self.position, self.direction, self.speed);
        self.animate();
    }

    /// Bounces the mouth between closed and fully open.
    fn animate(&mut self) {
        if self.mouth_opening {
            self.mouth = (self.mouth + MOUTH_STEP).min(MOUTH_MAX);
        } else {
            self.mouth = self.mouth.saturating_sub(MOUTH_STEP);
        }
        if self.mouth >= MOUTH_MAX {
            self.mouth_opening = false;
        } else if self.mouth == 0 {
            self.mouth_opening = true;
        }
    }

    /// Mouth opening in degrees, `0..=45`.
    pub fn mouth(&self) -> u8 {
        self.mouth
    }

    /// Puts the player back at `position`, keeping its heading.
    pub fn respawn(&mut self, position: Position) {
        self.position = position;
    }
}
