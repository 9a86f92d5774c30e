use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Direction, Position, maze::Maze, mover, random::RandomSource};

/// One-in-`WANDER_ODDS` chance per tick of re-choosing direction on an open corridor.
pub const WANDER_ODDS: u32 = 21;

/// How eagerly an enemy hunts the player instead of wandering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    Aggressive,
    Moderate,
    Timid,
    Erratic,
}

impl Personality {
    /// The standard line-up, in update order.
    pub const ROSTER: [Personality; 4] = [
        Personality::Aggressive,
        Personality::Moderate,
        Personality::Timid,
        Personality::Erratic,
    ];

    /// Percent chance of taking the chasing turn when a choice is made.
    pub fn chase_weight(self) -> u32 {
        match self {
            Personality::Aggressive => 80,
            Personality::Moderate => 60,
            Personality::Timid => 40,
            Personality::Erratic => 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyMode {
    Normal,
    /// Can be eaten by the player until the countdown runs out.
    Vulnerable { ticks_left: u32 },
}

/// An autonomous enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub position: Position,
    pub direction: Direction,
    pub personality: Personality,
    pub speed: f32,
    mode: EnemyMode,
}

impl Enemy {
    /// Creates an enemy in normal mode.
    pub fn new(
        position: Position,
        direction: Direction,
        personality: Personality,
        speed: f32,
    ) -> Self {
        Enemy {
            position,
            direction,
            personality,
            speed,
            mode: EnemyMode::Normal,
        }
    }

    /// Returns the current mode, including any running countdown.
    pub fn mode(&self) -> EnemyMode {
        self.mode
    }

    /// Whether the player can eat this enemy right now.
    pub fn is_vulnerable(&self) -> bool {
        matches!(self.mode, EnemyMode::Vulnerable { .. })
    }

    /// Makes the enemy edible for `ticks` ticks, restarting any running countdown.
    pub fn frighten(&mut self, ticks: u32) {
        self.mode = if ticks == 0 {
            EnemyMode::Normal
        } else {
            EnemyMode::Vulnerable { ticks_left: ticks }
        };
    }

    /// Moves the enemy to `home` and ends its vulnerability.
    pub fn send_home(&mut self, home: Position) {
        self.position = home;
        self.mode = EnemyMode::Normal;
    }

    /// Advances the enemy by one tick while it hunts (or flees) `target`.
    pub fn update<R: RandomSource>(&mut self, maze: &Maze, target: Position, rng: &mut R) {
        self.count_down();

        let lookahead = self.speed * 2.0;
        let wander = rng.next_below(WANDER_ODDS) == 0;
        if wander || mover::would_block(maze, self.position, self.direction, lookahead) {
            self.choose_direction(maze, target, rng);
        }

        self.position = mover::try_move(maze, self.position, self.direction, self.speed);
    }

    fn count_down(&mut self) {
        if let EnemyMode::Vulnerable { ticks_left } = self.mode {
            let ticks_left = ticks_left.saturating_sub(1);
            self.mode = if ticks_left == 0 {
                EnemyMode::Normal
            } else {
                EnemyMode::Vulnerable { ticks_left }
            };
        }
    }

    fn choose_direction<R: RandomSource>(&mut self, maze: &Maze, target: Position, rng: &mut R) {
        let lookahead = self.speed * 2.0;
        let viable: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&direction| !mover::would_block(maze, self.position, direction, lookahead))
            .collect();
        if viable.is_empty() {
            return;
        }

        let chosen = if self.is_vulnerable() {
            rng.choose(&viable)
        } else if rng.next_below(100) < self.personality.chase_weight() {
            self.closest_toward(&viable, target)
        } else {
            rng.choose(&viable)
        };

        if let Some(direction) = chosen {
            if direction != self.direction {
                trace!(
                    personality = ?self.personality,
                    from = ?self.direction,
                    to = ?direction,
                    "enemy turned"
                );
            }
            self.direction = direction;
        }
    }

    /// The direction whose tile-ahead point lies nearest `target`; the earliest wins ties.
    fn closest_toward(&self, viable: &[Direction], target: Position) -> Option<Direction> {
        let mut best: Option<(f32, Direction)> = None;
        for &direction in viable {
            let distance = self.position.step(direction, 1.0).distance_squared(target);
            if best.is_none_or(|(closest, _)| distance < closest) {
                best = Some((distance, direction));
            }
        }
        best.map(|(_, direction)| direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SequenceRandom;

    const ROOM: &str = "\
#######
#     #
#     #
#     #
#######";

    const POCKET: &str = "\
###
# #
###";

    fn room() -> Maze {
        Maze::parse(ROOM).unwrap()
    }

    fn enemy_at(x: f32, y: f32, personality: Personality) -> Enemy {
        Enemy::new(Position::new(x, y), Direction::Up, personality, 0.08)
    }

    #[test]
    fn vulnerability_lasts_exactly_its_countdown() {
        let maze = Maze::parse(POCKET).unwrap();
        let mut rng = SequenceRandom::new([1]);
        let mut enemy = enemy_at(1.0, 1.0, Personality::Aggressive);
        enemy.frighten(300);

        for tick in 1..300 {
            enemy.update(&maze, Position::new(1.0, 1.0), &mut rng);
            assert!(enemy.is_vulnerable(), "should still be vulnerable after tick {tick}");
        }
        enemy.update(&maze, Position::new(1.0, 1.0), &mut rng);
        assert_eq!(enemy.mode(), EnemyMode::Normal);
    }

    #[test]
    fn chasing_picks_the_direction_nearest_the_target() {
        let maze = room();
        let mut rng = SequenceRandom::new([0]);
        let mut enemy = enemy_at(3.0, 2.0, Personality::Aggressive);
        enemy.update(&maze, Position::new(5.0, 2.0), &mut rng);
        assert_eq!(enemy.direction, Direction::Right);
        assert_eq!(rng.consumed(), 2);
    }

    #[test]
    fn chase_ties_go_to_the_first_direction() {
        let maze = room();
        let mut rng = SequenceRandom::new([0]);
        let mut enemy = enemy_at(3.0, 2.0, Personality::Aggressive);
        enemy.direction = Direction::Left;
        enemy.update(&maze, Position::new(3.0, 2.0), &mut rng);
        assert_eq!(enemy.direction, Direction::Up);
    }

    #[test]
    fn vulnerable_enemies_pick_at_random_without_a_chase_roll() {
        let maze = room();
        let mut rng = SequenceRandom::new([0, 2]);
        let mut enemy = enemy_at(3.0, 2.0, Personality::Aggressive);
        enemy.frighten(10);
        enemy.update(&maze, Position::new(5.0, 2.0), &mut rng);
        assert_eq!(enemy.direction, Direction::Left);
        assert_eq!(rng.consumed(), 2);
    }

    #[test]
    fn failed_chase_roll_wanders() {
        let maze = room();
        let mut rng = SequenceRandom::new([0, 50, 3]);
        let mut enemy = enemy_at(3.0, 2.0, Personality::Timid);
        enemy.update(&maze, Position::new(3.0, 1.0), &mut rng);
        assert_eq!(enemy.direction, Direction::Right);

        // A roll equal to the weight already misses.
        let mut rng = SequenceRandom::new([0, 40, 3]);
        let mut enemy = enemy_at(3.0, 2.0, Personality::Timid);
        enemy.update(&maze, Position::new(3.0, 1.0), &mut rng);
        assert_eq!(enemy.direction, Direction::Right);

        let mut rng = SequenceRandom::new([0, 39]);
        let mut enemy = enemy_at(3.0, 2.0, Personality::Timid);
        enemy.update(&maze, Position::new(3.0, 1.0), &mut rng);
        assert_eq!(enemy.direction, Direction::Up);
    }

    #[test]
    fn blocked_lookahead_forces_a_new_direction() {
        let maze = room();
        let mut rng = SequenceRandom::new([5]);
        let mut enemy = enemy_at(1.0, 1.0, Personality::Aggressive);
        enemy.update(&maze, Position::new(5.0, 3.0), &mut rng);
        assert_eq!(enemy.direction, Direction::Right);
        assert!(enemy.position.x > 1.0);
    }

    #[test]
    fn wall_two_steps_ahead_triggers_a_turn() {
        let maze = room();
        let start = Position::new(5.45, 2.0);
        assert!(!mover::would_block(&maze, start, Direction::Right, 0.08));
        assert!(mover::would_block(&maze, start, Direction::Right, 0.16));

        let mut rng = SequenceRandom::new([5]);
        let mut enemy = enemy_at(start.x, start.y, Personality::Aggressive);
        enemy.direction = Direction::Right;
        enemy.update(&maze, Position::new(1.0, 2.0), &mut rng);
        assert_eq!(enemy.direction, Direction::Left);
        assert!((enemy.position.x - 5.37).abs() < 1e-4);
        assert_eq!(enemy.position.y, 2.0);
    }

    #[test]
    fn open_corridor_keeps_heading_without_a_wander_roll() {
        let maze = room();
        let mut rng = SequenceRandom::new([7]);
        let mut enemy = enemy_at(2.0, 2.0, Personality::Aggressive);
        enemy.direction = Direction::Left;
        enemy.update(&maze, Position::new(5.0, 2.0), &mut rng);
        assert_eq!(enemy.direction, Direction::Left);
        assert_eq!(rng.consumed(), 1);
    }

    #[test]
    fn boxed_in_enemy_keeps_its_direction() {
        let maze = Maze::parse(POCKET).unwrap();
        let mut rng = SequenceRandom::new([0]);
        let mut enemy = Enemy::new(
            Position::new(1.3, 1.3),
            Direction::Left,
            Personality::Moderate,
            0.3,
        );
        enemy.update(&maze, Position::new(1.0, 1.0), &mut rng);
        assert_eq!(enemy.direction, Direction::Left);
        assert_eq!(rng.consumed(), 1);
    }

    #[test]
    fn send_home_clears_vulnerability() {
        let mut enemy = enemy_at(3.0, 2.0, Personality::Erratic);
        enemy.frighten(300);
        enemy.send_home(Position::new(1.0, 1.0));
        assert_eq!(enemy.position, Position::new(1.0, 1.0));
        assert!(!enemy.is_vulnerable());
    }
}
