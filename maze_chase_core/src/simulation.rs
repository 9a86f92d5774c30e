use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Direction, PickupKind, Position,
    enemy::Enemy,
    level::Level,
    maze::Maze,
    player::Player,
    random::RandomSource,
};

/// Tunable constants of a playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Player speed in tiles per tick.
    pub player_speed: f32,
    /// Enemy speed in tiles per tick.
    pub enemy_speed: f32,
    pub starting_lives: u32,
    pub pickup_score: u32,
    pub power_pickup_score: u32,
    pub enemy_score: u32,
    /// Length of the vulnerability window started by a power pickup.
    pub vulnerable_ticks: u32,
    /// Entities closer than this many tiles collide.
    pub collision_radius: f32,
    /// Forward bias added to the player's position when sampling for pickups.
    pub pickup_bias: f32,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            player_speed: 0.15,
            enemy_speed: 0.08,
            starting_lives: 3,
            pickup_score: 10,
            power_pickup_score: 50,
            enemy_score: 200,
            vulnerable_ticks: 300,
            collision_radius: 0.5,
            pickup_bias: 0.2,
        }
    }
}

/// Whether a playthrough is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Playing)
    }
}

/// Discrete input delivered by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    SetDirection(Direction),
    /// Starts a new playthrough; only honored once the game is over.
    Restart,
    Quit,
}

/// Something noteworthy that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PickupEaten,
    PowerPickupEaten,
    /// The enemy at this index was eaten and sent home.
    EnemyEaten(usize),
    /// The enemy at this index caught the player.
    LifeLost(usize),
    Won,
    Lost,
}

/// Outcome of one call to [`Simulation::tick`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
}

impl TickReport {
    pub fn contains(&self, event: GameEvent) -> bool {
        self.events.contains(&event)
    }
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone, Copy)]
pub struct SimulationView<'a> {
    pub maze: &'a Maze,
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub score: u32,
    pub lives: u32,
    pub status: GameStatus,
    pub tick: u64,
}

/// Whether two entities touch.
#[inline]
pub fn collides(a: Position, b: Position, radius: f32) -> bool {
    a.distance(b) < radius
}

/// Owns all mutable game state and advances it one tick at a time.
pub struct Simulation<R> {
    level: Level,
    rules: Rules,
    rng: R,
    maze: Maze,
    player: Player,
    enemies: Vec<Enemy>,
    score: u32,
    lives: u32,
    status: GameStatus,
    tick: u64,
}

impl<R: RandomSource> Simulation<R> {
    /// Starts the first playthrough of `level`.
    pub fn new(level: Level, rules: Rules, rng: R) -> Self {
        let mut simulation = Simulation {
            maze: level.maze().clone(),
            player: Player::new(level.spawns().player, rules.player_speed),
            enemies: Vec::new(),
            level,
            rules,
            rng,
            score: 0,
            lives: 0,
            status: GameStatus::Playing,
            tick: 0,
        };
        simulation.reset();
        simulation
    }

    /// Throws away the current playthrough and starts a fresh one.
    pub fn reset(&mut self) {
        let spawns = self.level.spawns();
        self.maze = self.level.maze().clone();
        self.player = Player::new(spawns.player, self.rules.player_speed);
        self.enemies = spawns
            .enemies
            .iter()
            .map(|spawn| {
                let direction = self.rng.choose(&Direction::ALL).unwrap_or(Direction::Up);
                Enemy::new(
                    spawn.position,
                    direction,
                    spawn.personality,
                    self.rules.enemy_speed,
                )
            })
            .collect();
        self.score = 0;
        self.lives = self.rules.starting_lives;
        self.status = GameStatus::Playing;
        self.tick = 0;
        info!(
            pickups = self.maze.remaining_pickups(),
            enemies = self.enemies.len(),
            "new game"
        );
    }

    /// Applies one input command. Commands the core does not own are ignored.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetDirection(direction) => self.player.desired = direction,
            Command::Restart if self.status.is_terminal() => self.reset(),
            // Restarting mid-game is not allowed; quitting is the front-end's job.
            Command::Restart | Command::Quit => {}
        }
    }

    /// Advances the game by one tick. Does nothing once the game is over.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.status.is_terminal() {
            return report;
        }
        self.tick += 1;

        self.player.update(&self.maze);
        self.eat_pickup(&mut report);

        if self.maze.remaining_pickups() == 0 {
            self.status = GameStatus::Won;
            report.events.push(GameEvent::Won);
            info!(score = self.score, tick = self.tick, "maze cleared");
            return report;
        }

        for index in 0..self.enemies.len() {
            let target = self.player.position;
            let enemy = &mut self.enemies[index];
            enemy.update(&self.maze, target, &mut self.rng);

            if !collides(enemy.position, target, self.rules.collision_radius) {
                continue;
            }
            if enemy.is_vulnerable() {
                enemy.send_home(self.level.spawns().enemy_home);
                self.score = self.score.saturating_add(self.rules.enemy_score);
                report.events.push(GameEvent::EnemyEaten(index));
                debug!(enemy = index, score = self.score, "enemy eaten");
                continue;
            }

            self.lives = self.lives.saturating_sub(1);
            report.events.push(GameEvent::LifeLost(index));
            if self.lives == 0 {
                self.status = GameStatus::Lost;
                report.events.push(GameEvent::Lost);
                info!(score = self.score, tick = self.tick, "game over");
                break;
            }
            info!(enemy = index, lives = self.lives, "life lost");
            self.respawn_all();
        }

        report
    }

    fn eat_pickup(&mut self, report: &mut TickReport) {
        let bias = self.rules.pickup_bias;
        let probe = Position::new(self.player.position.x + bias, self.player.position.y + bias);
        let (col, row) = probe.cell();
        match self.maze.consume(col, row) {
            Some(PickupKind::Pickup) => {
                self.score = self.score.saturating_add(self.rules.pickup_score);
                report.events.push(GameEvent::PickupEaten);
            }
            Some(PickupKind::PowerPickup) => {
                self.score = self.score.saturating_add(self.rules.power_pickup_score);
                for enemy in &mut self.enemies {
                    enemy.frighten(self.rules.vulnerable_ticks);
                }
                report.events.push(GameEvent::PowerPickupEaten);
                debug!(col, row, "power pickup eaten");
            }
            None => {}
        }
    }

    /// Puts the player and every enemy back on their spawn points.
    ///
    /// Directions and vulnerability carry over.
    fn respawn_all(&mut self) {
        let spawns = self.level.spawns();
        self.player.respawn(spawns.player);
        for (enemy, spawn) in self.enemies.iter_mut().zip(&spawns.enemies) {
            enemy.position = spawn.position;
        }
    }

    /// Borrows everything a renderer needs for one frame.
    pub fn view(&self) -> SimulationView<'_> {
        SimulationView {
            maze: &self.maze,
            player: &self.player,
            enemies: &self.enemies,
            score: self.score,
            lives: self.lives,
            status: self.status,
            tick: self.tick,
        }
    }

    /// Returns whether the game is running, won or lost.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the points scored this playthrough.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Returns the lives the player has left.
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Returns the maze with the pickups eaten so far removed.
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// Returns the player.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Returns the enemies in update order.
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        enemy::Personality,
        level::{EnemySpawn, Spawns},
        random::SequenceRandom,
    };

    fn level(layout: &str, player: Position, enemies: &[Position]) -> Level {
        let spawns = Spawns {
            player,
            enemies: enemies
                .iter()
                .map(|&position| EnemySpawn {
                    position,
                    personality: Personality::Aggressive,
                })
                .collect(),
            enemy_home: Position::new(3.0, 1.0),
        };
        Level::new(Maze::parse(layout).unwrap(), spawns).unwrap()
    }

    #[test]
    fn collision_threshold_is_exclusive() {
        let origin = Position::new(0.0, 0.0);
        assert!(collides(origin, Position::new(0.4999, 0.0), 0.5));
        assert!(!collides(origin, Position::new(0.5, 0.0), 0.5));
        assert!(!collides(origin, Position::new(0.0, 0.5001), 0.5));
    }

    #[test]
    fn restart_is_ignored_while_playing() {
        let mut sim = Simulation::new(
            level("######\n#... #\n######", Position::new(1.0, 1.0), &[]),
            Rules::default(),
            SequenceRandom::new([1]),
        );
        sim.tick();
        let score = sim.score();
        assert!(score > 0);
        sim.apply(Command::Restart);
        assert_eq!(sim.score(), score);
        sim.apply(Command::Quit);
        assert_eq!(sim.status(), GameStatus::Playing);
    }

    #[test]
    fn life_loss_respawns_everyone_but_keeps_vulnerability() {
        // The stray pickup in the sealed pocket keeps the game from being won.
        let layout = "#######\n#   #.#\n#######";
        let mut sim = Simulation::new(
            level(layout, Position::new(1.0, 1.0), &[Position::new(2.5, 1.0)]),
            Rules::default(),
            SequenceRandom::new([1]),
        );
        // The countdown runs out during this tick, right before the touch.
        sim.enemies[0].frighten(1);
        sim.enemies[0].position = Position::new(1.2, 1.0);
        let report = sim.tick();
        assert_eq!(report.events, vec![GameEvent::LifeLost(0)]);
        assert_eq!(sim.lives(), 2);
        assert_eq!(sim.player().position, Position::new(1.0, 1.0));
        assert_eq!(sim.enemies()[0].position, Position::new(2.5, 1.0));

        sim.enemies[0].frighten(50);
        sim.enemies[0].position = Position::new(3.0, 1.0);
        sim.respawn_all();
        assert_eq!(sim.enemies()[0].position, Position::new(2.5, 1.0));
        assert!(sim.enemies()[0].is_vulnerable());
    }

    #[test]
    fn score_saturates_instead_of_overflowing() {
        let rules = Rules {
            pickup_score: u32::MAX,
            ..Rules::default()
        };
        let mut sim = Simulation::new(
            level("######\n#... #\n######", Position::new(1.0, 1.0), &[]),
            rules,
            SequenceRandom::new([1]),
        );
        sim.score = 5;
        let report = sim.tick();
        assert!(report.contains(GameEvent::PickupEaten));
        assert_eq!(sim.score(), u32::MAX);
        assert_eq!(sim.status(), GameStatus::Playing);
    }

    #[test]
    fn terminal_state_freezes_the_tick_counter() {
        let mut sim = Simulation::new(
            level("#####\n#.  #\n#####", Position::new(1.0, 1.0), &[]),
            Rules::default(),
            SequenceRandom::new([1]),
        );
        let report = sim.tick();
        assert!(report.contains(GameEvent::Won));
        assert_eq!(sim.view().tick, 1);
        assert!(sim.tick().events.is_empty());
        assert_eq!(sim.view().tick, 1);
    }
}
