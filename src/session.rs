//! The game session: one object owning the grid, the player, the enemies,
//! and the clocks, driven by a single tick path.
//!
//! Terminal transitions are evaluated once per tick in a fixed order: exit
//! reached, enemy collision, timeout, then timer and power-up bookkeeping.
//! The puzzle prompt is an explicit suspend point (`Phase::AwaitingAnswer`):
//! both stopwatches stand still until the answer arrives, so the rendering
//! collaborator can keep polling without the clock running down.

use log::{debug, info};
use rand::Rng;
use std::time::{Duration, Instant};

use crate::enemy::Enemy;
use crate::error::GameResult;
use crate::grid::{Dir, Grid, Pos, Tile};
use crate::maze;
use crate::placement;
use crate::puzzle::{Question, ATTEMPTS};
use crate::save::SaveData;

/// Knobs that varied across revisions of the game, collapsed into one
/// configurable core.
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub obstacle_count: usize,
    pub power_ups: bool,
    /// Early revision only: the freeze power-up effect is in the draw.
    pub freeze_effect: bool,
    /// Per-axis spawn exclusion threshold around the player.
    pub min_spawn_distance: usize,
    pub base_time_limit: Duration,
    /// Subtracted from the limit per completed level; zero resets instead.
    pub time_shrink_per_level: Duration,
    /// Added to both dimensions per completed level; must be even. Zero
    /// keeps the maze size fixed.
    pub growth_per_level: usize,
    /// Enemy count equals the level number when set, else one enemy.
    pub enemies_scale_with_level: bool,
    pub enemy_move_interval: Duration,
    pub extra_time: Duration,
    pub freeze_duration: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 21,
            height: 21,
            obstacle_count: 2,
            power_ups: true,
            freeze_effect: false,
            min_spawn_distance: 5,
            base_time_limit: Duration::from_secs(120),
            time_shrink_per_level: Duration::ZERO,
            growth_per_level: 0,
            enemies_scale_with_level: true,
            enemy_move_interval: Duration::from_millis(500),
            extra_time: Duration::from_secs(30),
            freeze_duration: Duration::from_secs(10),
        }
    }
}

impl GameConfig {
    /// Reject configurations the carving scheme cannot honor, before any
    /// play begins.
    pub fn validate(&self) -> GameResult<()> {
        maze::check_dimensions(self.width, self.height)?;
        if self.growth_per_level % 2 != 0 {
            return Err(crate::error::GameError::OddGrowth {
                growth: self.growth_per_level,
            });
        }
        Ok(())
    }

    fn dims_for_level(&self, level: u32) -> (usize, usize) {
        let grow = self.growth_per_level * (level as usize - 1);
        (self.width + grow, self.height + grow)
    }

    fn time_limit_for_level(&self, level: u32) -> Duration {
        // The floor guards the shrink path only; a base limit below it is
        // honored as configured.
        let shrink = self.time_shrink_per_level * (level - 1);
        let floor = self.base_time_limit.min(Duration::from_secs(30));
        self.base_time_limit.saturating_sub(shrink).max(floor)
    }

    fn enemy_count_for_level(&self, level: u32) -> usize {
        if self.enemies_scale_with_level {
            level as usize
        } else {
            1
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LossReason {
    Caught,
    TimedOut,
    PuzzleExhausted,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    AwaitingAnswer,
    LevelComplete,
    Lost(LossReason),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PowerUpEffect {
    ExtraTime,
    Teleport,
    Freeze,
}

/// An obstacle interaction in progress.
struct Pending {
    pos: Pos,
    question: Question,
    attempts_left: u32,
}

pub struct Session {
    config: GameConfig,
    grid: Grid,
    player: Pos,
    enemies: Vec<Enemy>,
    obstacles: Vec<Pos>,
    power_up: Option<Pos>,
    pending: Option<Pending>,
    phase: Phase,
    level: u32,
    time_limit: Duration,
    level_started: Instant,
    enemy_moved: Instant,
    paused_at: Option<Instant>,
    frozen_until: Option<Instant>,
    last_effect: Option<PowerUpEffect>,
}

impl Session {
    pub fn new(config: GameConfig, now: Instant, rng: &mut impl Rng) -> GameResult<Self> {
        config.validate()?;
        let mut session = Session {
            grid: Grid::new(config.width, config.height),
            config,
            player: maze::SEED,
            enemies: Vec::new(),
            obstacles: Vec::new(),
            power_up: None,
            pending: None,
            phase: Phase::Playing,
            level: 1,
            time_limit: Duration::ZERO,
            level_started: now,
            enemy_moved: now,
            paused_at: None,
            frozen_until: None,
            last_effect: None,
        };
        session.build_level(now, rng)?;
        Ok(session)
    }

    /// Regenerate the grid and entities for the current level and reset the
    /// clocks.
    fn build_level(&mut self, now: Instant, rng: &mut impl Rng) -> GameResult<()> {
        let (width, height) = self.config.dims_for_level(self.level);
        maze::check_dimensions(width, height)?;

        self.grid = Grid::new(width, height);
        maze::generate(&mut self.grid, rng);
        self.player = maze::SEED;

        let enemy_count = self.config.enemy_count_for_level(self.level);
        let power_up_count = usize::from(self.config.power_ups);
        placement::ensure_capacity(
            &self.grid,
            self.config.obstacle_count + power_up_count + enemy_count + 1,
        )?;

        self.obstacles =
            placement::place_obstacles(&mut self.grid, self.config.obstacle_count, self.player, rng)?;
        self.power_up = if self.config.power_ups {
            Some(placement::place_power_up(&self.grid, self.player, rng)?)
        } else {
            None
        };
        let occupied: Vec<Pos> = self.power_up.into_iter().collect();
        let spawns = placement::place_enemies(
            &self.grid,
            enemy_count,
            self.player,
            self.config.min_spawn_distance,
            &occupied,
            rng,
        )?;
        self.enemies = spawns.into_iter().map(Enemy::new).collect();

        self.pending = None;
        self.phase = Phase::Playing;
        self.time_limit = self.config.time_limit_for_level(self.level);
        self.level_started = now;
        self.enemy_moved = now;
        self.paused_at = None;
        self.frozen_until = None;
        info!(
            "level {}: {}x{}, {} enemies, {:?} on the clock",
            self.level,
            width,
            height,
            self.enemies.len(),
            self.time_limit
        );
        Ok(())
    }

    // Read-only snapshot for the rendering collaborator.

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Pos {
        self.player
    }

    pub fn enemy_positions(&self) -> impl Iterator<Item = Pos> + '_ {
        self.enemies.iter().map(|e| e.pos())
    }

    pub fn power_up(&self) -> Option<Pos> {
        self.power_up
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// The pending question and its remaining attempts, while awaiting an
    /// answer.
    pub fn question(&self) -> Option<(Question, u32)> {
        self.pending
            .as_ref()
            .map(|p| (p.question, p.attempts_left))
    }

    pub fn remaining_time(&self, now: Instant) -> Duration {
        let reference = self.paused_at.unwrap_or(now);
        self.time_limit
            .saturating_sub(reference.duration_since(self.level_started))
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        let reference = self.paused_at.unwrap_or(now);
        reference.duration_since(self.level_started)
    }

    /// The effect of the most recently collected power-up, consumed on read.
    pub fn take_power_up_effect(&mut self) -> Option<PowerUpEffect> {
        self.last_effect.take()
    }

    /// Apply a single-step move command. Moves into walls or still-blocking
    /// obstacles leave the player in place; stepping onto an obstacle opens
    /// the puzzle prompt instead.
    pub fn attempt_move(&mut self, dir: Dir, now: Instant, rng: &mut impl Rng) {
        if self.phase != Phase::Playing {
            return;
        }
        let Some(target) = self.grid.neighbor(self.player, dir) else {
            return;
        };

        if self.grid.tile(target) == Tile::Obstacle {
            self.pending = Some(Pending {
                pos: target,
                question: Question::random(rng),
                attempts_left: ATTEMPTS,
            });
            self.paused_at = Some(now);
            self.phase = Phase::AwaitingAnswer;
            return;
        }

        if self.grid.is_walkable(target) {
            self.player = target;
            if self.power_up == Some(target) {
                self.collect_power_up(now, rng);
            }
        }
    }

    /// Submit an answer to the pending puzzle. A correct answer clears the
    /// obstacle and completes the interrupted move; running out of attempts
    /// ends the session.
    pub fn answer(&mut self, value: i32, now: Instant) {
        if self.phase != Phase::AwaitingAnswer {
            return;
        }
        let Some(pending) = self.pending.as_mut() else {
            return;
        };

        if pending.question.check(value) {
            let pos = pending.pos;
            self.grid.set(pos, Tile::Open);
            self.obstacles.retain(|p| *p != pos);
            self.player = pos;
            self.pending = None;
            self.resume(now);
            self.phase = Phase::Playing;
            debug!("obstacle at ({}, {}) solved", pos.x, pos.y);
        } else {
            pending.attempts_left -= 1;
            if pending.attempts_left == 0 {
                self.pending = None;
                self.phase = Phase::Lost(LossReason::PuzzleExhausted);
                info!("out of puzzle attempts, session over");
            }
        }
    }

    /// Advance the clocks and evaluate terminal transitions. Call once per
    /// control-loop tick; does nothing outside `Playing`.
    pub fn tick(&mut self, now: Instant, rng: &mut impl Rng) {
        if self.phase != Phase::Playing {
            return;
        }

        if self.grid.tile(self.player) == Tile::Exit {
            self.phase = Phase::LevelComplete;
            info!("level {} complete", self.level);
            return;
        }
        if self.enemy_at(self.player) {
            self.phase = Phase::Lost(LossReason::Caught);
            info!("caught by an enemy");
            return;
        }
        if self.remaining_time(now).is_zero() {
            self.phase = Phase::Lost(LossReason::TimedOut);
            info!("time is up");
            return;
        }

        if let Some(until) = self.frozen_until {
            if now >= until {
                self.frozen_until = None;
            }
        }
        let frozen = self.frozen_until.is_some();
        if !frozen && now.duration_since(self.enemy_moved) >= self.config.enemy_move_interval {
            self.enemy_moved = now;
            for enemy in &mut self.enemies {
                enemy.step(&self.grid, rng);
            }
            if self.enemy_at(self.player) {
                self.phase = Phase::Lost(LossReason::Caught);
                info!("caught by an enemy");
            }
        }
    }

    /// Move on to the next level after `LevelComplete`.
    pub fn advance_level(&mut self, now: Instant, rng: &mut impl Rng) -> GameResult<()> {
        if self.phase != Phase::LevelComplete {
            return Ok(());
        }
        self.level += 1;
        self.build_level(now, rng)
    }

    pub fn save_state(&self) -> SaveData {
        SaveData {
            player: self.player,
            level: self.level,
        }
    }

    /// Restore a saved player position and level into the current maze.
    /// The position is not validated against the regenerated layout; a
    /// stale save can land the player off the carved paths.
    pub fn restore(&mut self, data: SaveData) {
        self.player = data.player;
        self.level = data.level;
    }

    fn enemy_at(&self, pos: Pos) -> bool {
        self.enemies.iter().any(|e| e.pos() == pos)
    }

    fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            let paused = now.duration_since(paused_at);
            self.level_started += paused;
            self.enemy_moved += paused;
            if let Some(until) = self.frozen_until {
                self.frozen_until = Some(until + paused);
            }
        }
    }

    fn collect_power_up(&mut self, now: Instant, rng: &mut impl Rng) {
        self.power_up = None;
        let effect = if self.config.freeze_effect {
            match rng.gen_range(0..3) {
                0 => PowerUpEffect::ExtraTime,
                1 => PowerUpEffect::Teleport,
                _ => PowerUpEffect::Freeze,
            }
        } else if rng.gen_range(0..2) == 0 {
            PowerUpEffect::ExtraTime
        } else {
            PowerUpEffect::Teleport
        };
        self.apply_power_up(effect, now, rng);
    }

    fn apply_power_up(&mut self, effect: PowerUpEffect, now: Instant, rng: &mut impl Rng) {
        match effect {
            PowerUpEffect::ExtraTime => {
                self.time_limit += self.config.extra_time;
            }
            PowerUpEffect::Teleport => {
                // Bounded rejection sampling; on exhaustion the player just
                // stays where the power-up was.
                let threshold = self.config.min_spawn_distance;
                for _ in 0..self.grid.width() * self.grid.height() * 20 {
                    let pos = Pos::new(
                        rng.gen_range(0..self.grid.width()),
                        rng.gen_range(0..self.grid.height()),
                    );
                    if self.grid.tile(pos) == Tile::Open
                        && !self
                            .enemies
                            .iter()
                            .any(|e| pos.within_square(e.pos(), threshold))
                    {
                        self.player = pos;
                        break;
                    }
                }
            }
            PowerUpEffect::Freeze => {
                self.frozen_until = Some(now + self.config.freeze_duration);
            }
        }
        debug!("power-up collected: {:?}", effect);
        self.last_effect = Some(effect);
    }
}
