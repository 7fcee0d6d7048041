//! Simulation engine and main loop.

use crate::command::CommandQueue;
use crate::config::Config;
use crate::entity::SquareId;
use crate::input::{InputSource, LocalInput};
use crate::state::{GameState, SquareState, StateStore};
use crate::world::World;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Remote commands applied.
    pub commands: usize,
    pub caught: u32,
    pub missed: u32,
    /// Set on the tick that ended the game.
    pub game_ended: bool,
}

/// Authoritative simulation. Sole writer of the state store.
pub struct GameEngine {
    config: Config,
    world: World,
    score: u32,
    lives: i32,
    game_over: bool,
    tick_count: u64,
    queue: CommandQueue,
    store: StateStore,
}

impl GameEngine {
    /// Create an engine with a randomly seeded world and publish the initial state.
    pub fn new(config: &Config, queue: CommandQueue, store: StateStore) -> Self {
        Self::with_world(config, World::new(config), queue, store)
    }

    pub fn with_world(
        config: &Config,
        world: World,
        queue: CommandQueue,
        store: StateStore,
    ) -> Self {
        let engine = Self {
            config: config.clone(),
            world,
            score: 0,
            lives: config.game.initial_lives,
            game_over: false,
            tick_count: 0,
            queue,
            store,
        };
        engine.publish();
        engine
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Remote commands waiting for the next tick.
    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for scripted setups.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Advance the game by one tick and publish the result.
    ///
    /// While the game is over nothing moves; only `input.restart` is honoured.
    pub fn tick(&mut self, input: LocalInput) -> TickOutcome {
        self.tick_count += 1;

        if self.game_over {
            if input.restart {
                self.reset();
            }
            return TickOutcome::default();
        }

        let mut outcome = TickOutcome::default();

        // Local keys first, then remote commands in arrival order.
        for direction in input.held() {
            self.world.paddle.nudge(direction);
        }
        let commands = self.queue.drain_all();
        outcome.commands = commands.len();
        for command in commands {
            self.world.paddle.nudge(command.direction);
        }
        self.world.paddle.clamp();

        self.world.advance_squares();

        // Catches run first so a caught square can never also count as a miss.
        outcome.caught = self.world.remove_caught();
        self.score += outcome.caught;

        outcome.missed = self.world.remove_missed();
        self.lives -= outcome.missed as i32;

        if outcome.caught > 0 || outcome.missed > 0 {
            debug!(
                "Tick #{}: caught {}, missed {} (score {}, lives {})",
                self.tick_count, outcome.caught, outcome.missed, self.score, self.lives
            );
        }

        if self.lives <= 0 {
            self.game_over = true;
            outcome.game_ended = true;
            info!("Game over with score {}", self.score);
        }

        self.publish();
        outcome
    }

    /// Spawn one square unless the game is over. Visible to readers after the next tick.
    pub fn spawn_square(&mut self) -> Option<SquareId> {
        if self.game_over {
            return None;
        }
        Some(self.world.spawn_square())
    }

    /// Start a new session: zero score, full lives, no squares, centered paddle.
    pub fn reset(&mut self) {
        let discarded = self.queue.clear();
        self.world.reset(&self.config);
        self.score = 0;
        self.lives = self.config.game.initial_lives;
        self.game_over = false;
        self.publish();
        info!("Game reset ({} queued commands discarded)", discarded);
    }

    /// Current state as a snapshot.
    pub fn snapshot(&self) -> GameState {
        GameState {
            paddle_x: self.world.paddle.x,
            squares: self.world.squares.iter().map(SquareState::from).collect(),
            score: self.score,
            lives: self.lives,
            game_over: self.game_over,
        }
    }

    fn publish(&self) {
        self.store.write(self.snapshot());
    }
}

/// Run the simulation until the task is dropped.
pub async fn run_game_loop(
    mut engine: GameEngine,
    mut input: Box<dyn InputSource>,
    tick_interval: Duration,
    spawn_interval: Duration,
) {
    let mut ticker = interval_at(Instant::now() + tick_interval, tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut spawner = interval_at(Instant::now() + spawn_interval, spawn_interval);
    spawner.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let tick_budget = tick_interval.as_secs_f64() * 1000.0 * 0.9;
    info!(
        "Simulation running at {:.1} ticks/s",
        1.0 / tick_interval.as_secs_f64()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let tick_start = std::time::Instant::now();
                engine.tick(input.poll());
                let tick_ms = tick_start.elapsed().as_secs_f64() * 1000.0;

                if tick_ms > tick_budget {
                    warn!(
                        "Slow tick #{}: {:.3}ms (budget: {:.1}ms) - {} squares",
                        engine.tick_count(),
                        tick_ms,
                        tick_budget,
                        engine.world().square_count()
                    );
                }

                if engine.tick_count() % 600 == 0 {
                    debug!(
                        "Tick #{}: {} squares, {} queued commands",
                        engine.tick_count(),
                        engine.world().square_count(),
                        engine.pending_commands()
                    );
                }
            }
            _ = spawner.tick() => {
                engine.spawn_square();
            }
        }
    }
}
