//! World state management.
//!
//! Owns the paddle and the live squares, spawns new squares and resolves
//! catches and misses. Scoring is left to the engine.

use crate::config::Config;
use crate::entity::{Paddle, Square, SquareId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The playfield: one paddle and the squares currently falling.
#[derive(Debug)]
pub struct World {
    pub paddle: Paddle,
    /// Live squares in spawn order.
    pub squares: Vec<Square>,
    /// Last identifier handed out. Survives resets.
    last_square_id: u64,
    arena_width: i32,
    arena_height: i32,
    square_size: i32,
    fall_speed: i32,
    spawn_min_y: i32,
    rng: StdRng,
}

impl World {
    pub fn new(config: &Config) -> Self {
        Self::with_rng(config, StdRng::from_rng(&mut rand::rng()))
    }

    /// Deterministic spawns, for tests and replays.
    pub fn with_seed(config: &Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &Config, rng: StdRng) -> Self {
        Self {
            paddle: Paddle::new(config),
            squares: Vec::new(),
            last_square_id: 0,
            arena_width: config.arena.width,
            arena_height: config.arena.height,
            square_size: config.square.size,
            fall_speed: config.square.fall_speed,
            spawn_min_y: config.square.spawn_min_y,
            rng,
        }
    }

    fn next_id(&mut self) -> SquareId {
        self.last_square_id += 1;
        SquareId(self.last_square_id)
    }

    /// Spawn one square above the arena at a random column.
    pub fn spawn_square(&mut self) -> SquareId {
        let max_x = (self.arena_width - self.square_size).max(1);
        let max_y = (-self.square_size).max(self.spawn_min_y + 1);
        let x = self.rng.random_range(0..max_x);
        let y = self.rng.random_range(self.spawn_min_y..max_y);
        self.insert_square(x, y)
    }

    /// Place a square at a fixed position.
    pub fn insert_square(&mut self, x: i32, y: i32) -> SquareId {
        let id = self.next_id();
        self.squares
            .push(Square::new(id, x, y, self.square_size, self.fall_speed));
        id
    }

    /// Move every live square down by its fall speed.
    pub fn advance_squares(&mut self) {
        for square in &mut self.squares {
            square.fall();
        }
    }

    /// Remove every square overlapping the paddle. Returns how many were caught.
    pub fn remove_caught(&mut self) -> u32 {
        let paddle = self.paddle.rect();
        let before = self.squares.len();
        self.squares.retain(|square| !square.rect().intersects(&paddle));
        (before - self.squares.len()) as u32
    }

    /// Remove every square whose top edge passed the arena bottom. Returns how many were missed.
    pub fn remove_missed(&mut self) -> u32 {
        let height = self.arena_height;
        let before = self.squares.len();
        self.squares.retain(|square| !square.is_past(height));
        (before - self.squares.len()) as u32
    }

    /// Clear all squares and put a fresh, centered paddle in place.
    pub fn reset(&mut self, config: &Config) {
        self.squares.clear();
        self.paddle = Paddle::new(config);
    }

    pub fn square_count(&self) -> usize {
        self.squares.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_positions_and_ids() {
        let config = Config::default();
        let mut world = World::with_seed(&config, 7);

        for expected in 1..=200 {
            let id = world.spawn_square();
            assert_eq!(id, SquareId(expected));
        }

        for square in &world.squares {
            assert!((0..770).contains(&square.x), "x out of range: {}", square.x);
            assert!((-100..-30).contains(&square.y), "y out of range: {}", square.y);
        }
    }

    #[test]
    fn test_ids_survive_reset() {
        let config = Config::default();
        let mut world = World::with_seed(&config, 1);
        world.spawn_square();
        world.spawn_square();
        world.paddle.x = 0;

        world.reset(&config);
        assert_eq!(world.square_count(), 0);
        assert_eq!(world.paddle.x, 350);
        assert_eq!(world.spawn_square(), SquareId(3));
    }

    #[test]
    fn test_catch_all_overlapping() {
        let config = Config::default();
        let mut world = World::with_seed(&config, 1);
        // Paddle spans x 350..450, y 570..590.
        world.insert_square(340, 560);
        world.insert_square(420, 575);
        world.insert_square(10, 575);

        assert_eq!(world.remove_caught(), 2);
        assert_eq!(world.square_count(), 1);
        assert_eq!(world.squares[0].x, 10);
    }

    #[test]
    fn test_miss_after_bottom() {
        let config = Config::default();
        let mut world = World::with_seed(&config, 1);
        world.insert_square(10, 598);
        world.insert_square(10, 500);

        world.advance_squares();
        assert_eq!(world.remove_missed(), 1);
        assert_eq!(world.squares[0].y, 503);
    }
}
