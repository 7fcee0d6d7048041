//! Player paddle.

use crate::collision::Rect;
use crate::config::Config;
use protocol::Direction;

/// Player-controlled paddle. Only the horizontal position changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paddle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub speed: i32,
    /// Right bound of the arena.
    arena_width: i32,
}

impl Paddle {
    /// Create a paddle centered horizontally near the arena bottom.
    pub fn new(config: &Config) -> Self {
        let paddle = &config.paddle;
        let arena = &config.arena;
        Self {
            x: arena.width / 2 - paddle.width / 2,
            y: arena.height - paddle.bottom_margin - paddle.height,
            width: paddle.width,
            height: paddle.height,
            speed: paddle.speed,
            arena_width: arena.width,
        }
    }

    /// Displace by one step in `direction`. Call `clamp` once all moves of a tick are applied.
    pub fn nudge(&mut self, direction: Direction) {
        self.x += direction.sign() * self.speed;
    }

    /// Keep the paddle within `[0, arena_width - width]`.
    pub fn clamp(&mut self) {
        let max_x = (self.arena_width - self.width).max(0);
        self.x = self.x.clamp(0, max_x);
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}
