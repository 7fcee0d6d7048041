//! Falling square.

use crate::collision::Rect;
use std::fmt;

/// Session-scoped square identifier, rendered as `sq_<n>` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SquareId(pub u64);

impl fmt::Display for SquareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sq_{}", self.0)
    }
}

/// A square falling at constant speed. `x` is fixed at spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Square {
    pub id: SquareId,
    pub x: i32,
    pub y: i32,
    pub size: i32,
    pub fall_speed: i32,
}

impl Square {
    pub fn new(id: SquareId, x: i32, y: i32, size: i32, fall_speed: i32) -> Self {
        Self {
            id,
            x,
            y,
            size,
            fall_speed,
        }
    }

    /// Advance one tick.
    pub fn fall(&mut self) {
        self.y += self.fall_speed;
    }

    /// True once the top edge is strictly below the arena bottom.
    pub fn is_past(&self, arena_height: i32) -> bool {
        self.y > arena_height
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}
