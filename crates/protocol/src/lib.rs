//! Shared protocol crate for catch-squares.
//!
//! This crate contains:
//! - Packet definitions for both directions (JSON text frames)
//! - The `Direction` token carried by control messages
//! - Protocol error types

mod error;
pub mod packets;

pub use error::ProtocolError;
pub use packets::{ClientPacket, SquareUpdate, StateUpdate};

use serde::{Deserialize, Serialize};

/// Horizontal direction token for paddle control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Wire name of the direction.
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Sign of the horizontal displacement (-1 for left, +1 for right).
    pub const fn sign(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(ProtocolError::InvalidDirection(other.to_string())),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
