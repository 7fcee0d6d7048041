//! Server -> Client packets.

use crate::ProtocolError;
use serde::{Deserialize, Serialize};

/// One falling square as seen by viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquareUpdate {
    pub x: i32,
    pub y: i32,
    pub id: String,
}

/// Full state snapshot broadcast on every egress cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub paddle_x: i32,
    /// Live squares in spawn order.
    pub squares: Vec<SquareUpdate>,
    pub score: u32,
    pub lives: i32,
    pub game_over: bool,
}

impl StateUpdate {
    /// Serialize into the JSON text sent to clients.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a snapshot received from the server.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}
