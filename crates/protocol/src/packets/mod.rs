//! Packet definitions for the catch-squares protocol.
//!
//! Every packet travels as a single JSON text frame. Clients only send
//! control packets; the server only sends full state snapshots.

mod client;
mod server;

pub use client::*;
pub use server::*;

/// `type` value of a paddle control packet.
pub const CONTROL_TYPE: &str = "control";
