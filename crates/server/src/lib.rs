//! Catch Squares game server library.
//!
//! A fixed-rate simulation of a paddle catching falling squares, shared with
//! any number of WebSocket viewers that can also steer the paddle.

pub mod collision;
pub mod command;
pub mod config;
pub mod entity;
pub mod input;
pub mod server;
pub mod state;
pub mod world;

// Re-export commonly used types
pub use command::{command_queue, Command, CommandQueue, CommandSender};
pub use config::Config;
pub use input::{local_controls, ControlInput, Headless, InputSource, LocalControls, LocalInput};
pub use server::{run, BroadcastServer, ClientRegistry, GameEngine};
pub use state::{GameState, StateReader, StateStore};
