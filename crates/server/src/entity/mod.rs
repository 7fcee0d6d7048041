//! Game entities.
//!
//! - `Paddle`: player-controlled catcher at the bottom of the arena.
//! - `Square`: falling object to be caught.

mod paddle;
mod square;

pub use paddle::Paddle;
pub use square::{Square, SquareId};
