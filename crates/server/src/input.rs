//! Local control surface.
//!
//! The simulation polls an `InputSource` once per tick. A presentation layer
//! (window, terminal, test harness) feeds it through `LocalControls`.

use protocol::Direction;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// One tick worth of local input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalInput {
    /// Left key held.
    pub left: bool,
    /// Right key held.
    pub right: bool,
    /// Restart requested since the last poll.
    pub restart: bool,
}

impl LocalInput {
    /// Directions held this tick, left first.
    pub fn held(&self) -> impl Iterator<Item = Direction> {
        [(self.left, Direction::Left), (self.right, Direction::Right)]
            .into_iter()
            .filter_map(|(held, direction)| held.then_some(direction))
    }
}

/// Something the simulation can poll for local input.
pub trait InputSource: Send {
    fn poll(&mut self) -> LocalInput;
}

/// No local player attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl InputSource for Headless {
    fn poll(&mut self) -> LocalInput {
        LocalInput::default()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Held {
    left: bool,
    right: bool,
}

/// Create a linked pair: a control handle for the presentation side and the
/// input source the simulation polls.
pub fn local_controls() -> (LocalControls, ControlInput) {
    let (held_tx, held_rx) = watch::channel(Held::default());
    let restart = Arc::new(AtomicBool::new(false));
    (
        LocalControls {
            held: Arc::new(held_tx),
            restart: Arc::clone(&restart),
        },
        ControlInput { held: held_rx, restart },
    )
}

/// Presentation-side handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LocalControls {
    held: Arc<watch::Sender<Held>>,
    restart: Arc<AtomicBool>,
}

impl LocalControls {
    /// Press or release a direction key.
    pub fn set_held(&self, direction: Direction, pressed: bool) {
        self.held.send_modify(|held| match direction {
            Direction::Left => held.left = pressed,
            Direction::Right => held.right = pressed,
        });
    }

    /// Latch a restart request. Consumed by the next poll.
    pub fn request_restart(&self) {
        self.restart.store(true, Ordering::Release);
    }
}

/// Simulation-side input source fed by `LocalControls`.
#[derive(Debug)]
pub struct ControlInput {
    held: watch::Receiver<Held>,
    restart: Arc<AtomicBool>,
}

impl InputSource for ControlInput {
    fn poll(&mut self) -> LocalInput {
        let held = *self.held.borrow();
        LocalInput {
            left: held.left,
            right: held.right,
            restart: self.restart.swap(false, Ordering::AcqRel),
        }
    }
}
