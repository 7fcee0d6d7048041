//! Canonical game state and its store.
//!
//! The store holds an immutable snapshot behind an `Arc` and swaps it whole on
//! every publish, so a reader either sees the previous snapshot or the next one
//! and never a mix of both. Readers never hold anything the writer waits on
//! for longer than an `Arc` clone.

use crate::config::Config;
use crate::entity::Square;
use protocol::{SquareUpdate, StateUpdate};
use std::sync::Arc;
use tokio::sync::watch;

/// A live square as published to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareState {
    pub id: String,
    pub x: i32,
    pub y: i32,
}

impl From<&Square> for SquareState {
    fn from(square: &Square) -> Self {
        Self {
            id: square.id.to_string(),
            x: square.x,
            y: square.y,
        }
    }
}

/// Point-in-time copy of the whole game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub paddle_x: i32,
    /// Live squares in spawn order.
    pub squares: Vec<SquareState>,
    pub score: u32,
    pub lives: i32,
    pub game_over: bool,
}

impl GameState {
    /// State of a fresh session: centered paddle, no squares, full lives.
    pub fn initial(config: &Config) -> Self {
        Self {
            paddle_x: config.arena.width / 2 - config.paddle.width / 2,
            squares: Vec::new(),
            score: 0,
            lives: config.game.initial_lives,
            game_over: false,
        }
    }

    /// Convert into the wire snapshot.
    pub fn to_packet(&self) -> StateUpdate {
        StateUpdate {
            paddle_x: self.paddle_x,
            squares: self
                .squares
                .iter()
                .map(|square| SquareUpdate {
                    x: square.x,
                    y: square.y,
                    id: square.id.clone(),
                })
                .collect(),
            score: self.score,
            lives: self.lives,
            game_over: self.game_over,
        }
    }
}

/// Writer side of the store. Owned by the simulation engine.
#[derive(Debug)]
pub struct StateStore {
    tx: watch::Sender<Arc<GameState>>,
}

impl StateStore {
    pub fn new(initial: GameState) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    /// Replace the canonical state.
    pub fn write(&self, state: GameState) {
        self.tx.send_replace(Arc::new(state));
    }

    /// Current snapshot, as any reader would see it.
    pub fn read(&self) -> Arc<GameState> {
        Arc::clone(&self.tx.borrow())
    }

    /// Create a read handle for another component.
    pub fn reader(&self) -> StateReader {
        StateReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read side of the store. Cheap to clone; hand one to every consumer.
#[derive(Debug, Clone)]
pub struct StateReader {
    rx: watch::Receiver<Arc<GameState>>,
}

impl StateReader {
    /// Current snapshot.
    pub fn read(&self) -> Arc<GameState> {
        Arc::clone(&self.rx.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = GameState::initial(&Config::default());
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert!(state.squares.is_empty());
        assert!(!state.game_over);
        assert_eq!(state.paddle_x, 350);
    }

    #[test]
    fn test_reader_sees_latest_write() {
        let config = Config::default();
        let store = StateStore::new(GameState::initial(&config));
        let reader = store.reader();

        let mut next = GameState::initial(&config);
        next.score = 4;
        store.write(next.clone());

        assert_eq!(*reader.read(), next);
        assert_eq!(*store.read(), next);
    }

    #[test]
    fn test_old_snapshot_is_unchanged_by_later_writes() {
        let config = Config::default();
        let store = StateStore::new(GameState::initial(&config));
        let reader = store.reader();

        let before = reader.read();
        let mut next = GameState::initial(&config);
        next.lives = 1;
        store.write(next);

        assert_eq!(before.lives, 3);
        assert_eq!(reader.read().lives, 1);
    }

    #[test]
    fn test_concurrent_reads_never_tear() {
        let config = Config::default();
        let store = StateStore::new(GameState::initial(&config));

        // Every written state keeps score, lives and square count in lockstep.
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let reader = store.reader();
                std::thread::spawn(move || {
                    for _ in 0..5_000 {
                        let state = reader.read();
                        assert_eq!(state.score as usize, state.squares.len());
                        assert_eq!(state.lives, 3 + state.score as i32);
                    }
                })
            })
            .collect();

        for n in 0..5_000u32 {
            let mut state = GameState::initial(&config);
            state.score = n % 50;
            state.lives = 3 + state.score as i32;
            state.squares = (0..state.score)
                .map(|i| SquareState {
                    id: format!("sq_{i}"),
                    x: 0,
                    y: 0,
                })
                .collect();
            store.write(state);
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn test_packet_conversion() {
        let mut state = GameState::initial(&Config::default());
        state.squares.push(SquareState {
            id: "sq_9".to_string(),
            x: 5,
            y: -20,
        });

        let packet = state.to_packet();
        assert_eq!(packet.paddle_x, 350);
        assert_eq!(packet.squares[0].id, "sq_9");
        assert_eq!(packet.squares[0].y, -20);
    }
}
