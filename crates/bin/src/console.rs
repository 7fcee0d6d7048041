//! Operator console on stdin.
//!
//! Stands in for a keyboard when the server runs headless: `left`/`right`
//! hold a direction until `stop`, `restart` starts a new game once the
//! current one is over.

use protocol::Direction;
use server::{LocalControls, StateReader};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Hold(Direction),
    Stop,
    Restart,
    Status,
    Quit,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "left" | "a" => Some(Self::Hold(Direction::Left)),
            "right" | "d" => Some(Self::Hold(Direction::Right)),
            "stop" | "s" => Some(Self::Stop),
            "restart" | "r" => Some(Self::Restart),
            "status" => Some(Self::Status),
            "quit" | "exit" | "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Read commands until `quit`. End of input leaves the server running.
pub async fn run(controls: LocalControls, state: StateReader) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = ConsoleCommand::parse(&line) else {
            warn!("Unknown command {:?} (left, right, stop, restart, status, quit)", line.trim());
            continue;
        };

        match command {
            ConsoleCommand::Hold(direction) => {
                controls.set_held(Direction::Left, direction == Direction::Left);
                controls.set_held(Direction::Right, direction == Direction::Right);
            }
            ConsoleCommand::Stop => {
                controls.set_held(Direction::Left, false);
                controls.set_held(Direction::Right, false);
            }
            ConsoleCommand::Restart => {
                if state.read().game_over {
                    controls.request_restart();
                } else {
                    info!("Game still running, restart ignored");
                }
            }
            ConsoleCommand::Status => {
                let snapshot = state.read();
                info!(
                    "Score: {} | Lives: {} | Paddle: {} | Squares: {}{}",
                    snapshot.score,
                    snapshot.lives,
                    snapshot.paddle_x,
                    snapshot.squares.len(),
                    if snapshot.game_over { " | GAME OVER" } else { "" }
                );
            }
            ConsoleCommand::Quit => return Ok(()),
        }
    }

    info!("Console input closed, running headless");
    std::future::pending::<()>().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleCommand::parse("left"), Some(ConsoleCommand::Hold(Direction::Left)));
        assert_eq!(ConsoleCommand::parse(" D \n"), Some(ConsoleCommand::Hold(Direction::Right)));
        assert_eq!(ConsoleCommand::parse("RESTART"), Some(ConsoleCommand::Restart));
        assert_eq!(ConsoleCommand::parse("exit"), Some(ConsoleCommand::Quit));
        assert_eq!(ConsoleCommand::parse("jump"), None);
    }
}
