//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub arena: ArenaConfig,
    #[serde(default)]
    pub paddle: PaddleConfig,
    #[serde(default)]
    pub square: SquareConfig,
    #[serde(default)]
    pub game: GameConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from `path`, writing a default file if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    /// Duration of one simulation tick.
    pub fn tick_interval(&self) -> Duration {
        rate_to_interval(self.game.tick_rate)
    }

    /// Period of the square spawner.
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.square.spawn_interval_ms.max(1))
    }
}

fn rate_to_interval(rate: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(rate.max(1)))
}

/// Networking settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Snapshot broadcasts per second.
    #[serde(default = "default_rate")]
    pub broadcast_rate: u32,
    /// Frames buffered per client; further frames are skipped until it catches up.
    #[serde(default = "default_client_buffer")]
    pub client_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            broadcast_rate: default_rate(),
            client_buffer: default_client_buffer(),
        }
    }
}

impl ServerConfig {
    /// `bind:port` listen address.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Duration of one egress cycle.
    pub fn broadcast_interval(&self) -> Duration {
        rate_to_interval(self.broadcast_rate)
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_rate() -> u32 {
    60
}
fn default_client_buffer() -> usize {
    4
}

/// Playfield dimensions in screen pixels.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArenaConfig {
    #[serde(default = "default_arena_width")]
    pub width: i32,
    #[serde(default = "default_arena_height")]
    pub height: i32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: default_arena_width(),
            height: default_arena_height(),
        }
    }
}

fn default_arena_width() -> i32 {
    800
}
fn default_arena_height() -> i32 {
    600
}

/// Paddle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaddleConfig {
    #[serde(default = "default_paddle_width")]
    pub width: i32,
    #[serde(default = "default_paddle_height")]
    pub height: i32,
    /// Horizontal displacement per press or command.
    #[serde(default = "default_paddle_speed")]
    pub speed: i32,
    /// Gap between the paddle bottom and the arena bottom.
    #[serde(default = "default_paddle_margin")]
    pub bottom_margin: i32,
}

impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            width: default_paddle_width(),
            height: default_paddle_height(),
            speed: default_paddle_speed(),
            bottom_margin: default_paddle_margin(),
        }
    }
}

fn default_paddle_width() -> i32 {
    100
}
fn default_paddle_height() -> i32 {
    20
}
fn default_paddle_speed() -> i32 {
    8
}
fn default_paddle_margin() -> i32 {
    10
}

/// Falling square configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SquareConfig {
    #[serde(default = "default_square_size")]
    pub size: i32,
    /// Pixels fallen per tick.
    #[serde(default = "default_fall_speed")]
    pub fall_speed: i32,
    #[serde(default = "default_spawn_interval")]
    pub spawn_interval_ms: u64,
    /// Highest spawn position above the arena (squares spawn in `[spawn_min_y, -size)`).
    #[serde(default = "default_spawn_min_y")]
    pub spawn_min_y: i32,
}

impl Default for SquareConfig {
    fn default() -> Self {
        Self {
            size: default_square_size(),
            fall_speed: default_fall_speed(),
            spawn_interval_ms: default_spawn_interval(),
            spawn_min_y: default_spawn_min_y(),
        }
    }
}

fn default_square_size() -> i32 {
    30
}
fn default_fall_speed() -> i32 {
    3
}
fn default_spawn_interval() -> u64 {
    1000
}
fn default_spawn_min_y() -> i32 {
    -100
}

/// Game rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameConfig {
    #[serde(default = "default_initial_lives")]
    pub initial_lives: i32,
    /// Simulation ticks per second.
    #[serde(default = "default_rate")]
    pub tick_rate: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_lives: default_initial_lives(),
            tick_rate: default_rate(),
        }
    }
}

fn default_initial_lives() -> i32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!((config.arena.width, config.arena.height), (800, 600));
        assert_eq!(config.paddle.speed, 8);
        assert_eq!(config.square.fall_speed, 3);
        assert_eq!(config.game.initial_lives, 3);
        assert_eq!(config.spawn_interval(), Duration::from_secs(1));
        assert_eq!(config.tick_interval(), config.server.broadcast_interval());
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [game]
            initial_lives = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.game.initial_lives, 5);
        assert_eq!(config.game.tick_rate, 60);
        assert_eq!(config.paddle.width, 100);
    }

    #[test]
    fn test_default_roundtrips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let config: Config = toml::from_str(&text).unwrap();
        assert_eq!(config.server.listen_addr(), "0.0.0.0:5000");
    }
}
