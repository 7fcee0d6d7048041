//! Catch Squares - authoritative game server binary

use server::{GameState, StateStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod console;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Catch Squares Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = server::Config::load()?;
    info!("Loaded configuration");
    info!("  Listen: {}", config.server.listen_addr());
    info!("  Arena: {}x{}", config.arena.width, config.arena.height);
    info!(
        "  Tick rate: {}/s, broadcast rate: {}/s",
        config.game.tick_rate, config.server.broadcast_rate
    );

    let store = StateStore::new(GameState::initial(&config));
    let state = store.reader();
    let (controls, input) = server::local_controls();

    tokio::select! {
        result = server::run(config, Box::new(input), store) => result?,
        result = console::run(controls, state) => {
            result?;
            info!("Console closed, shutting down");
        }
        _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
    }

    Ok(())
}
