//! Game server implementation.
//!
//! Two schedulers run side by side: the simulation task owns all game state
//! mutation, while the network side accepts WebSocket viewers, feeds their
//! commands into the command queue and broadcasts snapshots read from the
//! state store. The two only meet at the queue and the store.

use crate::command::{command_queue, CommandSender};
use crate::config::{Config, ServerConfig};
use crate::input::InputSource;
use crate::state::{StateReader, StateStore};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use protocol::{ClientPacket, ProtocolError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use tracing::{debug, error, info, warn};

pub mod broadcast;
pub mod client;
pub mod game;

pub use broadcast::{broadcast_once, run_broadcast_loop, BroadcastReport};
pub use client::{ClientHandle, ClientId, ClientRegistry, DeliveryError};
pub use game::{run_game_loop, GameEngine, TickOutcome};

/// Run the simulation and the WebSocket server until the simulation stops.
///
/// The engine publishes into `store`; callers keep their own readers from it.
/// A network startup failure is logged and the simulation keeps running on
/// its own.
pub async fn run(
    config: Config,
    input: Box<dyn InputSource>,
    store: StateStore,
) -> anyhow::Result<()> {
    let (commands, queue) = command_queue();
    let reader = store.reader();

    let engine = GameEngine::new(&config, queue, store);
    let mut game_loop = tokio::spawn(run_game_loop(
        engine,
        input,
        config.tick_interval(),
        config.spawn_interval(),
    ));

    let server = BroadcastServer::new(config.server.clone(), commands, reader);
    let addr = config.server.listen_addr();

    tokio::select! {
        result = &mut game_loop => {
            return result.map_err(|e| anyhow::anyhow!("Simulation task failed: {}", e));
        }
        result = server.bind_and_serve(&addr) => {
            if let Err(e) = result {
                error!(
                    "Broadcast server on {} stopped: {:#}. Simulation continues without viewers",
                    addr, e
                );
            }
        }
    }

    game_loop
        .await
        .map_err(|e| anyhow::anyhow!("Simulation task failed: {}", e))
}

/// How long a finished connection may spend flushing its outbox.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Accepts viewers, ingests their commands and fans out state snapshots.
pub struct BroadcastServer {
    config: ServerConfig,
    registry: Arc<ClientRegistry>,
    commands: CommandSender,
    state: StateReader,
}

impl BroadcastServer {
    pub fn new(config: ServerConfig, commands: CommandSender, state: StateReader) -> Self {
        Self {
            config,
            registry: Arc::new(ClientRegistry::new()),
            commands,
            state,
        }
    }

    pub fn registry(&self) -> Arc<ClientRegistry> {
        Arc::clone(&self.registry)
    }

    /// Bind `addr` and serve on it.
    pub async fn bind_and_serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on ws://{}", listener.local_addr()?);
        self.serve(listener).await
    }

    /// Serve connections from `listener` and run the egress loop.
    ///
    /// Returns only if accepting fails.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        let egress = tokio::spawn(run_broadcast_loop(
            Arc::clone(&self.registry),
            self.state.clone(),
            self.config.broadcast_interval(),
        ));
        let result = self.accept_loop(listener).await;
        egress.abort();
        result
    }

    async fn accept_loop(&self, listener: TcpListener) -> anyhow::Result<()> {
        loop {
            let (stream, addr) = listener.accept().await?;
            let id = self.registry.next_id();
            let registry = Arc::clone(&self.registry);
            let commands = self.commands.clone();
            let buffer = self.config.client_buffer.max(1);

            tokio::spawn(async move {
                let connection = tokio::spawn(handle_connection(
                    stream,
                    addr,
                    id,
                    Arc::clone(&registry),
                    commands,
                    buffer,
                ));
                let result = connection.await;

                // Covers connections that ended without cleaning up, panics included
                if registry.unregister(id).await.is_some() {
                    info!(
                        "Client {} ({}) disconnected. Total clients: {}",
                        id,
                        addr,
                        registry.len().await
                    );
                }

                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("Connection error from {}: {}", addr, e),
                    Err(e) if e.is_panic() => error!("Connection task for {} panicked", addr),
                    Err(e) => warn!("Connection task for {} cancelled: {}", addr, e),
                }
            });
        }
    }
}

/// Serve one WebSocket connection: handshake, register, read commands until close.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    id: ClientId,
    registry: Arc<ClientRegistry>,
    commands: CommandSender,
    buffer: usize,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    let (write, mut read) = ws_stream.split();

    let (outbox_tx, outbox_rx) = mpsc::channel(buffer);
    registry
        .register(ClientHandle::new(id, addr, outbox_tx))
        .await;
    info!(
        "Client {} connected from {}. Total clients: {}",
        id,
        addr,
        registry.len().await
    );

    let mut writer = tokio::spawn(write_loop(write, outbox_rx, addr));

    let writer_done = loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = ingest(&commands, text.as_str()) {
                            warn!("Malformed message from {}: {}", addr, e);
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        debug!("Ignoring binary frame from {}", addr);
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!("Client {} sent close", addr);
                        break false;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error from {}: {}", addr, e);
                        break false;
                    }
                    None => break false,
                    _ => {}
                }
            }
            // The writer only stops when the socket can no longer be written
            _ = &mut writer => break true,
        }
    };

    // Dropping the registry's sender closes the outbox, so the writer flushes
    // what is queued (including the close reply) and closes the sink.
    if registry.unregister(id).await.is_some() {
        info!(
            "Client {} ({}) disconnected. Total clients: {}",
            id,
            addr,
            registry.len().await
        );
    }
    if !writer_done && timeout(CLOSE_GRACE, &mut writer).await.is_err() {
        debug!("Writer for {} did not finish in time", addr);
        writer.abort();
    }
    Ok(())
}

/// Drain a client's outbox onto its socket.
async fn write_loop(
    mut write: SplitSink<WebSocketStream<TcpStream>, Message>,
    mut outbox: mpsc::Receiver<Message>,
    addr: SocketAddr,
) {
    while let Some(frame) = outbox.recv().await {
        if let Err(e) = write.send(frame).await {
            warn!("Failed to send to {}: {}", addr, e);
            break;
        }
    }
    let _ = write.close().await;
}

/// Translate a client text frame into a queued command.
///
/// Returns the parsed packet so callers can log or inspect it; packets of any
/// other type are accepted and ignored.
pub fn ingest(commands: &CommandSender, text: &str) -> Result<ClientPacket, ProtocolError> {
    let packet = ClientPacket::parse(text)?;
    match &packet {
        ClientPacket::Control { direction } => {
            if !commands.enqueue(*direction) {
                debug!("Simulation stopped, dropping {} command", direction);
            }
        }
        ClientPacket::Ignored { kind } => debug!("Ignoring message of type {:?}", kind),
    }
    Ok(packet)
}
