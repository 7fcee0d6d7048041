//! Connected clients and delivery to them.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_tungstenite::tungstenite::Message;

/// Registry-assigned connection identifier.
pub type ClientId = u64;

/// Why a frame did not reach a client's outbox.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("connection closed")]
    Closed,
    #[error("outbox full")]
    Full,
}

/// Handle to one connected client.
///
/// Frames are pushed into a bounded outbox that the connection's writer task
/// drains onto the socket.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub id: ClientId,
    pub addr: SocketAddr,
    outbox: mpsc::Sender<Message>,
}

impl ClientHandle {
    pub fn new(id: ClientId, addr: SocketAddr, outbox: mpsc::Sender<Message>) -> Self {
        Self { id, addr, outbox }
    }

    /// Queue a frame for this client without waiting.
    ///
    /// A full outbox means the client has not kept up; the frame is dropped
    /// for this client only.
    pub fn deliver(&self, frame: Message) -> Result<(), DeliveryError> {
        self.outbox.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// Set of currently connected clients.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<ClientId, ClientHandle>>,
    last_id: AtomicU64,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh client id.
    pub fn next_id(&self) -> ClientId {
        self.last_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Add a client. Returns false if this id was already registered.
    pub async fn register(&self, client: ClientHandle) -> bool {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&client.id) {
            return false;
        }
        clients.insert(client.id, client);
        true
    }

    /// Remove a client. Returns the handle if it was present.
    pub async fn unregister(&self, id: ClientId) -> Option<ClientHandle> {
        self.clients.write().await.remove(&id)
    }

    /// Current membership, for iteration without holding the lock.
    pub async fn snapshot(&self) -> Vec<ClientHandle> {
        self.clients.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}
