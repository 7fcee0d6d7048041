//! Periodic snapshot fan-out.

use super::client::{ClientRegistry, DeliveryError};
use crate::state::StateReader;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info};

/// Result of one egress cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Clients that got the frame.
    pub delivered: usize,
    /// Clients whose outbox was still full, so the frame was skipped for them.
    pub skipped: usize,
    /// Dead clients removed from the registry.
    pub dropped: usize,
}

/// Serialize the current state once and push it to every registered client.
///
/// Delivery never waits on a client: a full outbox skips the frame for that
/// client and a dead client is unregistered, neither affecting the others.
pub async fn broadcast_once(registry: &ClientRegistry, state: &StateReader) -> BroadcastReport {
    if registry.is_empty().await {
        return BroadcastReport::default();
    }

    let snapshot = state.read();
    let json = match snapshot.to_packet().to_json() {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize state snapshot: {}", e);
            return BroadcastReport::default();
        }
    };
    let frame = Message::text(json);

    let mut report = BroadcastReport::default();
    for client in registry.snapshot().await {
        match client.deliver(frame.clone()) {
            Ok(()) => report.delivered += 1,
            Err(DeliveryError::Full) => {
                debug!("Skipped frame for slow client {} ({})", client.id, client.addr);
                report.skipped += 1;
            }
            Err(DeliveryError::Closed) => {
                if registry.unregister(client.id).await.is_some() {
                    info!(
                        "Client {} ({}) dropped during broadcast. Total clients: {}",
                        client.id,
                        client.addr,
                        registry.len().await
                    );
                }
                report.dropped += 1;
            }
        }
    }
    report
}

/// Broadcast on a fixed period until the task is dropped.
pub async fn run_broadcast_loop(
    registry: Arc<ClientRegistry>,
    state: StateReader,
    period: Duration,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let report = broadcast_once(&registry, &state).await;
        if report.skipped > 0 || report.dropped > 0 {
            debug!(
                "Broadcast: {} delivered, {} skipped, {} dropped",
                report.delivered, report.skipped, report.dropped
            );
        }
    }
}
