use posesync_protocol::{KeyedTable, Landmarks, ParticipantId, Sample, ServerMessage, encode_landmarks};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

use crate::store::LandmarkStore;

/// Everything that must change together when a connection event is applied
struct Relay {
    /// Outbound queue per open connection
    senders: KeyedTable<mpsc::UnboundedSender<String>>,
    store: LandmarkStore,
}

/// Open connections plus the landmark store they feed.
///
/// Every event takes the same lock and runs its store mutation and the
/// resulting broadcast before releasing it, so broadcasts leave in the
/// order their mutations were applied. Tokio's mutex is FIFO, which keeps
/// events from different connections in arrival order.
pub struct ConnectionRegistry {
    relay: Mutex<Relay>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            relay: Mutex::new(Relay {
                senders: KeyedTable::new(),
                store: LandmarkStore::new(),
            }),
        }
    }

    /// Register a connection and queue its `setId` notice.
    ///
    /// The notice is queued before the lock is released, so it is the first
    /// thing the connection sees and no earlier broadcast can reach it.
    pub async fn register(&self, sender: mpsc::UnboundedSender<String>) -> ParticipantId {
        let mut relay = self.relay.lock().await;

        let mut id = ParticipantId::generate();
        while relay.senders.contains(&id) {
            id = ParticipantId::generate();
        }

        match (ServerMessage::SetId { id: id.clone() }).encode() {
            Ok(json) => {
                if let Err(e) = sender.send(json) {
                    tracing::error!("Failed to queue id for {}: {}", id, e);
                }
            }
            Err(e) => tracing::error!("Failed to serialize setId: {}", e),
        }

        relay.senders.create(id.clone(), sender);
        tracing::debug!(
            "Participant {} connected ({} open)",
            id,
            relay.senders.len()
        );

        id
    }

    /// Store a sample from `id` and broadcast the new state to everyone
    pub async fn submit(&self, id: &ParticipantId, sample: Sample) {
        let mut relay = self.relay.lock().await;

        // A sample racing the close of its own connection must not resurrect it
        if !relay.senders.contains(id) {
            tracing::debug!("Dropping sample from closed connection {}", id);
            return;
        }

        relay.store.put(id.clone(), sample);
        relay.broadcast();
    }

    /// Forget a connection and broadcast the remaining state
    pub async fn unregister(&self, id: &ParticipantId) {
        let mut relay = self.relay.lock().await;

        if relay.senders.destroy(id).is_none() {
            return;
        }
        relay.store.remove(id);

        tracing::debug!(
            "Participant {} disconnected ({} open)",
            id,
            relay.senders.len()
        );

        relay.broadcast();
    }

    pub async fn snapshot(&self) -> Arc<Landmarks> {
        self.relay.lock().await.store.snapshot()
    }

    pub async fn connection_count(&self) -> usize {
        self.relay.lock().await.senders.len()
    }
}

impl Relay {
    fn broadcast(&self) {
        let snapshot = self.store.snapshot();
        let json = match encode_landmarks(&snapshot) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!("Failed to serialize landmarks: {}", e);
                return;
            }
        };

        tracing::trace!(
            "Broadcasting {} landmarks to {} connections",
            snapshot.len(),
            self.senders.len()
        );

        for (conn_id, sender) in &self.senders {
            if let Err(e) = sender.send(json.clone()) {
                tracing::warn!("Failed to queue landmarks for {}: {}", conn_id, e);
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
