//! The client's local copy of the shared landmark state.
//!
//! Written by the relay reader (authoritative snapshots) and by the capture
//! loop (optimistic echo of our own sample); read by the reconciler. The
//! mutex keeps each write whole, and the version channel wakes the
//! reconciler after every change.

use posesync_protocol::{Landmarks, ParticipantId, Sample};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

#[derive(Debug, Clone)]
pub struct SharedView {
    landmarks: Arc<Mutex<Landmarks>>,
    version: Arc<watch::Sender<u64>>,
}

impl SharedView {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            landmarks: Arc::new(Mutex::new(Landmarks::new())),
            version: Arc::new(version),
        }
    }

    /// Replace everything with an authoritative snapshot from the relay
    pub async fn replace(&self, landmarks: Landmarks) {
        *self.landmarks.lock().await = landmarks;
        self.bump();
    }

    /// Write our own sample ahead of the relay's broadcast
    pub async fn echo(&self, id: ParticipantId, sample: Sample) {
        self.landmarks.lock().await.create(id, sample);
        self.bump();
    }

    pub async fn snapshot(&self) -> Landmarks {
        self.landmarks.lock().await.clone()
    }

    /// Watch for changes; the value is a change counter
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }
}

impl Default for SharedView {
    fn default() -> Self {
        Self::new()
    }
}
