//! Landmark store: participant id → latest sample.
//!
//! Snapshots are shared `Arc`s. Writers go through `Arc::make_mut`, so a
//! write only clones the table while an older snapshot is still alive and
//! taking a snapshot never copies.

use posesync_protocol::{KeyedTable, Landmarks, ParticipantId, Sample};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct LandmarkStore {
    landmarks: Arc<Landmarks>,
}

impl LandmarkStore {
    pub fn new() -> Self {
        Self {
            landmarks: Arc::new(KeyedTable::new()),
        }
    }

    /// Insert or replace the sample for `id`
    pub fn put(&mut self, id: ParticipantId, sample: Sample) {
        Arc::make_mut(&mut self.landmarks).create(id, sample);
    }

    /// Drop the entry for `id` if there is one
    pub fn remove(&mut self, id: &ParticipantId) {
        if self.landmarks.contains(id) {
            Arc::make_mut(&mut self.landmarks).destroy(id);
        }
    }

    pub fn snapshot(&self) -> Arc<Landmarks> {
        Arc::clone(&self.landmarks)
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn id(s: &str) -> ParticipantId {
        ParticipantId::try_from(s).unwrap()
    }

    fn sample(score: f64) -> Sample {
        Sample::new(json!({ "score": score }), Value::Null).unwrap()
    }

    #[test]
    fn test_put_replaces_whole_sample() {
        let mut store = LandmarkStore::new();
        store.put(id("a"), Sample::new(json!({ "score": 1.0 }), json!({ "x": 1 })).unwrap());
        store.put(id("a"), sample(0.5));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(&id("a")), Some(&sample(0.5)));
        assert!(snapshot.get(&id("a")).unwrap().face().is_null());
    }

    #[test]
    fn test_remove_then_put_leaves_no_residue() {
        let mut store = LandmarkStore::new();
        store.put(id("a"), sample(0.1));
        store.remove(&id("a"));
        assert!(store.is_empty());

        store.put(id("a"), sample(0.9));
        assert_eq!(store.snapshot().get(&id("a")), Some(&sample(0.9)));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut store = LandmarkStore::new();
        store.put(id("a"), sample(0.1));
        store.remove(&id("b"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let mut store = LandmarkStore::new();
        store.put(id("a"), sample(0.1));
        let before = store.snapshot();

        store.put(id("b"), sample(0.2));
        store.remove(&id("a"));

        assert_eq!(before.len(), 1);
        assert!(before.contains(&id("a")));
        assert!(store.snapshot().contains(&id("b")));
        assert!(!store.snapshot().contains(&id("a")));
    }

    #[test]
    fn test_same_sample_twice_is_idempotent() {
        let mut once = LandmarkStore::new();
        once.put(id("a"), sample(0.3));

        let mut twice = LandmarkStore::new();
        twice.put(id("a"), sample(0.3));
        twice.put(id("a"), sample(0.3));

        assert_eq!(*once.snapshot(), *twice.snapshot());
    }
}
