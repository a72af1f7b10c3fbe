//! Id-keyed resource table.
//!
//! `create` and `destroy` are the only structural mutations. The relay keeps
//! its landmark store and its open connections in one, clients keep their
//! render resources in another.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map;

use crate::types::ParticipantId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyedTable<V> {
    entries: HashMap<ParticipantId, V>,
}

impl<V> KeyedTable<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert `value` under `id`, returning whatever it replaced
    pub fn create(&mut self, id: ParticipantId, value: V) -> Option<V> {
        self.entries.insert(id, value)
    }

    /// Remove the entry for `id`; no-op if absent
    pub fn destroy(&mut self, id: &ParticipantId) -> Option<V> {
        self.entries.remove(id)
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&V> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &ParticipantId) -> Option<&mut V> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.entries.keys()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, ParticipantId, V> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> hash_map::IterMut<'_, ParticipantId, V> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for KeyedTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(ParticipantId, V)> for KeyedTable<V> {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a, V> IntoIterator for &'a KeyedTable<V> {
    type Item = (&'a ParticipantId, &'a V);
    type IntoIter = hash_map::Iter<'a, ParticipantId, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
