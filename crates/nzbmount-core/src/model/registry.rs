//! Insertion-ordered id-to-entity registry.
//!
//! Engine notifications are keyed by opaque ids and may race entity creation
//! or destruction, so every lookup returns an `Option` — a miss is benign,
//! never an error. Iteration preserves insertion order so presentation views
//! stay stable.

use std::collections::HashMap;
use std::hash::Hash;

/// Map from engine-assigned id to entity with O(1) lookup and insertion-order
/// iteration.
#[derive(Debug, Clone)]
pub struct IdRegistry<I, T> {
    entries: HashMap<I, T>,
    order: Vec<I>,
}

impl<I, T> Default for IdRegistry<I, T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<I: Copy + Eq + Hash, T> IdRegistry<I, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: I) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    /// Insert at the tail of the iteration order. Re-inserting an id replaces
    /// the entity but keeps its original position.
    pub fn insert(&mut self, id: I, entity: T) -> Option<T> {
        let prev = self.entries.insert(id, entity);
        if prev.is_none() {
            self.order.push(id);
        }
        prev
    }

    /// Remove an entity; `None` if the id is unknown.
    pub fn remove(&mut self, id: I) -> Option<T> {
        let prev = self.entries.remove(&id)?;
        self.order.retain(|k| *k != id);
        Some(prev)
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.order.iter().filter_map(|id| {
            self.entries.get(id).map(|entity| (*id, entity))
        })
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        self.order.iter().copied()
    }
}
