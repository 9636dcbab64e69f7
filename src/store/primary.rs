//! Hash-based primary index: key → resident entry.
//!
//! ## Architecture
//! - Keys map to a [`Resident`] holding the shared value (`Arc<V>`) and the
//!   [`RankSlot`] the same entry occupies in the rank index.
//! - The slot is what lets an overwrite or invalidation remove the exact
//!   rank index entry for a key without scanning.
//! - Backed by `FxHashMap`; keys are owned by the index.
//!
//! ## Core Operations
//! - `insert`: add or replace by key, returning the previous resident.
//! - `get`: O(1) lookup.
//! - `remove`: delete by key.
//!
//! ## Thread Safety
//! - Single-threaded. Always mutated together with the rank index under the
//!   lock held by [`RetainBestCache`](crate::cache::RetainBestCache).
use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ds::RankSlot;

/// Upper bound on entries pre-allocated at construction.
const PREALLOC_LIMIT: usize = 4096;

/// A key's value together with its position in the rank index.
#[derive(Debug)]
pub struct Resident<V> {
    value: Arc<V>,
    slot: RankSlot,
}

impl<V> Resident<V> {
    pub(crate) fn new(value: Arc<V>, slot: RankSlot) -> Self {
        Self { value, slot }
    }

    /// Returns the shared value.
    #[inline]
    pub fn value(&self) -> &Arc<V> {
        &self.value
    }

    /// Returns the rank index slot of this entry.
    #[inline]
    pub fn slot(&self) -> RankSlot {
        self.slot
    }

    /// Returns the rank captured at insertion.
    #[inline]
    pub fn rank(&self) -> i64 {
        self.slot.rank()
    }

    /// Consumes the resident, returning its value.
    pub fn into_value(self) -> Arc<V> {
        self.value
    }
}

impl<V> Clone for Resident<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            slot: self.slot,
        }
    }
}

/// Key → [`Resident`] map.
#[derive(Debug)]
pub struct PrimaryIndex<K, V> {
    map: FxHashMap<K, Resident<V>>,
}

impl<K, V> PrimaryIndex<K, V>
where
    K: Eq + Hash,
{
    /// Creates an index sized for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(
                capacity.min(PREALLOC_LIMIT),
                Default::default(),
            ),
        }
    }

    /// Looks up the resident entry for `key`.
    pub fn get(&self, key: &K) -> Option<&Resident<V>> {
        self.map.get(key)
    }

    /// Checks whether `key` is resident.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Returns the number of resident keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no key is resident.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Inserts or replaces the resident entry for `key`.
    pub fn insert(&mut self, key: K, resident: Resident<V>) -> Option<Resident<V>> {
        self.map.insert(key, resident)
    }

    /// Removes the resident entry for `key`.
    pub fn remove(&mut self, key: &K) -> Option<Resident<V>> {
        self.map.remove(key)
    }

    /// Drops all entries.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Iterates `(key, resident)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Resident<V>)> {
        self.map.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ds::RankIndex;

    fn slot(rank: i64) -> RankSlot {
        let mut index: RankIndex<(), ()> = RankIndex::new();
        index.insert(rank, (), ())
    }

    #[test]
    fn primary_insert_replace_and_remove() {
        let mut index: PrimaryIndex<&str, u32> = PrimaryIndex::with_capacity(4);
        assert!(index.insert("a", Resident::new(Arc::new(1), slot(3))).is_none());

        let previous = index.insert("a", Resident::new(Arc::new(2), slot(9)));
        assert_eq!(previous.map(|r| *r.into_value()), Some(1));
        assert_eq!(index.get(&"a").map(Resident::rank), Some(9));
        assert_eq!(index.len(), 1);

        assert!(index.remove(&"a").is_some());
        assert!(!index.contains(&"a"));
        assert!(index.is_empty());
    }

    #[test]
    fn primary_huge_capacity_does_not_preallocate_everything() {
        let index: PrimaryIndex<u64, u64> = PrimaryIndex::with_capacity(usize::MAX);
        assert!(index.is_empty());
    }

    #[test]
    fn resident_clone_shares_value() {
        let resident = Resident::new(Arc::new(String::from("v")), slot(1));
        let copy = resident.clone();
        assert!(Arc::ptr_eq(resident.value(), copy.value()));
        assert_eq!(resident.slot(), copy.slot());
    }
}
