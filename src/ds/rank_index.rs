//! Rank-ordered multimap with insertion-sequence tie-breaking.
//!
//! Stores `(key, value)` pairs ordered by an `i64` rank. Equal ranks are
//! allowed: every insertion is assigned a unique [`RankSlot`] made of the
//! rank plus a monotonic sequence number, so two entries never collide on
//! the ordering key.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                         RankIndex Layout                                    │
//! │                                                                             │
//! │   ┌───────────────────────────────────────────────────────────────────┐    │
//! │   │  entries: BTreeMap<RankSlot, (K, V)>                              │    │
//! │   │                                                                   │    │
//! │   │    ┌──────────────────┬──────────────┐                           │    │
//! │   │    │ (rank, seq)      │ (key, value) │                           │    │
//! │   │    ├──────────────────┼──────────────┤                           │    │
//! │   │    │ (3, seq=1)       │ ("B", ..)    │  ← first_key_value = min  │    │
//! │   │    │ (3, seq=4)       │ ("D", ..)    │  ← same rank, later seq   │    │
//! │   │    │ (7, seq=2)       │ ("C", ..)    │                           │    │
//! │   │    │ (10, seq=0)      │ ("A", ..)    │                           │    │
//! │   │    └──────────────────┴──────────────┘                           │    │
//! │   └───────────────────────────────────────────────────────────────────┘    │
//! │                                                                             │
//! │   seq: 5  (next sequence number handed out by insert)                       │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation  | Description                              | Complexity |
//! |------------|------------------------------------------|------------|
//! | `insert`   | Add entry, returns its `RankSlot`        | O(log n)   |
//! | `peek_min` | Lowest-ranked entry                      | O(log n)   |
//! | `pop_min`  | Remove and return lowest-ranked entry    | O(log n)   |
//! | `remove`   | Remove entry by its exact `RankSlot`     | O(log n)   |
//! | `get`      | Look up entry by `RankSlot`              | O(log n)   |
//!
//! Among entries sharing the minimum rank, the one inserted first is
//! returned by `peek_min`/`pop_min`.
//!
//! ## Example Usage
//!
//! ```
//! use rankcache::ds::RankIndex;
//!
//! let mut index: RankIndex<&str, u32> = RankIndex::new();
//! index.insert(10, "a", 1);
//! let b = index.insert(5, "b", 2);
//! index.insert(5, "c", 3);
//!
//! // Duplicate ranks are kept side by side
//! assert_eq!(index.len(), 3);
//!
//! // Remove by exact slot
//! assert_eq!(index.remove(b), Some(("b", 2)));
//!
//! let (slot, key, _) = index.pop_min().unwrap();
//! assert_eq!((slot.rank(), key), (5, "c"));
//! ```
//!
//! ## Thread Safety
//!
//! `RankIndex` is not thread-safe. It is owned by
//! [`RankCore`](crate::policy::rank::RankCore), which is itself guarded by a
//! single lock in [`RetainBestCache`](crate::cache::RetainBestCache).
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Ordering key of a rank index entry.
///
/// Field order matters: the derived `Ord` compares `rank` first and falls
/// back to `seq`, so equal ranks are ordered by insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RankSlot {
    rank: i64,
    seq: u64,
}

impl RankSlot {
    /// Returns the rank component.
    #[inline]
    pub fn rank(&self) -> i64 {
        self.rank
    }

    /// Returns the insertion sequence number.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Ordered multimap from rank to `(key, value)`.
///
/// # Example
///
/// ```
/// use rankcache::ds::RankIndex;
///
/// let mut index: RankIndex<u64, &str> = RankIndex::new();
/// index.insert(2, 20, "twenty");
/// index.insert(-1, 10, "ten");
///
/// let (slot, key, value) = index.peek_min().unwrap();
/// assert_eq!(slot.rank(), -1);
/// assert_eq!((*key, *value), (10, "ten"));
/// ```
#[derive(Debug, Clone)]
pub struct RankIndex<K, V> {
    entries: BTreeMap<RankSlot, (K, V)>,
    seq: u64,
}

impl<K, V> RankIndex<K, V> {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            seq: 0,
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts an entry at `rank` and returns the slot it occupies.
    ///
    /// Never replaces an existing entry, even when the rank is already
    /// present.
    ///
    /// # Example
    ///
    /// ```
    /// use rankcache::ds::RankIndex;
    ///
    /// let mut index: RankIndex<&str, ()> = RankIndex::new();
    /// let first = index.insert(1, "x", ());
    /// let second = index.insert(1, "y", ());
    ///
    /// assert_ne!(first, second);
    /// assert!(first < second);
    /// assert_eq!(index.len(), 2);
    /// ```
    pub fn insert(&mut self, rank: i64, key: K, value: V) -> RankSlot {
        let slot = RankSlot {
            rank,
            seq: self.seq,
        };
        self.seq = self.seq.wrapping_add(1);
        self.entries.insert(slot, (key, value));
        slot
    }

    /// Returns the entry stored at `slot`.
    pub fn get(&self, slot: &RankSlot) -> Option<(&K, &V)> {
        self.entries.get(slot).map(|(key, value)| (key, value))
    }

    /// Returns `true` if an entry occupies `slot`.
    pub fn contains(&self, slot: &RankSlot) -> bool {
        self.entries.contains_key(slot)
    }

    /// Returns the lowest-ranked entry without removing it.
    pub fn peek_min(&self) -> Option<(RankSlot, &K, &V)> {
        self.entries
            .first_key_value()
            .map(|(slot, (key, value))| (*slot, key, value))
    }

    /// Removes and returns the lowest-ranked entry.
    ///
    /// # Example
    ///
    /// ```
    /// use rankcache::ds::RankIndex;
    ///
    /// let mut index: RankIndex<&str, i32> = RankIndex::new();
    /// index.insert(7, "c", 0);
    /// index.insert(5, "b", 0);
    ///
    /// assert_eq!(index.pop_min().map(|(_, k, _)| k), Some("b"));
    /// assert_eq!(index.pop_min().map(|(_, k, _)| k), Some("c"));
    /// assert!(index.pop_min().is_none());
    /// ```
    pub fn pop_min(&mut self) -> Option<(RankSlot, K, V)> {
        self.entries
            .pop_first()
            .map(|(slot, (key, value))| (slot, key, value))
    }

    /// Removes the entry at `slot`, if present.
    pub fn remove(&mut self, slot: RankSlot) -> Option<(K, V)> {
        self.entries.remove(&slot)
    }

    /// Removes all entries. The sequence counter keeps counting.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates entries in ascending `(rank, seq)` order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    #[cfg(any(test, debug_assertions))]
    /// Validates internal invariants (debug/test builds only).
    pub fn debug_validate_invariants(&self) {
        let slots: Vec<RankSlot> = self.entries.keys().copied().collect();
        for pair in slots.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        for slot in &slots {
            assert!(slot.seq < self.seq);
        }
    }
}

impl<K, V> Default for RankIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ascending iterator over a [`RankIndex`].
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    inner: btree_map::Iter<'a, RankSlot, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (RankSlot, &'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(slot, (key, value))| (*slot, key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a RankIndex<K, V> {
    type Item = (RankSlot, &'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_index_pops_in_rank_order() {
        let mut index = RankIndex::new();
        index.insert(10, "a", ());
        index.insert(5, "b", ());
        index.insert(7, "c", ());

        let order: Vec<_> = std::iter::from_fn(|| index.pop_min().map(|(_, k, _)| k)).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn rank_index_keeps_duplicate_ranks() {
        let mut index = RankIndex::new();
        index.insert(1, "a", 1);
        index.insert(1, "b", 2);
        index.insert(1, "c", 3);
        assert_eq!(index.len(), 3);

        assert_eq!(index.pop_min().map(|(_, k, _)| k), Some("a"));
        assert_eq!(index.pop_min().map(|(_, k, _)| k), Some("b"));
        assert_eq!(index.pop_min().map(|(_, k, _)| k), Some("c"));
    }

    #[test]
    fn rank_index_remove_by_slot_leaves_rank_twins() {
        let mut index = RankIndex::new();
        let a = index.insert(4, "a", ());
        let b = index.insert(4, "b", ());

        assert_eq!(index.remove(a), Some(("a", ())));
        assert_eq!(index.remove(a), None);
        assert!(index.contains(&b));
        assert_eq!(index.get(&b), Some((&"b", &())));
    }

    #[test]
    fn rank_index_handles_negative_and_extreme_ranks() {
        let mut index = RankIndex::new();
        index.insert(i64::MAX, "max", ());
        index.insert(0, "zero", ());
        index.insert(i64::MIN, "min", ());

        let ranks: Vec<i64> = index.iter().map(|(slot, _, _)| slot.rank()).collect();
        assert_eq!(ranks, vec![i64::MIN, 0, i64::MAX]);
    }

    #[test]
    fn rank_index_peek_does_not_remove() {
        let mut index = RankIndex::new();
        index.insert(3, "x", 30);
        assert_eq!(index.peek_min().map(|(_, k, v)| (*k, *v)), Some(("x", 30)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn rank_index_clear_keeps_sequence_monotonic() {
        let mut index = RankIndex::new();
        let before = index.insert(1, "a", ());
        index.clear();
        assert!(index.is_empty());

        let after = index.insert(1, "b", ());
        assert!(after.seq() > before.seq());
        index.debug_validate_invariants();
    }

    #[test]
    fn rank_index_empty_pop_is_none() {
        let mut index: RankIndex<u8, u8> = RankIndex::default();
        assert!(index.peek_min().is_none());
        assert!(index.pop_min().is_none());
    }
}
