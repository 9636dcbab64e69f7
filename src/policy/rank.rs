//! # Rank-Ordered Retention Core
//!
//! Single-threaded, dual-indexed store that keeps at most `capacity` entries
//! and, when full, discards the entry with the lowest rank.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                          RankCore<K, V>                                  │
//!   │                                                                          │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │  primary: PrimaryIndex<K, V>         (FxHashMap)                   │ │
//!   │   │                                                                    │ │
//!   │   │  ┌─────────┬──────────────────────────────┐                        │ │
//!   │   │  │   Key   │  Resident { Arc<V>, slot }   │                        │ │
//!   │   │  ├─────────┼──────────────────────────────┤                        │ │
//!   │   │  │    A    │  (a, slot=(10, seq 0)) ──────┼──────┐                 │ │
//!   │   │  │    C    │  (c, slot=( 7, seq 2)) ──────┼───┐  │                 │ │
//!   │   │  └─────────┴──────────────────────────────┘   │  │                 │ │
//!   │   └───────────────────────────────────────────────┼──┼─────────────────┘ │
//!   │                                                   │  │                   │
//!   │   ┌───────────────────────────────────────────────┼──┼─────────────────┐ │
//!   │   │  by_rank: RankIndex<K, Arc<V>>   (BTreeMap)   ▼  ▼                 │ │
//!   │   │                                                                    │ │
//!   │   │   ( 7, seq 2) → (C, c)   ← lowest: next eviction victim            │ │
//!   │   │   (10, seq 0) → (A, a)                                             │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   │                                                                          │
//!   │   capacity: 2                                                            │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Insert Flow
//!
//! ```text
//!   insert(key, value):
//!     rank = value.rank()                         (read once, never again)
//!     if key resident:
//!       by_rank.remove(old slot)                  (overwrite, size unchanged)
//!     else if capacity == 0:
//!       return, nothing stored
//!     else if len >= capacity:
//!       (victim, ..) = by_rank.pop_min()          (lowest rank, earliest seq)
//!       primary.remove(victim)
//!     slot = by_rank.insert(rank, key, value)
//!     primary.insert(key, Resident { value, slot })
//! ```
//!
//! ## Key Components
//!
//! | Component  | Type                      | Purpose                          |
//! |------------|---------------------------|----------------------------------|
//! | `primary`  | `PrimaryIndex<K, V>`      | O(1) hit lookup                  |
//! | `by_rank`  | `RankIndex<K, Arc<V>>`    | O(log n) minimum find/remove     |
//! | `capacity` | `usize`                   | Maximum resident entries         |
//!
//! ## Core Operations
//!
//! | Method          | Complexity | Description                               |
//! |-----------------|------------|-------------------------------------------|
//! | `get(&k)`       | O(1)       | Resident value, no state change           |
//! | `insert(k, v)`  | O(log n)   | Insert/overwrite, evicts minimum if full  |
//! | `remove(&k)`    | O(log n)   | Remove from both indexes                  |
//! | `pop_lowest()`  | O(log n)   | Remove the minimum-rank entry             |
//! | `peek_lowest()` | O(log n)   | Inspect the minimum-rank entry            |
//!
//! ## Invariants
//!
//! - `primary.len() == by_rank.len()` and every resident's slot points at a
//!   rank index entry carrying the same key.
//! - `len() <= capacity()` after every operation.
//!
//! ## Thread Safety
//!
//! Not thread-safe on its own. [`RetainBestCache`](crate::cache::RetainBestCache)
//! wraps it in a single `parking_lot::RwLock` so both indexes always change
//! together.

use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

use crate::ds::RankIndex;
use crate::error::InvariantError;
use crate::store::{PrimaryIndex, Resident};
use crate::traits::Rankable;

/// Result of [`RankCore::insert`].
#[derive(Debug)]
pub struct InsertOutcome<K, V> {
    /// Value previously stored under the same key.
    pub replaced: Option<Arc<V>>,
    /// Entry evicted to make room, with its rank.
    pub evicted: Option<(K, Arc<V>, i64)>,
    /// `false` only when the capacity is zero.
    pub stored: bool,
}

/// Dual-indexed, rank-evicting store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use rankcache::policy::rank::RankCore;
///
/// let mut core: RankCore<&str, i64> = RankCore::new(2);
/// core.insert("a", Arc::new(10));
/// core.insert("b", Arc::new(5));
///
/// let outcome = core.insert("c", Arc::new(7));
/// assert_eq!(outcome.evicted.map(|(k, _, rank)| (k, rank)), Some(("b", 5)));
///
/// assert!(core.contains(&"a"));
/// assert!(!core.contains(&"b"));
/// assert!(core.contains(&"c"));
/// ```
#[derive(Debug)]
pub struct RankCore<K, V> {
    primary: PrimaryIndex<K, V>,
    by_rank: RankIndex<K, Arc<V>>,
    capacity: usize,
}

impl<K, V> RankCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty core holding at most `capacity` entries.
    ///
    /// A capacity of 0 is valid; such a core never retains anything.
    pub fn new(capacity: usize) -> Self {
        Self {
            primary: PrimaryIndex::with_capacity(capacity),
            by_rank: RankIndex::new(),
            capacity,
        }
    }

    /// Maximum number of resident entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of resident entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    /// Returns `true` if nothing is resident.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Checks whether `key` is resident.
    pub fn contains(&self, key: &K) -> bool {
        self.primary.contains(key)
    }

    /// Returns the resident value for `key`. Does not change any ordering.
    pub fn get(&self, key: &K) -> Option<&Arc<V>> {
        self.primary.get(key).map(Resident::value)
    }

    /// Returns the rank captured when `key` was inserted.
    pub fn rank_of(&self, key: &K) -> Option<i64> {
        self.primary.get(key).map(Resident::rank)
    }

    /// Inserts `value` under `key`, overwriting any resident entry for the
    /// key or, when full, evicting the lowest-ranked entry first.
    ///
    /// Among entries tied for the lowest rank, the earliest inserted is
    /// evicted.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use rankcache::policy::rank::RankCore;
    ///
    /// let mut core: RankCore<u32, i64> = RankCore::new(4);
    /// core.insert(1, Arc::new(3));
    ///
    /// // Overwrite replaces the value and its rank
    /// let outcome = core.insert(1, Arc::new(9));
    /// assert_eq!(outcome.replaced.as_deref(), Some(&3));
    /// assert_eq!(core.rank_of(&1), Some(9));
    /// assert_eq!(core.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: Arc<V>) -> InsertOutcome<K, V>
    where
        V: Rankable,
    {
        let rank = value.rank();

        if let Some(previous) = self.primary.remove(&key) {
            self.by_rank.remove(previous.slot());
            self.store(key, value, rank);
            return InsertOutcome {
                replaced: Some(previous.into_value()),
                evicted: None,
                stored: true,
            };
        }

        if self.capacity == 0 {
            return InsertOutcome {
                replaced: None,
                evicted: None,
                stored: false,
            };
        }

        let evicted = if self.primary.len() >= self.capacity {
            self.pop_lowest()
        } else {
            None
        };
        if let Some((_, _, victim_rank)) = &evicted {
            debug!(rank = *victim_rank, "evicted lowest-ranked entry");
        }

        self.store(key, value, rank);
        InsertOutcome {
            replaced: None,
            evicted,
            stored: true,
        }
    }

    /// Removes `key` from both indexes.
    pub fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        let resident = self.primary.remove(key)?;
        self.by_rank.remove(resident.slot());
        Some(resident.into_value())
    }

    /// Removes and returns the lowest-ranked entry with its rank.
    pub fn pop_lowest(&mut self) -> Option<(K, Arc<V>, i64)> {
        let (slot, key, value) = self.by_rank.pop_min()?;
        self.primary.remove(&key);
        Some((key, value, slot.rank()))
    }

    /// Returns the lowest-ranked entry with its rank.
    pub fn peek_lowest(&self) -> Option<(&K, &Arc<V>, i64)> {
        self.by_rank
            .peek_min()
            .map(|(slot, key, value)| (key, value, slot.rank()))
    }

    /// Iterates resident entries from lowest to highest rank.
    pub fn iter_by_rank(&self) -> impl Iterator<Item = (&K, &Arc<V>, i64)> {
        self.by_rank
            .iter()
            .map(|(slot, key, value)| (key, value, slot.rank()))
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.primary.clear();
        self.by_rank.clear();
    }

    /// Moves every entry into the returned core, leaving `self` empty with
    /// the same capacity.
    pub fn take(&mut self) -> Self {
        let empty = Self::new(self.capacity);
        std::mem::replace(self, empty)
    }

    /// Verifies that both indexes hold the same keys and the size bound.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.primary.len() != self.by_rank.len() {
            return Err(InvariantError::count_mismatch(
                "primary index vs rank index length",
                self.primary.len(),
                self.by_rank.len(),
            ));
        }
        if self.primary.len() > self.capacity {
            return Err(InvariantError::count_mismatch(
                "length exceeds capacity",
                self.primary.len(),
                self.capacity,
            ));
        }
        for (key, resident) in self.primary.iter() {
            match self.by_rank.get(&resident.slot()) {
                Some((ranked_key, ranked_value)) => {
                    if ranked_key != key {
                        return Err(InvariantError::new(format!(
                            "rank slot {:?} carries a different key",
                            resident.slot()
                        )));
                    }
                    if !Arc::ptr_eq(ranked_value, resident.value()) {
                        return Err(InvariantError::new(format!(
                            "rank slot {:?} carries a different value",
                            resident.slot()
                        )));
                    }
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "resident slot {:?} missing from rank index",
                        resident.slot()
                    )));
                },
            }
        }
        Ok(())
    }

    fn store(&mut self, key: K, value: Arc<V>, rank: i64) {
        let slot = self.by_rank.insert(rank, key.clone(), Arc::clone(&value));
        self.primary.insert(key, Resident::new(value, slot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Ranked;

    #[test]
    fn evicts_lowest_rank_at_capacity() {
        let mut core: RankCore<&str, i64> = RankCore::new(2);
        core.insert("a", Arc::new(10));
        core.insert("b", Arc::new(5));
        core.insert("c", Arc::new(7));

        assert!(core.contains(&"a"));
        assert!(!core.contains(&"b"));
        assert!(core.contains(&"c"));
        assert_eq!(core.len(), 2);
        core.check_invariants().unwrap();
    }

    #[test]
    fn strictly_increasing_ranks_drop_only_the_first() {
        let capacity = 8;
        let mut core: RankCore<u64, i64> = RankCore::new(capacity);
        for key in 0..=capacity as u64 {
            core.insert(key, Arc::new(key as i64));
        }

        assert_eq!(core.len(), capacity);
        assert!(!core.contains(&0));
        for key in 1..=capacity as u64 {
            assert!(core.contains(&key));
        }
    }

    #[test]
    fn tied_minimum_evicts_exactly_one() {
        let mut core: RankCore<&str, i64> = RankCore::new(2);
        core.insert("a", Arc::new(1));
        core.insert("b", Arc::new(1));
        let outcome = core.insert("c", Arc::new(1));

        let (victim, _, rank) = outcome.evicted.unwrap();
        assert_eq!(rank, 1);
        assert_eq!(victim, "a");
        assert_eq!(core.len(), 2);
        assert!(core.contains(&"b") && core.contains(&"c"));
        core.check_invariants().unwrap();
    }

    #[test]
    fn new_entry_with_lower_rank_than_all_still_enters() {
        let mut core: RankCore<&str, i64> = RankCore::new(1);
        core.insert("high", Arc::new(100));
        let outcome = core.insert("low", Arc::new(-100));

        assert_eq!(outcome.evicted.map(|(k, _, _)| k), Some("high"));
        assert!(core.contains(&"low"));
    }

    #[test]
    fn overwrite_moves_rank_slot_without_evicting() {
        let mut core: RankCore<&str, i64> = RankCore::new(2);
        core.insert("a", Arc::new(1));
        core.insert("b", Arc::new(2));

        let outcome = core.insert("a", Arc::new(50));
        assert!(outcome.evicted.is_none());
        assert_eq!(outcome.replaced.as_deref(), Some(&1));
        assert_eq!(core.peek_lowest().map(|(k, _, r)| (*k, r)), Some(("b", 2)));
        core.check_invariants().unwrap();
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut core: RankCore<u8, i64> = RankCore::new(0);
        let outcome = core.insert(1, Arc::new(1));
        assert!(!outcome.stored);
        assert!(outcome.evicted.is_none());
        assert!(core.is_empty());
        core.check_invariants().unwrap();
    }

    #[test]
    fn remove_and_pop_keep_indexes_in_step() {
        let mut core: RankCore<u8, Ranked<&str>> = RankCore::new(4);
        core.insert(1, Arc::new(Ranked::new("one", 30)));
        core.insert(2, Arc::new(Ranked::new("two", 10)));
        core.insert(3, Arc::new(Ranked::new("three", 20)));

        assert_eq!(core.remove(&3).map(|v| *v.value()), Some("three"));
        assert_eq!(core.remove(&3), None);
        core.check_invariants().unwrap();

        let (key, value, rank) = core.pop_lowest().unwrap();
        assert_eq!((key, *value.value(), rank), (2, "two", 10));
        assert_eq!(core.len(), 1);
        core.check_invariants().unwrap();
    }

    #[test]
    fn iter_by_rank_is_ascending() {
        let mut core: RankCore<char, i64> = RankCore::new(4);
        for (key, rank) in [('x', 3), ('y', -2), ('z', 3), ('w', 0)] {
            core.insert(key, Arc::new(rank));
        }
        let keys: Vec<char> = core.iter_by_rank().map(|(k, _, _)| *k).collect();
        assert_eq!(keys, vec!['y', 'w', 'x', 'z']);
    }

    #[test]
    fn take_leaves_empty_core_with_same_capacity() {
        let mut core: RankCore<u8, i64> = RankCore::new(3);
        core.insert(1, Arc::new(1));
        core.insert(2, Arc::new(2));

        let taken = core.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken.rank_of(&2), Some(2));
        taken.check_invariants().unwrap();

        assert!(core.is_empty());
        assert_eq!(core.capacity(), 3);
        core.insert(3, Arc::new(3));
        assert_eq!(core.len(), 1);
        core.check_invariants().unwrap();
    }

    #[test]
    fn clear_empties_both_indexes() {
        let mut core: RankCore<u8, i64> = RankCore::new(3);
        core.insert(1, Arc::new(1));
        core.insert(2, Arc::new(2));
        core.clear();
        assert!(core.is_empty());
        assert!(core.peek_lowest().is_none());
        core.check_invariants().unwrap();
    }

    // ==============================================
    // Property Tests
    // ==============================================

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Insert(u8, i64),
            Remove(u8),
            PopLowest,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => (0u8..40, -20i64..20).prop_map(|(k, r)| Op::Insert(k, r)),
                1 => (0u8..40).prop_map(Op::Remove),
                1 => Just(Op::PopLowest),
            ]
        }

        proptest! {
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_invariants_always_hold(
                capacity in 0usize..12,
                ops in prop::collection::vec(op_strategy(), 0..150)
            ) {
                let mut core: RankCore<u8, i64> = RankCore::new(capacity);
                for op in ops {
                    match op {
                        Op::Insert(k, r) => { core.insert(k, Arc::new(r)); },
                        Op::Remove(k) => { core.remove(&k); },
                        Op::PopLowest => { core.pop_lowest(); },
                    }
                    prop_assert!(core.len() <= capacity);
                    prop_assert!(core.check_invariants().is_ok());
                }
            }

            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_eviction_victim_has_minimum_rank(
                capacity in 1usize..10,
                ranks in prop::collection::vec(-50i64..50, 1..80)
            ) {
                let mut core: RankCore<usize, i64> = RankCore::new(capacity);
                for (key, rank) in ranks.into_iter().enumerate() {
                    let floor = core.peek_lowest().map(|(_, _, r)| r);
                    let outcome = core.insert(key, Arc::new(rank));
                    if let Some((_, _, victim_rank)) = outcome.evicted {
                        prop_assert_eq!(Some(victim_rank), floor);
                        prop_assert!(core
                            .iter_by_rank()
                            .filter(|(k, _, _)| **k != key)
                            .all(|(_, _, r)| r >= victim_rank));
                    }
                }
            }
        }
    }
}
