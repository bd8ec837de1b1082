//! # Chained Counter Map
//!
//! Separate-chaining hash table mapping keys to `i64` counters. Each table
//! slot owns a bucket of `(key, value)` pairs; collisions append to the
//! bucket, lookups scan it linearly.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────┐
//!   │                  ChainedCounterMap<K, S>                   │
//!   │                                                            │
//!   │   table: Vec<Vec<(K, i64)>>       (prime slot count)       │
//!   │                                                            │
//!   │   [0] ──▶ [("the", 4), ("kit", 1)]                         │
//!   │   [1] ──▶ []                                               │
//!   │   [2] ──▶ [("box", 2)]                                     │
//!   │    ⋮                                                       │
//!   │   [18] ─▶ []                                               │
//!   │                                                            │
//!   │   grows to next_prime(2 * slots) before the insert that    │
//!   │   would reach max_load_factor (default 1.0)                │
//!   └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The slot count is always prime so that modular reduction spreads keys
//! even under patterned hash outputs. Hashing goes through [`FxBuildHasher`]
//! by default; any [`BuildHasher`] can be substituted.

use std::hash::{BuildHasher, Hash};

use rustc_hash::FxBuildHasher;

use crate::ds::next_prime;
use crate::error::{ConfigError, InvariantError};
use crate::metrics::{MapMetricsSnapshot, MetricsCell, MetricsSnapshotProvider};
use crate::traits::{CounterMap, InstrumentedMap};

/// Slot count the zero-argument constructor asks for (raised to a prime).
const DEFAULT_CAPACITY: usize = 19;

/// Separate-chaining hash counter map.
///
/// # Example
///
/// ```
/// use tallykit::traits::CounterMap;
/// use tallykit::map::chained::ChainedCounterMap;
///
/// let mut map: ChainedCounterMap<String> = ChainedCounterMap::new();
/// *map.counter("tally".to_string()) += 1;
/// *map.counter("tally".to_string()) += 1;
/// assert_eq!(map.get(&"tally".to_string()), Some(&2));
/// ```
pub struct ChainedCounterMap<K, S = FxBuildHasher> {
    table: Vec<Vec<(K, i64)>>,
    len: usize,
    max_load_factor: f64,
    hasher: S,
    comparisons: MetricsCell,
    rehashes: u64,
}

// Manual impl: deriving Debug would bound `S: Debug`, which FxBuildHasher
// does not satisfy. The hasher carries no state worth printing.
impl<K: std::fmt::Debug, S> std::fmt::Debug for ChainedCounterMap<K, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainedCounterMap")
            .field("table", &self.table)
            .field("len", &self.len)
            .field("max_load_factor", &self.max_load_factor)
            .field("comparisons", &self.comparisons)
            .field("rehashes", &self.rehashes)
            .finish_non_exhaustive()
    }
}

impl<K: Hash + Eq> ChainedCounterMap<K> {
    /// Creates a map with the default slot count (19) and a max load
    /// factor of 1.0.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a map with at least `capacity` slots (raised to a prime).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FxBuildHasher)
    }

    /// Creates a map with an explicit max load factor.
    ///
    /// Any positive finite factor is accepted; chains tolerate loads above
    /// 1.0, they just get longer.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if `max_load_factor` is not a positive finite number.
    pub fn try_with_capacity_and_load_factor(
        capacity: usize,
        max_load_factor: f64,
    ) -> Result<Self, ConfigError> {
        if !max_load_factor.is_finite() || max_load_factor <= 0.0 {
            return Err(ConfigError::new(format!(
                "max load factor must be positive and finite, got {max_load_factor}"
            )));
        }
        let mut map = Self::with_capacity(capacity);
        map.max_load_factor = max_load_factor;
        Ok(map)
    }
}

impl<K: Hash + Eq> Default for ChainedCounterMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, S: BuildHasher> ChainedCounterMap<K, S> {
    /// Creates a map with at least `capacity` slots and a custom hasher.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let slots = next_prime(capacity);
        Self {
            table: (0..slots).map(|_| Vec::new()).collect(),
            len: 0,
            max_load_factor: 1.0,
            hasher,
            comparisons: MetricsCell::new(),
            rehashes: 0,
        }
    }

    /// Slot index for `key` under the current table size.
    pub fn bucket_of(&self, key: &K) -> usize {
        (self.hasher.hash_one(key) as usize) % self.table.len()
    }

    /// Number of slots in the table.
    pub fn bucket_count(&self) -> usize {
        self.table.len()
    }

    /// Chain length of slot `index`, or `None` when out of range.
    pub fn bucket_len(&self, index: usize) -> Option<usize> {
        self.table.get(index).map(Vec::len)
    }

    /// Entries divided by slots.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.table.len() as f64
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Changes the growth threshold and rehashes immediately if the current
    /// load already exceeds it.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if `factor` is not a positive finite number.
    pub fn set_max_load_factor(&mut self, factor: f64) -> Result<(), ConfigError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConfigError::new(format!(
                "max load factor must be positive and finite, got {factor}"
            )));
        }
        self.max_load_factor = factor;
        self.reserve(self.len);
        Ok(())
    }

    /// Grows the table so `entries` total pairs fit without crossing the
    /// max load factor.
    pub fn reserve(&mut self, entries: usize) {
        let needed = (entries as f64 / self.max_load_factor).ceil() as usize;
        if needed > self.table.len() {
            self.rehash(needed);
        }
    }

    /// Inserts `(key, value)` if `key` is absent; returns `false` and leaves
    /// the stored value untouched on a duplicate key.
    pub fn add(&mut self, key: K, value: i64) -> bool {
        if self.locate(&key).is_some() {
            return false;
        }
        self.grow_if_needed();
        let bucket = self.bucket_of(&key);
        self.table[bucket].push((key, value));
        self.len += 1;
        true
    }

    /// Rehashes before the insert that would reach the threshold, so the
    /// load factor stays strictly below it at all times.
    fn grow_if_needed(&mut self) {
        if (self.len + 1) as f64 / self.table.len() as f64 >= self.max_load_factor {
            self.rehash(2 * self.table.len());
        }
    }

    /// Rebuilds the table with at least `min_slots` slots (raised to a
    /// prime). Shrinking is never performed; a rebuild counts once toward
    /// the rehash total regardless of entry count.
    fn rehash(&mut self, min_slots: usize) {
        let slots = next_prime(min_slots);
        if slots <= self.table.len() {
            return;
        }
        let old = std::mem::replace(&mut self.table, (0..slots).map(|_| Vec::new()).collect());
        for (key, value) in old.into_iter().flatten() {
            let bucket = (self.hasher.hash_one(&key) as usize) % self.table.len();
            self.table[bucket].push((key, value));
        }
        self.rehashes += 1;
    }

    /// Finds `key`, ticking the comparison counter once per equality test.
    fn locate(&self, key: &K) -> Option<(usize, usize)> {
        let bucket = self.bucket_of(key);
        for (pos, (stored, _)) in self.table[bucket].iter().enumerate() {
            self.comparisons.incr();
            if stored == key {
                return Some((bucket, pos));
            }
        }
        None
    }

    /// Total table rebuilds since construction or the last clear.
    pub fn rehashes(&self) -> u64 {
        self.rehashes
    }

    /// Verifies that every pair sits in the slot its hash selects, that the
    /// entry count matches the chain lengths, and that the load factor is
    /// within the configured bound.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut counted = 0;
        for (slot, chain) in self.table.iter().enumerate() {
            for (key, _) in chain {
                if self.bucket_of(key) != slot {
                    return Err(InvariantError::new(format!(
                        "entry in slot {slot} hashes elsewhere"
                    )));
                }
                counted += 1;
            }
        }
        if counted != self.len {
            return Err(InvariantError::new(format!(
                "len {} does not match chain total {counted}",
                self.len
            )));
        }
        if self.load_factor() > self.max_load_factor {
            return Err(InvariantError::new(format!(
                "load factor {} exceeds bound {}",
                self.load_factor(),
                self.max_load_factor
            )));
        }
        Ok(())
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> CounterMap<K> for ChainedCounterMap<K, S> {
    fn counter(&mut self, key: K) -> &mut i64 {
        if self.locate(&key).is_none() {
            self.add(key.clone(), 0);
        }
        // Re-locate: the insert may have rehashed the table.
        let (bucket, pos) = self.locate(&key).expect("key just inserted");
        &mut self.table[bucket][pos].1
    }

    fn get(&self, key: &K) -> Option<&i64> {
        self.locate(key).map(|(b, p)| &self.table[b][p].1)
    }

    fn remove(&mut self, key: &K) -> bool {
        match self.locate(key) {
            Some((bucket, pos)) => {
                self.table[bucket].swap_remove(pos);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        for chain in &mut self.table {
            chain.clear();
        }
        self.len = 0;
        self.comparisons.reset();
        self.rehashes = 0;
    }

    fn by_frequency(&self) -> Vec<(K, i64)> {
        let mut out: Vec<(K, i64)> = self
            .table
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        out.sort_unstable_by(|a, b| b.1.cmp(&a.1));
        out
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> InstrumentedMap<K> for ChainedCounterMap<K, S> {
    fn comparisons(&self) -> u64 {
        self.comparisons.get()
    }

    fn structural_ops(&self) -> u64 {
        self.rehashes
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> MetricsSnapshotProvider for ChainedCounterMap<K, S> {
    fn snapshot(&self) -> MapMetricsSnapshot {
        MapMetricsSnapshot {
            comparisons: self.comparisons.get(),
            rotations: 0,
            rehashes: self.rehashes,
            len: self.len,
            table_size: self.table.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod correctness {
        use super::*;

        mod basic_behavior {
            use super::*;

            #[test]
            fn new_map_uses_prime_default_size() {
                let map: ChainedCounterMap<u64> = ChainedCounterMap::new();
                assert_eq!(map.bucket_count(), 19);
                assert!(map.is_empty());
                map.check_invariants().unwrap();
            }

            #[test]
            fn capacity_is_raised_to_a_prime() {
                let map: ChainedCounterMap<u64> = ChainedCounterMap::with_capacity(20);
                assert_eq!(map.bucket_count(), 23);
            }

            #[test]
            fn add_and_get() {
                let mut map = ChainedCounterMap::new();
                assert!(map.add("alpha", 2));
                assert_eq!(map.get(&"alpha"), Some(&2));
                assert_eq!(map.get(&"beta"), None);
            }

            #[test]
            fn duplicate_add_returns_false() {
                let mut map = ChainedCounterMap::new();
                assert!(map.add("k", 7));
                assert!(!map.add("k", 99));
                assert_eq!(map.get(&"k"), Some(&7));
                assert_eq!(map.len(), 1);
            }

            #[test]
            fn counter_example_scenario() {
                let mut map = ChainedCounterMap::new();
                for word in ["a", "b", "c", "b", "a", "a"] {
                    *map.counter(word) += 1;
                }
                assert_eq!(map.by_frequency(), vec![("a", 3), ("b", 2), ("c", 1)]);
            }

            #[test]
            fn remove_then_miss() {
                let mut map = ChainedCounterMap::new();
                map.add(42u64, 1);
                assert!(map.remove(&42));
                assert!(!map.remove(&42));
                assert!(map.get(&42).is_none());
                map.check_invariants().unwrap();
            }

            #[test]
            fn bucket_len_out_of_range_is_none() {
                let map: ChainedCounterMap<u64> = ChainedCounterMap::new();
                assert_eq!(map.bucket_len(0), Some(0));
                assert_eq!(map.bucket_len(19), None);
            }

            #[test]
            fn clear_keeps_table_size_and_resets_counters() {
                let mut map = ChainedCounterMap::new();
                for k in 0..100u64 {
                    *map.counter(k) += 1;
                }
                let slots = map.bucket_count();
                map.clear();
                assert!(map.is_empty());
                assert_eq!(map.bucket_count(), slots);
                assert_eq!(map.comparisons(), 0);
                assert_eq!(map.rehashes(), 0);
            }
        }

        mod growth {
            use super::*;

            #[test]
            fn rehash_preserves_all_pairs() {
                let mut map = ChainedCounterMap::with_capacity(3);
                for k in 0..200u64 {
                    map.add(k, k as i64);
                }
                assert!(map.rehashes() > 0);
                for k in 0..200u64 {
                    assert_eq!(map.get(&k), Some(&(k as i64)));
                }
                map.check_invariants().unwrap();
            }

            #[test]
            fn load_factor_stays_below_bound() {
                let mut map = ChainedCounterMap::with_capacity(3);
                for k in 0..500u64 {
                    map.add(k, 0);
                    assert!(map.load_factor() < map.max_load_factor());
                }
            }

            #[test]
            fn growth_doubles_to_a_prime() {
                let mut map = ChainedCounterMap::with_capacity(3);
                assert_eq!(map.bucket_count(), 3);
                map.add(1u64, 0);
                map.add(2, 0);
                map.add(3, 0);
                // Third insert trips the factor-1.0 bound: next_prime(6) = 7.
                assert_eq!(map.bucket_count(), 7);
            }

            #[test]
            fn reserve_grows_once_up_front() {
                let mut map: ChainedCounterMap<u64> = ChainedCounterMap::new();
                map.reserve(1000);
                let slots = map.bucket_count();
                assert!(slots >= 1000);
                for k in 0..900u64 {
                    map.add(k, 0);
                }
                assert_eq!(map.bucket_count(), slots);
            }

            #[test]
            fn lowering_the_bound_rehashes_immediately() {
                let mut map = ChainedCounterMap::try_with_capacity_and_load_factor(101, 4.0)
                    .unwrap();
                for k in 0..300u64 {
                    map.add(k, 0);
                }
                assert_eq!(map.bucket_count(), 101);
                map.set_max_load_factor(0.5).unwrap();
                assert!(map.load_factor() <= 0.5);
                map.check_invariants().unwrap();
            }
        }

        mod configuration {
            use super::*;

            #[test]
            fn load_factor_above_one_is_accepted() {
                let map: ChainedCounterMap<u64> =
                    ChainedCounterMap::try_with_capacity_and_load_factor(19, 2.5).unwrap();
                assert_eq!(map.max_load_factor(), 2.5);
            }

            #[test]
            fn non_positive_load_factor_is_rejected() {
                for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
                    let err = ChainedCounterMap::<u64>::try_with_capacity_and_load_factor(19, bad)
                        .unwrap_err();
                    assert!(err.to_string().contains("load factor"));
                }
            }
        }
    }

    mod instrumentation {
        use super::*;

        #[test]
        fn comparisons_tick_per_equality_test() {
            let mut map = ChainedCounterMap::new();
            map.add("a", 1);
            let before = map.comparisons();
            assert!(map.contains(&"a"));
            assert!(map.comparisons() > before);
        }

        #[test]
        fn snapshot_reports_rehashes_and_table_size() {
            let mut map = ChainedCounterMap::with_capacity(3);
            for k in 0..50u64 {
                map.add(k, 0);
            }
            let snap = map.snapshot();
            assert_eq!(snap.rehashes, map.rehashes());
            assert_eq!(snap.table_size, map.bucket_count());
            assert_eq!(snap.rotations, 0);
            assert_eq!(snap.len, 50);
        }
    }
}
