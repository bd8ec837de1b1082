//! # Open-Addressing Counter Map
//!
//! Linear-probing hash table mapping keys to `i64` counters. Every entry
//! lives directly in the slot array; collisions walk forward one slot at a
//! time, wrapping at the end.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────┐
//!   │              OpenAddressingCounterMap<K, S>                │
//!   │                                                            │
//!   │   slots: Vec<Slot<K>>             (prime slot count)       │
//!   │                                                            │
//!   │   [0] Occupied { "the", 4 }                                │
//!   │   [1] Occupied { "kit", 1 }   ← probed past slot 0         │
//!   │   [2] Tombstone               ← removed, probes continue   │
//!   │   [3] Empty                   ← probes stop here           │
//!   │    ⋮                                                       │
//!   │                                                            │
//!   │   grows to next_prime(2 * slots) before the insert that    │
//!   │   would reach max_load_factor (default 0.7)                │
//!   └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//!
//! - A lookup probes from `hash % slots`, skipping tombstones, and stops at
//!   the first `Empty` slot. Removal therefore leaves a `Tombstone` rather
//!   than an `Empty`, so later keys in the probe run stay reachable.
//! - The load factor (occupied slots over total slots) stays strictly below
//!   the configured bound, which must be inside `(0, 1)`.
//! - Rebuilding the table drops all tombstones.

use std::hash::{BuildHasher, Hash};

use rustc_hash::FxBuildHasher;

use crate::ds::next_prime;
use crate::error::{ConfigError, InvariantError};
use crate::metrics::{MapMetricsSnapshot, MetricsCell, MetricsSnapshotProvider};
use crate::traits::{CounterMap, InstrumentedMap};

/// Slot count the zero-argument constructor asks for (raised to a prime).
const DEFAULT_CAPACITY: usize = 101;

const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.7;

#[derive(Debug)]
enum Slot<K> {
    Empty,
    Tombstone,
    Occupied { key: K, value: i64 },
}

/// Linear-probing hash counter map with tombstone deletion.
///
/// # Example
///
/// ```
/// use tallykit::traits::CounterMap;
/// use tallykit::map::open_addressing::OpenAddressingCounterMap;
///
/// let mut map: OpenAddressingCounterMap<String> = OpenAddressingCounterMap::new();
/// *map.counter("tally".to_string()) += 1;
/// *map.counter("tally".to_string()) += 1;
/// assert_eq!(map.get(&"tally".to_string()), Some(&2));
/// ```
pub struct OpenAddressingCounterMap<K, S = FxBuildHasher> {
    slots: Vec<Slot<K>>,
    len: usize,
    max_load_factor: f64,
    hasher: S,
    comparisons: MetricsCell,
    rehashes: u64,
}

// Manual impl: deriving Debug would bound `S: Debug`, which FxBuildHasher
// does not satisfy. The hasher carries no state worth printing.
impl<K: std::fmt::Debug, S> std::fmt::Debug for OpenAddressingCounterMap<K, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAddressingCounterMap")
            .field("slots", &self.slots)
            .field("len", &self.len)
            .field("max_load_factor", &self.max_load_factor)
            .field("comparisons", &self.comparisons)
            .field("rehashes", &self.rehashes)
            .finish_non_exhaustive()
    }
}

impl<K: Hash + Eq> OpenAddressingCounterMap<K> {
    /// Creates a map with the default slot count (101) and a max load
    /// factor of 0.7.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a map with at least `capacity` slots (raised to a prime).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FxBuildHasher)
    }

    /// Creates a map with an explicit max load factor.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] unless `0 < max_load_factor < 1`; an open-addressed
    /// table saturates at full occupancy, so a bound of 1 or more would let
    /// inserts probe forever.
    pub fn try_with_capacity_and_load_factor(
        capacity: usize,
        max_load_factor: f64,
    ) -> Result<Self, ConfigError> {
        if !(max_load_factor > 0.0 && max_load_factor < 1.0) {
            return Err(ConfigError::new(format!(
                "max load factor must be in (0, 1), got {max_load_factor}"
            )));
        }
        let mut map = Self::with_capacity(capacity);
        map.max_load_factor = max_load_factor;
        Ok(map)
    }
}

impl<K: Hash + Eq> Default for OpenAddressingCounterMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, S: BuildHasher> OpenAddressingCounterMap<K, S> {
    /// Creates a map with at least `capacity` slots and a custom hasher.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let slots = next_prime(capacity);
        Self {
            slots: (0..slots).map(|_| Slot::Empty).collect(),
            len: 0,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            hasher,
            comparisons: MetricsCell::new(),
            rehashes: 0,
        }
    }

    /// Number of slots in the table.
    pub fn table_size(&self) -> usize {
        self.slots.len()
    }

    /// Occupied slots divided by total slots (tombstones excluded).
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.slots.len() as f64
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Probe start for `key` under the current table size.
    fn home_slot(&self, key: &K) -> usize {
        (self.hasher.hash_one(key) as usize) % self.slots.len()
    }

    /// Inserts `(key, value)`. A matching occupied key is overwritten in
    /// place; otherwise the first reusable slot (empty or tombstone) on the
    /// probe path takes the pair. Returns `false` only if a full probe
    /// cycle finds no slot, which the growth rule makes unreachable.
    pub fn insert(&mut self, key: K, value: i64) -> bool {
        // Overwrite never grows; probe for the key first.
        if let Some(idx) = self.locate(&key) {
            self.slots[idx] = Slot::Occupied { key, value };
            return true;
        }
        self.grow_if_needed();
        let home = self.home_slot(&key);
        for step in 0..self.slots.len() {
            let idx = (home + step) % self.slots.len();
            match self.slots[idx] {
                Slot::Empty | Slot::Tombstone => {
                    self.slots[idx] = Slot::Occupied { key, value };
                    self.len += 1;
                    return true;
                }
                Slot::Occupied { .. } => {}
            }
        }
        false
    }

    /// Rehashes before the insert that would reach the threshold, so the
    /// load factor stays strictly below it at all times.
    fn grow_if_needed(&mut self) {
        if (self.len + 1) as f64 / self.slots.len() as f64 >= self.max_load_factor {
            self.rehash(2 * self.slots.len());
        }
    }

    /// Rebuilds the table with at least `min_slots` slots (raised to a
    /// prime), discarding tombstones. Shrinking is never performed.
    fn rehash(&mut self, min_slots: usize) {
        let slots = next_prime(min_slots);
        if slots <= self.slots.len() {
            return;
        }
        let old = std::mem::replace(
            &mut self.slots,
            (0..slots).map(|_| Slot::Empty).collect(),
        );
        for slot in old {
            if let Slot::Occupied { key, value } = slot {
                let home = (self.hasher.hash_one(&key) as usize) % self.slots.len();
                for step in 0..self.slots.len() {
                    let idx = (home + step) % self.slots.len();
                    if matches!(self.slots[idx], Slot::Empty) {
                        self.slots[idx] = Slot::Occupied { key, value };
                        break;
                    }
                }
            }
        }
        self.rehashes += 1;
    }

    /// Probes for `key`: tombstones are walked over, the first empty slot
    /// ends the search. Ticks the comparison counter once per key equality
    /// test against an occupied slot.
    fn locate(&self, key: &K) -> Option<usize> {
        let home = self.home_slot(key);
        for step in 0..self.slots.len() {
            let idx = (home + step) % self.slots.len();
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Occupied { key: stored, .. } => {
                    self.comparisons.incr();
                    if stored == key {
                        return Some(idx);
                    }
                }
            }
        }
        None
    }

    /// Total table rebuilds since construction or the last clear.
    pub fn rehashes(&self) -> u64 {
        self.rehashes
    }

    /// Verifies that every occupied key is reachable from its home slot
    /// without crossing an empty slot, that the occupancy count matches,
    /// and that the load factor is within the configured bound.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut occupied = 0;
        for (idx, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied { key, .. } = slot {
                occupied += 1;
                let home = self.home_slot(key);
                let run = if idx >= home {
                    idx - home
                } else {
                    idx + self.slots.len() - home
                };
                for step in 0..run {
                    let probe = (home + step) % self.slots.len();
                    if matches!(self.slots[probe], Slot::Empty) {
                        return Err(InvariantError::new(format!(
                            "key at slot {idx} is unreachable past empty slot {probe}"
                        )));
                    }
                }
            }
        }
        if occupied != self.len {
            return Err(InvariantError::new(format!(
                "len {} does not match occupied slots {occupied}",
                self.len
            )));
        }
        if self.load_factor() >= self.max_load_factor {
            return Err(InvariantError::new(format!(
                "load factor {} reached bound {}",
                self.load_factor(),
                self.max_load_factor
            )));
        }
        Ok(())
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> CounterMap<K> for OpenAddressingCounterMap<K, S> {
    fn counter(&mut self, key: K) -> &mut i64 {
        if self.locate(&key).is_none() {
            let inserted = self.insert(key.clone(), 0);
            assert!(inserted, "probe cycle exhausted below the load bound");
        }
        // Re-locate: the insert may have rehashed the table.
        let idx = self.locate(&key).expect("key just inserted");
        match &mut self.slots[idx] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("located slot is occupied"),
        }
    }

    fn get(&self, key: &K) -> Option<&i64> {
        self.locate(key).map(|idx| match &self.slots[idx] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!("located slot is occupied"),
        })
    }

    fn remove(&mut self, key: &K) -> bool {
        match self.locate(key) {
            Some(idx) => {
                self.slots[idx] = Slot::Tombstone;
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
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.len = 0;
        self.comparisons.reset();
        self.rehashes = 0;
    }

    fn by_frequency(&self) -> Vec<(K, i64)> {
        let mut out: Vec<(K, i64)> = self
            .slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Occupied { key, value } => Some((key.clone(), *value)),
                _ => None,
            })
            .collect();
        out.sort_unstable_by(|a, b| b.1.cmp(&a.1));
        out
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> InstrumentedMap<K> for OpenAddressingCounterMap<K, S> {
    fn comparisons(&self) -> u64 {
        self.comparisons.get()
    }

    fn structural_ops(&self) -> u64 {
        self.rehashes
    }
}

impl<K: Hash + Eq + Clone, S: BuildHasher> MetricsSnapshotProvider
    for OpenAddressingCounterMap<K, S>
{
    fn snapshot(&self) -> MapMetricsSnapshot {
        MapMetricsSnapshot {
            comparisons: self.comparisons.get(),
            rotations: 0,
            rehashes: self.rehashes,
            len: self.len,
            table_size: self.slots.len(),
        }
    }
}
