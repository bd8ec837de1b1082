//! # Counter-Map Trait Hierarchy
//!
//! This module defines the trait hierarchy shared by the four container
//! implementations (AVL tree, red-black tree, chained hash map,
//! open-addressed hash map), providing a uniform interface for the word-count
//! driver and the benchmark harness while letting each structure keep its own
//! native insertion semantics.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌─────────────────────────────────────────────┐
//!                 │              CounterMap<K>                  │
//!                 │                                             │
//!                 │  counter(&mut, K) → &mut i64                │
//!                 │  get(&, &K) → Option<&i64>                  │
//!                 │  contains(&, &K) → bool                     │
//!                 │  remove(&mut, &K) → bool                    │
//!                 │  len(&) → usize      is_empty(&) → bool     │
//!                 │  clear(&mut)                                │
//!                 │  by_frequency(&) → Vec<(K, i64)>            │
//!                 └──────────────────────┬──────────────────────┘
//!                                        │
//!                                        ▼
//!                 ┌─────────────────────────────────────────────┐
//!                 │          InstrumentedMap<K>                 │
//!                 │                                             │
//!                 │  comparisons(&) → u64                       │
//!                 │  structural_ops(&) → u64                    │
//!                 └─────────────────────────────────────────────┘
//! ```
//!
//! ## Design Notes
//!
//! - **No raw insert on the trait.** The four implementations deliberately
//!   disagree on duplicate-key insertion (the trees ignore the new value, the
//!   chained table rejects it, the open-addressed table overwrites it), so
//!   raw insertion stays an inherent method on each type. Increment workflows
//!   go through [`counter`](CounterMap::counter), which behaves identically
//!   everywhere: get-or-insert-default, then let the caller mutate.
//! - **`structural_ops`** means rotations for the tree family and rehashes
//!   for the hash family. Comparison counts tick once per key ordering
//!   comparison (trees) or key equality test (hash maps).
//!
//! | Implementation               | `structural_ops` | Lookup        |
//! |------------------------------|------------------|---------------|
//! | `AvlCounterMap`              | rotations        | O(log n)      |
//! | `RedBlackCounterMap`         | rotations        | O(log n)      |
//! | `ChainedCounterMap`          | rehashes         | O(1) expected |
//! | `OpenAddressingCounterMap`   | rehashes         | O(1) expected |

/// Uniform key→counter contract shared by all four containers.
///
/// The value type is fixed at `i64`; the driver instantiates `K = String`.
/// Mutable references returned by [`counter`](Self::counter) are invalidated
/// by the next structural mutation (Rust's borrow rules enforce this).
///
/// # Example
///
/// ```
/// use tallykit::traits::CounterMap;
/// use tallykit::map::avl::AvlCounterMap;
///
/// fn tally<M: CounterMap<String>>(map: &mut M, words: &[&str]) {
///     for w in words {
///         *map.counter(w.to_string()) += 1;
///     }
/// }
///
/// let mut map = AvlCounterMap::new();
/// tally(&mut map, &["a", "b", "c", "b", "a", "a"]);
/// assert_eq!(map.get(&"a".to_string()), Some(&3));
/// assert_eq!(map.len(), 3);
/// ```
pub trait CounterMap<K> {
    /// Returns a mutable reference to the counter for `key`, inserting a
    /// zero-valued entry if the key is absent.
    ///
    /// This is the increment-or-insert accessor: it never fails, converting
    /// a miss into an insertion instead.
    ///
    /// # Example
    ///
    /// ```
    /// use tallykit::traits::CounterMap;
    /// use tallykit::map::chained::ChainedCounterMap;
    ///
    /// let mut map: ChainedCounterMap<&str> = ChainedCounterMap::new();
    /// *map.counter("word") += 1;
    /// *map.counter("word") += 1;
    /// assert_eq!(map.get(&"word"), Some(&2));
    /// ```
    fn counter(&mut self, key: K) -> &mut i64;

    /// Returns a reference to the counter for `key`, or `None` if absent.
    ///
    /// Unlike [`counter`](Self::counter), this never inserts.
    fn get(&self, key: &K) -> Option<&i64>;

    /// Returns `true` if `key` is present.
    fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes the entry for `key`, returning `true` iff it was present.
    ///
    /// Removing from an empty map is a no-op returning `false`.
    fn remove(&mut self, key: &K) -> bool;

    /// Returns the number of distinct keys currently present.
    fn len(&self) -> usize;

    /// Returns `true` if the map contains no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries and resets the instrumentation counters.
    fn clear(&mut self);

    /// Exports all `(key, counter)` pairs sorted by counter descending.
    ///
    /// Recomputed on every call. The order of pairs with equal counters is
    /// unspecified (the sort is unstable).
    ///
    /// # Example
    ///
    /// ```
    /// use tallykit::traits::CounterMap;
    /// use tallykit::map::red_black::RedBlackCounterMap;
    ///
    /// let mut map: RedBlackCounterMap<&str> = RedBlackCounterMap::new();
    /// *map.counter("a") += 3;
    /// *map.counter("b") += 1;
    /// let ranked = map.by_frequency();
    /// assert_eq!(ranked, vec![("a", 3), ("b", 1)]);
    /// ```
    fn by_frequency(&self) -> Vec<(K, i64)>
    where
        K: Clone;
}

/// Per-instance instrumentation shared by all four containers.
///
/// Counters are plain process state: created with the map, reset only by
/// [`clear`](CounterMap::clear), never synchronized (the whole library is
/// single-threaded by contract).
///
/// # Example
///
/// ```
/// use tallykit::traits::{CounterMap, InstrumentedMap};
/// use tallykit::map::avl::AvlCounterMap;
///
/// let mut map: AvlCounterMap<u32> = AvlCounterMap::new();
/// for k in 0..100 {
///     *map.counter(k) += 1;
/// }
/// assert!(map.comparisons() > 0);
/// assert!(map.structural_ops() > 0); // ascending inserts force rotations
/// ```
pub trait InstrumentedMap<K>: CounterMap<K> {
    /// Total key comparisons performed since construction or the last clear.
    fn comparisons(&self) -> u64;

    /// Total structural operations: rotations for the tree implementations,
    /// rehashes for the hash-map implementations.
    fn structural_ops(&self) -> u64;
}
