//! # AVL Counter Map
//!
//! Height-balanced binary search tree mapping keys to `i64` counters.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────┐
//!   │                   AvlCounterMap<K>                        │
//!   │                                                           │
//!   │   root: Option<Box<AvlNode<K>>>                           │
//!   │                     │                                     │
//!   │                     ▼                                     │
//!   │                ┌─────────┐ height 2                       │
//!   │                │ "the":4 │                                │
//!   │                └───┬─┬───┘                                │
//!   │            ┌───────┘ └───────┐                            │
//!   │            ▼                 ▼                            │
//!   │       ┌─────────┐       ┌─────────┐  height 1             │
//!   │       │ "box":1 │       │ "who":2 │                       │
//!   │       └─────────┘       └─────────┘                       │
//!   │                                                           │
//!   │   Invariant: |height(right) − height(left)| ≤ 1 at every  │
//!   │   node; height(absent child) = −1.                        │
//!   └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Method          | Complexity | Notes                                   |
//! |-----------------|------------|-----------------------------------------|
//! | `insert(k, v)`  | O(log n)   | insert-if-absent; duplicate is a no-op  |
//! | `counter(k)`    | O(log n)   | get-or-insert-default, mutable ref      |
//! | `get` / `contains` | O(log n)| never inserts                           |
//! | `remove(&k)`    | O(log n)   | successor-copy deletion                 |
//! | `by_frequency`  | O(n log n) | in-order walk + unstable sort by value  |
//!
//! Rebalancing on insert picks the rotation case from the inserted key's
//! position relative to the heavy child; rebalancing on delete picks it from
//! the heavy child's own balance factor (there is no inserted key to compare
//! against). A double rotation counts as two structural operations.

use crate::error::InvariantError;
use crate::metrics::{MapMetricsSnapshot, MetricsCell, MetricsSnapshotProvider};
use crate::traits::{CounterMap, InstrumentedMap};

type Link<K> = Option<Box<AvlNode<K>>>;

#[derive(Debug)]
struct AvlNode<K> {
    key: K,
    value: i64,
    height: i32,
    left: Link<K>,
    right: Link<K>,
}

impl<K> AvlNode<K> {
    fn new(key: K, value: i64) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            height: 0,
            left: None,
            right: None,
        })
    }
}

fn height<K>(link: &Link<K>) -> i32 {
    match link {
        Some(node) => node.height,
        None => -1,
    }
}

/// balance factor = height(right) − height(left)
fn balance<K>(node: &AvlNode<K>) -> i32 {
    height(&node.right) - height(&node.left)
}

fn update_height<K>(node: &mut AvlNode<K>) {
    node.height = 1 + height(&node.left).max(height(&node.right));
}

/// AVL-balanced ordered counter map.
///
/// # Example
///
/// ```
/// use tallykit::traits::{CounterMap, InstrumentedMap};
/// use tallykit::map::avl::AvlCounterMap;
///
/// let mut map: AvlCounterMap<&str> = AvlCounterMap::new();
/// for word in ["a", "b", "c", "b", "a", "a"] {
///     *map.counter(word) += 1;
/// }
///
/// assert_eq!(map.len(), 3);
/// assert_eq!(map.by_frequency(), vec![("a", 3), ("b", 2), ("c", 1)]);
/// assert_eq!(map.structural_ops(), map.rotations());
/// ```
#[derive(Debug)]
pub struct AvlCounterMap<K> {
    root: Link<K>,
    len: usize,
    comparisons: MetricsCell,
    rotations: u64,
}

impl<K: Ord> Default for AvlCounterMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> AvlCounterMap<K> {
    /// Creates an empty tree. Trees take no construction-time configuration.
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            comparisons: MetricsCell::new(),
            rotations: 0,
        }
    }

    /// Inserts `(key, value)` if `key` is absent; a duplicate key is a
    /// no-op that does NOT overwrite the stored value.
    ///
    /// Counter workflows should use [`counter`](CounterMap::counter) instead
    /// of `insert`, precisely because of the no-overwrite semantics.
    ///
    /// # Example
    ///
    /// ```
    /// use tallykit::traits::CounterMap;
    /// use tallykit::map::avl::AvlCounterMap;
    ///
    /// let mut map = AvlCounterMap::new();
    /// assert!(map.insert("k", 1));
    /// assert!(!map.insert("k", 99)); // duplicate: value stays 1
    /// assert_eq!(map.get(&"k"), Some(&1));
    /// ```
    pub fn insert(&mut self, key: K, value: i64) -> bool {
        let before = self.len;
        let root = self.root.take();
        self.root = self.insert_rec(root, key, value);
        self.len > before
    }

    fn insert_rec(&mut self, link: Link<K>, key: K, value: i64) -> Link<K> {
        let mut node = match link {
            Some(node) => node,
            None => {
                self.len += 1;
                return Some(AvlNode::new(key, value));
            }
        };

        self.comparisons.incr();
        match key.cmp(&node.key) {
            std::cmp::Ordering::Less => {
                let left = node.left.take();
                node.left = self.insert_rec(left, key, value);
                Some(self.rebalance_insert(node))
            }
            std::cmp::Ordering::Greater => {
                let right = node.right.take();
                node.right = self.insert_rec(right, key, value);
                Some(self.rebalance_insert(node))
            }
            // Key already present: the candidate value is discarded.
            std::cmp::Ordering::Equal => Some(node),
        }
    }

    /// Restores the AVL bound on the way back up from an insertion.
    ///
    /// The classical rule compares the inserted key against the heavy child's
    /// key to pick single vs. double rotation; after an insertion exactly one
    /// grandchild subtree has grown, so the heavy child's balance sign
    /// carries the same information without retaining the key.
    fn rebalance_insert(&mut self, mut node: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
        update_height(&mut node);
        let bal = balance(&node);

        if bal < -1 {
            // Left-heavy: inserted key went into the left subtree.
            let left_bal = balance(node.left.as_ref().expect("left child missing"));
            if left_bal <= 0 {
                // key < left.key: single right rotation
                return self.rotate_right(node);
            }
            // key > left.key: left-rotate the left child, then right-rotate
            let left = node.left.take().expect("left child missing");
            node.left = Some(self.rotate_left(left));
            return self.rotate_right(node);
        }

        if bal > 1 {
            let right_bal = balance(node.right.as_ref().expect("right child missing"));
            if right_bal >= 0 {
                return self.rotate_left(node);
            }
            let right = node.right.take().expect("right child missing");
            node.right = Some(self.rotate_right(right));
            return self.rotate_left(node);
        }

        node
    }

    /// Removes `key` if present. Returns `true` iff a node was deleted.
    fn remove_key(&mut self, key: &K) -> bool {
        let before = self.len;
        let root = self.root.take();
        self.root = self.remove_rec(root, key);
        self.len < before
    }

    fn remove_rec(&mut self, link: Link<K>, key: &K) -> Link<K> {
        let mut node = link?;

        self.comparisons.incr();
        match key.cmp(&node.key) {
            std::cmp::Ordering::Less => {
                let left = node.left.take();
                node.left = self.remove_rec(left, key);
            }
            std::cmp::Ordering::Greater => {
                let right = node.right.take();
                node.right = self.remove_rec(right, key);
            }
            std::cmp::Ordering::Equal => {
                self.len -= 1;
                match node.right.take() {
                    // No right child: splice in the left subtree.
                    None => return node.left.take(),
                    // Replace this node's pair with its in-order successor
                    // (minimum of the right subtree) and delete that node.
                    Some(right) => {
                        let (right, min_key, min_value) = self.take_min(right);
                        node.key = min_key;
                        node.value = min_value;
                        node.right = right;
                    }
                }
            }
        }

        Some(self.rebalance_remove(node))
    }

    /// Detaches the minimum node of `subtree`, rebalancing the walked path.
    fn take_min(&mut self, mut node: Box<AvlNode<K>>) -> (Link<K>, K, i64) {
        match node.left.take() {
            None => (node.right.take(), node.key, node.value),
            Some(left) => {
                let (left, key, value) = self.take_min(left);
                node.left = left;
                (Some(self.rebalance_remove(node)), key, value)
            }
        }
    }

    /// Deletion rebalance: the rotation case is chosen from the heavy
    /// child's balance factor, not from any key.
    fn rebalance_remove(&mut self, mut node: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
        let bal = balance(&node);

        if bal > 1 {
            let right_bal = balance(node.right.as_ref().expect("right child missing"));
            if right_bal >= 0 {
                return self.rotate_left(node);
            }
            let right = node.right.take().expect("right child missing");
            node.right = Some(self.rotate_right(right));
            return self.rotate_left(node);
        }

        if bal < -1 {
            let left_bal = balance(node.left.as_ref().expect("left child missing"));
            if left_bal <= 0 {
                return self.rotate_right(node);
            }
            let left = node.left.take().expect("left child missing");
            node.left = Some(self.rotate_left(left));
            return self.rotate_right(node);
        }

        update_height(&mut node);
        node
    }

    /// Left rotation. Only the two nodes directly involved are touched;
    /// heights propagate upward as the recursion unwinds.
    fn rotate_left(&mut self, mut node: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
        self.rotations += 1;
        let mut pivot = node.right.take().expect("rotate_left without right child");
        node.right = pivot.left.take();
        update_height(&mut node);
        pivot.left = Some(node);
        update_height(&mut pivot);
        pivot
    }

    fn rotate_right(&mut self, mut node: Box<AvlNode<K>>) -> Box<AvlNode<K>> {
        self.rotations += 1;
        let mut pivot = node.left.take().expect("rotate_right without left child");
        node.left = pivot.right.take();
        update_height(&mut node);
        pivot.right = Some(node);
        update_height(&mut pivot);
        pivot
    }

    fn find(&self, key: &K) -> Option<&AvlNode<K>> {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            self.comparisons.incr();
            cur = match key.cmp(&node.key) {
                std::cmp::Ordering::Less => node.left.as_deref(),
                std::cmp::Ordering::Greater => node.right.as_deref(),
                std::cmp::Ordering::Equal => return Some(node),
            };
        }
        None
    }

    fn find_mut(&mut self, key: &K) -> Option<&mut AvlNode<K>> {
        let comparisons = &self.comparisons;
        let mut cur = self.root.as_deref_mut();
        while let Some(node) = cur {
            comparisons.incr();
            cur = match key.cmp(&node.key) {
                std::cmp::Ordering::Less => node.left.as_deref_mut(),
                std::cmp::Ordering::Greater => node.right.as_deref_mut(),
                std::cmp::Ordering::Equal => return Some(node),
            };
        }
        None
    }

    /// Height of the whole tree (−1 when empty).
    pub fn tree_height(&self) -> i32 {
        height(&self.root)
    }

    /// Total rotations performed since construction or the last clear.
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Verifies the BST ordering, stored heights, and the AVL balance bound.
    ///
    /// Used by the randomized tests after every mutation.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        fn walk<K: Ord>(
            link: &Link<K>,
            lo: Option<&K>,
            hi: Option<&K>,
        ) -> Result<i32, InvariantError> {
            let node = match link {
                Some(node) => node,
                None => return Ok(-1),
            };
            if let Some(lo) = lo {
                if node.key <= *lo {
                    return Err(InvariantError::new("BST ordering violated (left bound)"));
                }
            }
            if let Some(hi) = hi {
                if node.key >= *hi {
                    return Err(InvariantError::new("BST ordering violated (right bound)"));
                }
            }
            let lh = walk(&node.left, lo, Some(&node.key))?;
            let rh = walk(&node.right, Some(&node.key), hi)?;
            if node.height != 1 + lh.max(rh) {
                return Err(InvariantError::new("stored height is stale"));
            }
            if (rh - lh).abs() > 1 {
                return Err(InvariantError::new("AVL balance bound exceeded"));
            }
            Ok(node.height)
        }
        walk(&self.root, None, None).map(|_| ())
    }

    fn in_order<'a>(link: &'a Link<K>, out: &mut Vec<(&'a K, i64)>) {
        if let Some(node) = link {
            Self::in_order(&node.left, out);
            out.push((&node.key, node.value));
            Self::in_order(&node.right, out);
        }
    }
}

impl<K: Ord + Clone> CounterMap<K> for AvlCounterMap<K> {
    fn counter(&mut self, key: K) -> &mut i64 {
        if self.find(&key).is_none() {
            self.insert(key.clone(), 0);
        }
        &mut self.find_mut(&key).expect("key just inserted").value
    }

    fn get(&self, key: &K) -> Option<&i64> {
        self.find(key).map(|node| &node.value)
    }

    fn remove(&mut self, key: &K) -> bool {
        self.remove_key(key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.root = None;
        self.len = 0;
        self.comparisons.reset();
        self.rotations = 0;
    }

    fn by_frequency(&self) -> Vec<(K, i64)> {
        let mut pairs = Vec::with_capacity(self.len);
        Self::in_order(&self.root, &mut pairs);
        let mut out: Vec<(K, i64)> = pairs.into_iter().map(|(k, v)| (k.clone(), v)).collect();
        out.sort_unstable_by(|a, b| b.1.cmp(&a.1));
        out
    }
}

impl<K: Ord + Clone> InstrumentedMap<K> for AvlCounterMap<K> {
    fn comparisons(&self) -> u64 {
        self.comparisons.get()
    }

    fn structural_ops(&self) -> u64 {
        self.rotations
    }
}

impl<K: Ord + Clone> MetricsSnapshotProvider for AvlCounterMap<K> {
    fn snapshot(&self) -> MapMetricsSnapshot {
        MapMetricsSnapshot {
            comparisons: self.comparisons.get(),
            rotations: self.rotations,
            rehashes: 0,
            len: self.len,
            table_size: 0,
        }
    }
}
