//! The four interchangeable key→counter containers.
//!
//! | Module            | Structure                          | Balancing / growth        |
//! |-------------------|------------------------------------|---------------------------|
//! | `avl`             | height-balanced BST                | rotations on |bal| > 1    |
//! | `red_black`       | red-black BST (index arena)        | recolor + rotations       |
//! | `chained`         | hash table, separate chaining      | prime-doubling rehash     |
//! | `open_addressing` | hash table, linear probing         | prime-doubling rehash     |
//!
//! All four implement [`CounterMap`](crate::traits::CounterMap) and
//! [`InstrumentedMap`](crate::traits::InstrumentedMap); a caller selects
//! exactly one per run. The implementations do not interact.

pub mod avl;
pub mod chained;
pub mod open_addressing;
pub mod red_black;

pub use avl::AvlCounterMap;
pub use chained::ChainedCounterMap;
pub use open_addressing::OpenAddressingCounterMap;
pub use red_black::RedBlackCounterMap;
