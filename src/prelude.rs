//! Convenience re-exports for the common workflow.
//!
//! ```
//! use tallykit::prelude::*;
//!
//! let mut map = AvlCounterMap::new();
//! *map.counter("word") += 1;
//! assert_eq!(map.len(), 1);
//! ```

pub use crate::error::{ConfigError, InvariantError};
pub use crate::map::{
    AvlCounterMap, ChainedCounterMap, OpenAddressingCounterMap, RedBlackCounterMap,
};
pub use crate::metrics::{MapMetricsSnapshot, MetricsSnapshotProvider};
pub use crate::traits::{CounterMap, InstrumentedMap};
