//! tallykit: interchangeable key→counter containers for word-count benchmarking.
//!
//! Four containers implement the same [`traits::CounterMap`] contract with
//! different structural guarantees: an AVL tree, a red-black tree, a chained
//! hash map, and an open-addressed hash map with linear probing and
//! tombstones. Each instance counts its key comparisons and structural
//! operations (rotations for the trees, rehashes for the hash maps) so runs
//! over the same input stream can be compared.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod ds;
pub mod error;
pub mod ingest;
pub mod map;
pub mod metrics;
pub mod report;
pub mod traits;

pub mod prelude;
