/// Point-in-time view of one container's instrumentation counters.
///
/// `rotations` is zero for the hash family and `rehashes` is zero for the
/// tree family; `structural_ops` on the trait surfaces whichever applies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MapMetricsSnapshot {
    pub comparisons: u64,
    pub rotations: u64,
    pub rehashes: u64,

    // gauges captured at snapshot time
    pub len: usize,
    /// Table slots for the hash family, 0 for the trees.
    pub table_size: usize,
}

/// Read side of the metrics split: anything that can produce a snapshot.
///
/// Implemented by all four containers; consumed by the report writer and
/// the comparison benches, keeping metrics consumption decoupled from the
/// recording inside each map operation.
pub trait MetricsSnapshotProvider {
    fn snapshot(&self) -> MapMetricsSnapshot;
}
