use std::cell::Cell;

/// A metrics-only counter cell.
///
/// Lookup paths take `&self` but still need to record key comparisons, so
/// the count lives in a `Cell`. Metrics are observational and do not affect
/// correctness; the library is single-threaded by contract, so no
/// synchronization is needed.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get() + 1);
    }

    #[inline]
    pub fn reset(&self) {
        self.0.set(0);
    }
}
