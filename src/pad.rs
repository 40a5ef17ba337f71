//! Cache-line padded atomics.
//!
//! Every hot cursor (queue head/tail, broadcast writer cursor, each reader
//! cursor) lives in its own cache line so that CAS traffic on one counter
//! does not invalidate its neighbors.

use std::sync::atomic::{AtomicU64, Ordering};

/// Padding granularity for hot counters.
///
/// 128 rather than 64: Intel/AMD prefetchers pull cache lines in adjacent
/// pairs, and some ARM big cores use 128-byte coherence granularity, so a
/// 64-byte pad can still produce false sharing across a line pair.
pub const CACHE_LINE_BYTES: usize = 128;

/// A 64-bit atomic occupying a full cache line.
///
/// Exposes the raw `Ordering`-taking operations; callers pick acquire for
/// loads that gate data access, release for stores that publish data, and
/// acq-rel for CAS.
#[repr(align(128))]
#[derive(Debug)]
pub struct PaddedAtomicU64 {
    value: AtomicU64,
}

impl PaddedAtomicU64 {
    /// Creates a padded atomic with the given initial value.
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self {
            value: AtomicU64::new(value),
        }
    }

    #[inline]
    pub fn load(&self, order: Ordering) -> u64 {
        self.value.load(order)
    }

    #[inline]
    pub fn store(&self, value: u64, order: Ordering) {
        self.value.store(value, order);
    }

    /// Single-shot compare-and-swap.
    ///
    /// A failed exchange is a contention signal, not an error; callers back
    /// off or return to the non-blocking caller.
    #[inline]
    pub fn compare_exchange(
        &self,
        current: u64,
        new: u64,
        success: Ordering,
        failure: Ordering,
    ) -> Result<u64, u64> {
        self.value.compare_exchange(current, new, success, failure)
    }
}

impl Default for PaddedAtomicU64 {
    fn default() -> Self {
        Self::new(0)
    }
}

// The padded counter must cover at least one full line, or two live
// instances could share one.
const _: () = assert!(std::mem::size_of::<PaddedAtomicU64>() >= CACHE_LINE_BYTES);
const _: () = assert!(std::mem::align_of::<PaddedAtomicU64>() >= CACHE_LINE_BYTES);
