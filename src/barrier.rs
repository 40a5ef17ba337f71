//! Reader barriers.
//!
//! A `Barrier` is anything exposing a monotonic u64 sequence. The broadcast
//! writer gates its progress on a `MinBarrier` over all reader cursors: the
//! minimum is the slowest reader, and no slot at or past it may be reused.

use crate::pad::PaddedAtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// A monotonically increasing sequence source.
pub trait Barrier: Send + Sync {
    /// Returns the current sequence value.
    fn sequence(&self) -> u64;
}

impl Barrier for PaddedAtomicU64 {
    #[inline]
    fn sequence(&self) -> u64 {
        // Acquire: the value gates access to slots published before it.
        self.load(Ordering::Acquire)
    }
}

/// Minimum over an ordered, non-empty set of barriers.
///
/// Constructed once at ring setup; members are shared with the reader
/// workers that advance them.
pub struct MinBarrier {
    members: Vec<Arc<dyn Barrier>>,
}

impl MinBarrier {
    /// Creates a barrier over the given members.
    pub fn new(members: Vec<Arc<dyn Barrier>>) -> Self {
        Self { members }
    }

    /// Number of member barriers.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the barrier has no members.
    ///
    /// Calling [`Barrier::sequence`] on an empty barrier panics; a gating
    /// barrier with no members is a construction bug, not a runtime state.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Barrier for MinBarrier {
    /// Returns the minimum sequence across all members.
    ///
    /// # Panics
    ///
    /// Panics if the barrier is empty.
    fn sequence(&self) -> u64 {
        assert!(!self.members.is_empty(), "sequence() on empty barrier");
        let mut minimum = self.members[0].sequence();
        for member in &self.members[1..] {
            let seq = member.sequence();
            if seq < minimum {
                minimum = seq;
            }
        }
        minimum
    }
}

impl std::fmt::Debug for MinBarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinBarrier")
            .field("members", &self.members.len())
            .finish()
    }
}
