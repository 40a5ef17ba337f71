//! Configuration for both ring variants.

use crate::backoff::BackoffPolicy;
use crate::error::RingError;

/// Configuration shared by [`Queue`](crate::Queue) and
/// [`Broadcast`](crate::Broadcast).
///
/// Capacity is validated at construction: it must be a nonzero power of two
/// so slot addressing reduces to a mask. Everything else has defaults.
#[derive(Debug, Clone, Copy)]
pub struct RingConfig {
    capacity: u64,
    /// Ladder used by blocking enqueues.
    pub enqueue_backoff: BackoffPolicy,
    /// Ladder used by broadcast reader workers while waiting for data.
    pub reader_backoff: BackoffPolicy,
    /// Enable statistics counters (slight overhead on the hot paths).
    pub enable_metrics: bool,
}

impl RingConfig {
    /// Creates a configuration with the given slot count.
    ///
    /// # Errors
    ///
    /// [`RingError::InvalidCapacity`] if `capacity` is zero or not a power
    /// of two.
    pub fn new(capacity: u64) -> Result<Self, RingError> {
        if capacity == 0 || capacity & (capacity - 1) != 0 {
            return Err(RingError::InvalidCapacity { capacity });
        }
        Ok(Self {
            capacity,
            enqueue_backoff: BackoffPolicy::enqueue(),
            reader_backoff: BackoffPolicy::reader(),
            enable_metrics: false,
        })
    }

    /// Sets the blocking-enqueue backoff policy.
    pub fn with_enqueue_backoff(mut self, policy: BackoffPolicy) -> Self {
        self.enqueue_backoff = policy;
        self
    }

    /// Sets the reader-worker backoff policy.
    pub fn with_reader_backoff(mut self, policy: BackoffPolicy) -> Self {
        self.reader_backoff = policy;
        self
    }

    /// Enables or disables statistics counters.
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Number of slots.
    #[inline]
    pub const fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Mask for sequence-to-index wrapping.
    #[inline]
    pub(crate) const fn mask(&self) -> u64 {
        self.capacity - 1
    }

    /// Fullness threshold in sequence units.
    ///
    /// Each logical publish advances a cursor by 2, and `2*capacity - 1`
    /// rather than `2*capacity` keeps a producer off a slot whose consumer
    /// has not finished its two-phase exit.
    #[inline]
    pub(crate) const fn full_threshold(&self) -> u64 {
        self.capacity * 2 - 1
    }
}
