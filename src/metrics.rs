use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe statistics for monitoring ring behavior.
///
/// Uses atomic counters with `Relaxed` ordering since these are purely
/// statistical - no control flow depends on exact values, and eventual
/// visibility is acceptable for observability.
#[derive(Debug, Default)]
pub struct Metrics {
    enqueued: AtomicU64,
    dequeued: AtomicU64,
    cas_retries: AtomicU64,
    full_rejections: AtomicU64,
    backoff_waits: AtomicU64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_enqueued(&self, n: u64) {
        self.enqueued.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_dequeued(&self, n: u64) {
        self.dequeued.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_cas_retry(&self) {
        self.cas_retries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_full_rejection(&self) {
        self.full_rejections.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_backoff_wait(&self) {
        self.backoff_waits.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot of the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dequeued: self.dequeued.load(Ordering::Relaxed),
            cas_retries: self.cas_retries.load(Ordering::Relaxed),
            full_rejections: self.full_rejections.load(Ordering::Relaxed),
            backoff_waits: self.backoff_waits.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`Metrics`] counter values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Items committed by producers.
    pub enqueued: u64,
    /// Items handed to consumers (queue variant only; broadcast delivery
    /// is per-reader and not counted here).
    pub dequeued: u64,
    /// Lost compare-and-swap races on a cursor.
    pub cas_retries: u64,
    /// Non-blocking enqueues rejected because the ring was full.
    pub full_rejections: u64,
    /// Ladder steps taken by blocking enqueues.
    pub backoff_waits: u64,
}
