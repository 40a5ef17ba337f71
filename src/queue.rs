//! MPMC bounded queue over the two-phase sequence protocol.

use crate::backoff::Backoff;
use crate::config::RingConfig;
use crate::error::RingError;
use crate::invariants::{debug_assert_fullness_bound, debug_assert_stable_phase};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::pad::PaddedAtomicU64;
use crate::ring::SlotRing;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

/// Multi-producer multi-consumer bounded queue.
///
/// Each item is delivered to exactly one consumer. Producers reserve a slot
/// by CAS-ing `head` to the odd intermediate, write the slot, then publish
/// with a release store of the next even value; consumers mirror the same
/// two-phase exit on `tail`. An observed odd cursor always means another
/// operation is in flight.
///
/// The handle is cheap to clone (the ring state is shared); producers and
/// consumers call methods directly, no worker threads are involved.
///
/// # Example
///
/// ```
/// use seqring::Queue;
///
/// let queue = Queue::with_capacity(8).unwrap();
/// assert!(queue.try_enqueue(42));
/// assert_eq!(queue.try_dequeue(), Some(42));
/// assert_eq!(queue.try_dequeue(), None);
/// ```
pub struct Queue<T> {
    inner: Arc<QueueInner<T>>,
}

struct QueueInner<T> {
    /// Producer cursor.
    head: PaddedAtomicU64,
    /// Consumer cursor.
    tail: PaddedAtomicU64,
    slots: SlotRing<T>,
    config: RingConfig,
    metrics: Metrics,
}

impl<T> Queue<T> {
    /// Creates a queue from a validated configuration.
    pub fn new(config: RingConfig) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                head: PaddedAtomicU64::new(0),
                tail: PaddedAtomicU64::new(0),
                slots: SlotRing::new(&config),
                config,
                metrics: Metrics::new(),
            }),
        }
    }

    /// Creates a queue with the given capacity and default policies.
    ///
    /// # Errors
    ///
    /// [`RingError::InvalidCapacity`] if `capacity` is zero or not a power
    /// of two.
    pub fn with_capacity(capacity: u64) -> Result<Self, RingError> {
        Ok(Self::new(RingConfig::new(capacity)?))
    }

    /// Non-blocking enqueue.
    ///
    /// Returns `false` (dropping `value`) if the queue is full or the
    /// reservation CAS loses a race; never retries and never suspends.
    pub fn try_enqueue(&self, value: T) -> bool {
        let inner = &*self.inner;
        let head = inner.head.load(Ordering::Acquire);
        let tail = inner.tail.load(Ordering::Acquire);

        // Odd head: another producer holds the reservation window.
        if head & 1 == 1 {
            if inner.config.enable_metrics {
                inner.metrics.add_cas_retry();
            }
            return false;
        }
        if head.wrapping_sub(tail) >= inner.config.full_threshold() {
            if inner.config.enable_metrics {
                inner.metrics.add_full_rejection();
            }
            return false;
        }

        if inner
            .head
            .compare_exchange(
                head,
                head.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            if inner.config.enable_metrics {
                inner.metrics.add_cas_retry();
            }
            return false;
        }

        inner.publish(head, tail, value);
        true
    }

    /// Blocking enqueue.
    ///
    /// Walks the enqueue backoff ladder between attempts.
    ///
    /// # Errors
    ///
    /// [`RingError::ExhaustedBackoff`] once the attempt budget is spent;
    /// `value` is dropped in that case.
    pub fn enqueue(&self, value: T) -> Result<(), RingError> {
        let inner = &*self.inner;
        let mut backoff = Backoff::new(inner.config.enqueue_backoff);

        loop {
            let head = inner.head.load(Ordering::Acquire);
            let tail = inner.tail.load(Ordering::Acquire);

            if head & 1 == 1 || head.wrapping_sub(tail) >= inner.config.full_threshold() {
                if inner.config.enable_metrics {
                    inner.metrics.add_backoff_wait();
                }
                backoff.wait()?;
                continue;
            }

            if inner
                .head
                .compare_exchange(
                    head,
                    head.wrapping_add(1),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                inner.publish(head, tail, value);
                return Ok(());
            }

            if inner.config.enable_metrics {
                inner.metrics.add_cas_retry();
                inner.metrics.add_backoff_wait();
            }
            backoff.wait()?;
        }
    }

    /// Non-blocking dequeue.
    ///
    /// Returns `None` when the queue is empty. While a concurrent two-phase
    /// operation is observed in flight (odd `tail`, or `head` not yet two
    /// past `tail`) it yields cooperatively and re-reads the cursors; it
    /// never sleeps.
    pub fn try_dequeue(&self) -> Option<T> {
        let inner = &*self.inner;
        loop {
            let tail = inner.tail.load(Ordering::Acquire);
            let head = inner.head.load(Ordering::Acquire);

            if tail == head {
                return None;
            }
            if tail & 1 == 1 || head.wrapping_sub(tail) < 2 {
                thread::yield_now();
                continue;
            }

            if inner
                .tail
                .compare_exchange(
                    tail,
                    tail.wrapping_add(1),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                // Read into a local first; only then commit the cursor.
                let value = unsafe { inner.slots.take(tail) };
                let drained = tail.wrapping_add(2);
                debug_assert_stable_phase!(drained);
                inner.tail.store(drained, Ordering::Release);
                if inner.config.enable_metrics {
                    inner.metrics.add_dequeued(1);
                }
                return Some(value);
            }

            if inner.config.enable_metrics {
                inner.metrics.add_cas_retry();
            }
            thread::yield_now();
        }
    }

    /// Dequeues every pending item, handing each to `f`. Returns the count.
    ///
    /// Useful after shutdown to empty the queue before dropping it.
    pub fn drain<F>(&self, mut f: F) -> usize
    where
        F: FnMut(T),
    {
        let mut count = 0;
        while let Some(value) = self.try_dequeue() {
            f(value);
            count += 1;
        }
        count
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> u64 {
        self.inner.config.capacity()
    }

    /// Current number of committed items (approximate under concurrency).
    #[inline]
    pub fn len(&self) -> u64 {
        let head = self.inner.head.load(Ordering::Relaxed);
        let tail = self.inner.tail.load(Ordering::Relaxed);
        head.wrapping_sub(tail) >> 1
    }

    /// Returns `true` if no items are committed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the queue is at capacity.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Snapshot of the statistics counters (all zero unless metrics are
    /// enabled in the configuration).
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }
}

impl<T> QueueInner<T> {
    /// Second phase of a won reservation: write the slot and release-store
    /// the even successor. Nothing fallible may run between the two.
    #[inline]
    fn publish(&self, head: u64, tail: u64, value: T) {
        unsafe { self.slots.write(head, value) };
        let published = head.wrapping_add(2);
        debug_assert_stable_phase!(published);
        debug_assert_fullness_bound!(published, tail, self.config.capacity());
        self.head.store(published, Ordering::Release);
        if self.config.enable_metrics {
            self.metrics.add_enqueued(1);
        }
    }
}

impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Drop for QueueInner<T> {
    fn drop(&mut self) {
        // Exclusive access here: drop the committed-but-undequeued range.
        // A cursor left odd by a thread that died mid-operation marks a slot
        // in an unknown state; round it out of the range rather than touch it.
        let head = self.head.load(Ordering::Relaxed) & !1;
        let tail = self.tail.load(Ordering::Relaxed);
        let tail = tail.wrapping_add(tail & 1);
        unsafe { self.slots.drop_range(tail, head) };
    }
}
