//! Broadcast (disruptor-style) ring: every reader observes every item.

use crate::backoff::Backoff;
use crate::barrier::{Barrier, MinBarrier};
use crate::cancel::CancelToken;
use crate::config::RingConfig;
use crate::error::RingError;
use crate::invariants::{
    debug_assert_fullness_bound, debug_assert_monotonic, debug_assert_stable_phase,
};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::pad::PaddedAtomicU64;
use crate::ring::SlotRing;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A consumer callback: receives every published item by value, in commit
/// order, from the worker thread owning it.
///
/// Callbacks must not panic and must not retain the argument beyond the
/// call; the slot becomes reusable once every reader has advanced past it.
pub type ReaderCallback<T> = Box<dyn FnMut(T) + Send>;

/// Broadcast ring with one worker thread per registered reader.
///
/// Producers publish through the same two-phase protocol as the queue
/// variant, except the cursor gating fullness is the minimum over all
/// reader cursors: the writer can never lap the slowest reader (nor reuse
/// a slot any reader still has in front of it).
///
/// `T` must be `Copy`: each reader receives its own bitwise copy, so slot
/// reuse never invalidates anything a callback was given.
///
/// Workers exit when the [`CancelToken`] supplied at construction is
/// signalled; [`join`](Broadcast::join) waits for them afterwards.
pub struct Broadcast<T: Copy + Send + 'static> {
    shared: Arc<BroadcastShared<T>>,
    /// Minimum over all reader cursors; a single cursor pinned at zero when
    /// no readers were registered (the ring then fills and blocks).
    gate: MinBarrier,
    workers: Vec<JoinHandle<()>>,
}

struct BroadcastShared<T> {
    writer: PaddedAtomicU64,
    slots: SlotRing<T>,
    config: RingConfig,
    metrics: Metrics,
}

impl<T: Copy + Send + 'static> Broadcast<T> {
    /// Creates a broadcast ring and spawns one worker per reader callback.
    ///
    /// An empty reader list is accepted: the ring accepts `capacity` items
    /// and then reports full forever.
    pub fn new(cancel: CancelToken, config: RingConfig, readers: Vec<ReaderCallback<T>>) -> Self {
        let shared = Arc::new(BroadcastShared {
            writer: PaddedAtomicU64::new(0),
            slots: SlotRing::new(&config),
            config,
            metrics: Metrics::new(),
        });

        let mut members: Vec<Arc<dyn Barrier>> = Vec::with_capacity(readers.len().max(1));
        let mut workers = Vec::with_capacity(readers.len());
        for callback in readers {
            let cursor = Arc::new(PaddedAtomicU64::new(0));
            members.push(Arc::clone(&cursor) as Arc<dyn Barrier>);

            let shared = Arc::clone(&shared);
            let cancel = cancel.clone();
            workers.push(thread::spawn(move || {
                run_reader(shared, cursor, callback, cancel);
            }));
        }
        if members.is_empty() {
            members.push(Arc::new(PaddedAtomicU64::new(0)));
        }

        Self {
            shared,
            gate: MinBarrier::new(members),
            workers,
        }
    }

    /// Creates a broadcast ring with the given capacity and default
    /// policies.
    ///
    /// # Errors
    ///
    /// [`RingError::InvalidCapacity`] if `capacity` is zero or not a power
    /// of two. No other construction-time failure exists.
    pub fn with_capacity(
        cancel: CancelToken,
        capacity: u64,
        readers: Vec<ReaderCallback<T>>,
    ) -> Result<Self, RingError> {
        Ok(Self::new(cancel, RingConfig::new(capacity)?, readers))
    }

    /// Non-blocking publish.
    ///
    /// Returns `false` if the slowest reader is a full ring behind or the
    /// reservation CAS loses a race; never retries.
    pub fn try_enqueue(&self, value: T) -> bool {
        let shared = &*self.shared;
        let head = shared.writer.load(Ordering::Acquire);

        if head & 1 == 1 {
            if shared.config.enable_metrics {
                shared.metrics.add_cas_retry();
            }
            return false;
        }
        if head.wrapping_sub(self.gate.sequence()) >= shared.config.full_threshold() {
            if shared.config.enable_metrics {
                shared.metrics.add_full_rejection();
            }
            return false;
        }

        if shared
            .writer
            .compare_exchange(
                head,
                head.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            if shared.config.enable_metrics {
                shared.metrics.add_cas_retry();
            }
            return false;
        }

        self.publish(head, value);
        true
    }

    /// Blocking publish, walking the enqueue backoff ladder between
    /// attempts.
    ///
    /// # Errors
    ///
    /// [`RingError::ExhaustedBackoff`] once the attempt budget is spent
    /// (e.g. a reader has stalled and the ring never drains).
    pub fn enqueue(&self, value: T) -> Result<(), RingError> {
        let shared = &*self.shared;
        let mut backoff = Backoff::new(shared.config.enqueue_backoff);

        loop {
            let head = shared.writer.load(Ordering::Acquire);

            if head & 1 == 1
                || head.wrapping_sub(self.gate.sequence()) >= shared.config.full_threshold()
            {
                if shared.config.enable_metrics {
                    shared.metrics.add_backoff_wait();
                }
                backoff.wait()?;
                continue;
            }

            if shared
                .writer
                .compare_exchange(
                    head,
                    head.wrapping_add(1),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                self.publish(head, value);
                return Ok(());
            }

            if shared.config.enable_metrics {
                shared.metrics.add_cas_retry();
                shared.metrics.add_backoff_wait();
            }
            backoff.wait()?;
        }
    }

    /// Second phase of a won reservation. Nothing fallible may run between
    /// the slot write and the cursor store.
    #[inline]
    fn publish(&self, head: u64, value: T) {
        let shared = &*self.shared;
        unsafe { shared.slots.write(head, value) };
        let published = head.wrapping_add(2);
        debug_assert_stable_phase!(published);
        debug_assert_fullness_bound!(published, self.gate.sequence(), shared.config.capacity());
        shared.writer.store(published, Ordering::Release);
        if shared.config.enable_metrics {
            shared.metrics.add_enqueued(1);
        }
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> u64 {
        self.shared.config.capacity()
    }

    /// Sequence distance between the writer and the slowest reader, in
    /// logical items.
    pub fn lag(&self) -> u64 {
        let head = self.shared.writer.load(Ordering::Relaxed);
        head.wrapping_sub(self.gate.sequence()) >> 1
    }

    /// Number of reader workers.
    pub fn reader_count(&self) -> usize {
        self.workers.len()
    }

    /// Snapshot of the statistics counters (all zero unless metrics are
    /// enabled in the configuration).
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Waits for every reader worker to exit.
    ///
    /// Signal the cancellation token first; joining an uncancelled ring
    /// blocks until some other clone of the token is signalled.
    pub fn join(self) {
        for worker in self.workers {
            // A panicking callback violates the reader contract; there is
            // nothing to recover from it here.
            let _ = worker.join();
        }
    }
}

/// Reader worker loop: deliver every fully-published slot, commit the
/// cursor once per batch, back off when caught up.
fn run_reader<T: Copy + Send + 'static>(
    shared: Arc<BroadcastShared<T>>,
    cursor: Arc<PaddedAtomicU64>,
    mut callback: ReaderCallback<T>,
    cancel: CancelToken,
) {
    let mut backoff = Backoff::new(shared.config.reader_backoff);
    loop {
        if cancel.is_cancelled() {
            return;
        }

        // Own cursor: this worker is its only writer.
        let tail = cursor.load(Ordering::Relaxed);
        let head = shared.writer.load(Ordering::Acquire);

        // Deliver only up to the even boundary: an odd cursor marks a slot
        // still being written.
        let published = head & !1;
        if tail < published {
            let mut seq = tail;
            while seq < published {
                callback(unsafe { shared.slots.read(seq) });
                seq = seq.wrapping_add(2);
            }
            debug_assert_monotonic!("reader", tail, seq);
            cursor.store(seq, Ordering::Release);
            backoff.reset();
            continue;
        }

        backoff.snooze();
    }
}
