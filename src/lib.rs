//! seqring - Lock-Free Sequence-Doubled Ring Buffers
//!
//! Bounded, garbage-free in-process message passing in two shapes sharing
//! one protocol:
//!
//! - [`Queue`]: MPMC queue, each item delivered to exactly one consumer.
//! - [`Broadcast`]: disruptor-style ring, every reader observes every item
//!   in publication order, each driven by its own worker thread.
//!
//! # Key Features
//!
//! - Two-phase sequence protocol: cursors advance by 2 per item, the low
//!   bit marks a reservation in flight, so in-progress and committed slots
//!   are distinguishable without locks or wide counters
//! - 128-byte padded cursors (prefetcher false sharing elimination)
//! - Adaptive backoff (spin → yield → capped exponential sleep → give up)
//! - Reader barrier: the broadcast writer is gated by the slowest reader
//!
//! # Example
//!
//! ```
//! use seqring::{Broadcast, CancelToken, Queue, ReaderCallback};
//!
//! // MPMC queue: direct method calls, no threads involved.
//! let queue = Queue::with_capacity(8).unwrap();
//! queue.enqueue(7u64).unwrap();
//! assert_eq!(queue.try_dequeue(), Some(7));
//!
//! // Broadcast: one worker per reader, cancelled via the token.
//! let cancel = CancelToken::new();
//! let (tx, rx) = std::sync::mpsc::channel();
//! let readers = vec![Box::new(move |v: u64| { let _ = tx.send(v); }) as ReaderCallback<u64>];
//! let ring = Broadcast::with_capacity(cancel.clone(), 8, readers).unwrap();
//! ring.enqueue(42).unwrap();
//! assert_eq!(rx.recv().unwrap(), 42);
//! cancel.cancel();
//! ring.join();
//! ```

mod backoff;
mod barrier;
mod broadcast;
mod cancel;
mod config;
mod error;
mod invariants;
mod metrics;
mod pad;
mod queue;
mod ring;

pub use backoff::{Backoff, BackoffPolicy};
pub use barrier::{Barrier, MinBarrier};
pub use broadcast::{Broadcast, ReaderCallback};
pub use cancel::CancelToken;
pub use config::RingConfig;
pub use error::RingError;
pub use metrics::MetricsSnapshot;
pub use pad::{PaddedAtomicU64, CACHE_LINE_BYTES};
pub use queue::Queue;
