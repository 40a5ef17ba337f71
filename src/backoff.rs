//! Adaptive backoff ladder.
//!
//! Contended operations escalate through spin → yield → exponential sleep,
//! indexed purely by attempt count. Blocking enqueues give up with
//! [`RingError::ExhaustedBackoff`] once the attempt budget is spent; reader
//! workers keep sleeping at the cap until cancelled.

use crate::error::RingError;
use std::hint;
use std::thread;
use std::time::Duration;

// Sleep micros are 1 << (attempt - yield_until); clamp the shift so the
// arithmetic stays valid long after the cap has taken over.
const MAX_SLEEP_SHIFT: u32 = 20;

/// Thresholds for one backoff ladder.
///
/// Attempts below `spin_until` busy-spin with a PAUSE hint, attempts below
/// `yield_until` yield to the scheduler, and later attempts sleep
/// `1µs << (attempt - yield_until)` capped at `max_sleep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Attempts below this busy-spin.
    pub spin_until: u32,
    /// Attempts below this (and at or above `spin_until`) yield.
    pub yield_until: u32,
    /// Attempts at or above this fail with `ExhaustedBackoff`.
    pub give_up_after: u32,
    /// Upper bound for one sleep.
    pub max_sleep: Duration,
}

impl BackoffPolicy {
    /// Ladder for blocking enqueues: spin to 5, yield to 20, sleep capped at
    /// 5 ms, give up at 10 000 attempts.
    pub const fn enqueue() -> Self {
        Self {
            spin_until: 5,
            yield_until: 20,
            give_up_after: 10_000,
            max_sleep: Duration::from_millis(5),
        }
    }

    /// Ladder for broadcast reader workers: yield immediately, sleep capped
    /// at 1 ms, never give up (workers exit via cancellation, not exhaustion).
    pub const fn reader() -> Self {
        Self {
            spin_until: 0,
            yield_until: 20,
            give_up_after: u32::MAX,
            max_sleep: Duration::from_millis(1),
        }
    }

    fn sleep_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(self.yield_until).min(MAX_SLEEP_SHIFT);
        Duration::from_micros(1u64 << shift).min(self.max_sleep)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::enqueue()
    }
}

/// Stateful ladder walker.
///
/// One instance lives on the stack of each blocking operation or reader
/// worker; `reset()` after success, `wait()` or `snooze()` after failure.
#[derive(Debug)]
pub struct Backoff {
    policy: BackoffPolicy,
    attempt: u32,
}

impl Backoff {
    /// Creates a fresh ladder under the given policy.
    #[inline]
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Current attempt count.
    #[inline]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Rewind after a successful operation.
    #[inline]
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// One ladder step, failing once the attempt budget is spent.
    #[inline]
    pub fn wait(&mut self) -> Result<(), RingError> {
        if self.attempt >= self.policy.give_up_after {
            return Err(RingError::ExhaustedBackoff {
                attempts: self.attempt,
            });
        }
        self.snooze();
        Ok(())
    }

    /// One ladder step that never fails; past the yield range the sleep
    /// stays pinned at `max_sleep`.
    #[inline]
    pub fn snooze(&mut self) {
        if self.attempt < self.policy.spin_until {
            hint::spin_loop();
        } else if self.attempt < self.policy.yield_until {
            thread::yield_now();
        } else {
            thread::sleep(self.policy.sleep_for(self.attempt));
        }
        self.attempt = self.attempt.saturating_add(1);
    }
}
