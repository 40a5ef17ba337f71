//! Debug assertion macros for sequence-protocol invariants.
//!
//! Only active in debug builds (`debug_assert!`), so there is zero overhead
//! on release hot paths. Used by both `Queue<T>` and `Broadcast<T>`.

/// Assert the fullness bound: a writer cursor never runs more than
/// `2 * capacity` sequence units ahead of the cursor gating it.
///
/// Checked after every successful reservation CAS.
macro_rules! debug_assert_fullness_bound {
    ($writer:expr, $gate:expr, $capacity:expr) => {
        debug_assert!(
            $writer.wrapping_sub($gate) <= $capacity * 2,
            "fullness bound violated: writer {} is {} past gate {} (capacity {})",
            $writer,
            $writer.wrapping_sub($gate),
            $gate,
            $capacity
        )
    };
}

/// Assert that a publication store leaves the cursor even (stable phase).
///
/// Checked before the second store of every two-phase commit.
macro_rules! debug_assert_stable_phase {
    ($seq:expr) => {
        debug_assert!(
            $seq & 1 == 0,
            "publication must leave an even sequence, got {}",
            $seq
        )
    };
}

/// Assert that a cursor only moves forward.
///
/// Checked by reader workers before committing a batch.
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "{} cursor decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

pub(crate) use debug_assert_fullness_bound;
pub(crate) use debug_assert_monotonic;
pub(crate) use debug_assert_stable_phase;
