//! Error types for ring operations.

use thiserror::Error;

/// Errors that can occur when constructing or feeding a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    /// Capacity is zero or not a power of two.
    #[error("capacity must be a nonzero power of two, got {capacity}")]
    InvalidCapacity {
        /// The rejected capacity value.
        capacity: u64,
    },

    /// A blocking enqueue ran out the backoff ladder without finding space.
    #[error("enqueue failed after {attempts} attempts")]
    ExhaustedBackoff {
        /// Number of attempts made before giving up.
        attempts: u32,
    },
}

impl RingError {
    /// Returns `true` if the caller can reasonably retry (e.g. the ring was
    /// overloaded and may drain).
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ExhaustedBackoff { .. })
    }

    /// Returns `true` if retrying with the same arguments can never succeed.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::InvalidCapacity { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let cap = RingError::InvalidCapacity { capacity: 3 };
        assert!(cap.is_terminal());
        assert!(!cap.is_recoverable());

        let backoff = RingError::ExhaustedBackoff { attempts: 10_000 };
        assert!(backoff.is_recoverable());
        assert!(!backoff.is_terminal());
    }

    #[test]
    fn test_error_display() {
        let err = RingError::InvalidCapacity { capacity: 6 };
        assert_eq!(err.to_string(), "capacity must be a nonzero power of two, got 6");
    }
}
