//! Error types for queue construction and non-blocking pushes.

use thiserror::Error;

/// Configuration errors reported when a queue is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// A queue needs at least one slot.
    #[error("queue capacity must be greater than zero")]
    ZeroCapacity,

    /// Capacity exceeds [`MAX_CAPACITY`](crate::MAX_CAPACITY).
    #[error("queue capacity {capacity} exceeds the maximum of {max}")]
    CapacityTooLarge {
        /// The rejected capacity.
        capacity: u32,
        /// The largest supported capacity.
        max: u32,
    },
}

/// Error returned by [`Queue::try_push`](crate::Queue::try_push).
///
/// The rejected value is handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TryPushError {
    /// Every slot holds an unconsumed value.
    #[error("queue is full")]
    Full(i32),

    /// The queue's storage was transferred away by [`Queue::take`](crate::Queue::take).
    #[error("queue is detached")]
    Detached(i32),
}

impl TryPushError {
    /// Returns the value that could not be pushed.
    #[inline]
    pub fn into_inner(self) -> i32 {
        match self {
            Self::Full(value) | Self::Detached(value) => value,
        }
    }

    /// Returns `true` if the push failed because the queue was full.
    #[inline]
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    /// Returns `true` if the queue no longer owns any storage.
    #[inline]
    pub fn is_detached(&self) -> bool {
        matches!(self, Self::Detached(_))
    }
}
