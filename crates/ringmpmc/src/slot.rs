use crate::sync::{AtomicU64, Ordering, UnsafeCell};

/// Stamp of a slot that is free for the producer holding logical position `pos`.
#[inline]
pub(crate) const fn free_stamp(pos: u64) -> u64 {
    pos.wrapping_mul(2)
}

/// Stamp of a slot holding the published value of logical position `pos`.
#[inline]
pub(crate) const fn ready_stamp(pos: u64) -> u64 {
    pos.wrapping_mul(2) | 1
}

/// One cell of the ring: a value plus its readiness handshake.
///
/// The readiness flag is the low bit of `stamp`; the remaining bits record
/// which logical position the flag belongs to. A consumer therefore never
/// mistakes a value left over from the previous lap for the one it is
/// looking for, and a producer never overwrites a value that its consumer
/// has claimed but not yet copied out.
pub(crate) struct Slot {
    stamp: AtomicU64,
    value: UnsafeCell<i32>,
}

// Safety: `value` is only touched by the single thread that owns the slot
// under the stamp protocol (the producer between observing `free(pos)` and
// publishing `ready(pos)`, the consumer between claiming `pos` and storing
// `free(pos + capacity)`). The Release/Acquire pairs on `stamp` order those
// accesses.
unsafe impl Send for Slot {}
unsafe impl Sync for Slot {}

impl Slot {
    /// Creates a slot that is free for logical position `pos`.
    pub(crate) fn free_for(pos: u64) -> Self {
        Self {
            stamp: AtomicU64::new(free_stamp(pos)),
            value: UnsafeCell::new(0),
        }
    }

    #[inline]
    pub(crate) fn stamp(&self) -> u64 {
        self.stamp.load(Ordering::Acquire)
    }

    /// The boolean readiness flag: the slot holds an unread value.
    #[inline]
    pub(crate) fn is_ready(&self) -> bool {
        self.stamp() & 1 == 1
    }

    /// Writes `value` for position `pos` and publishes it.
    ///
    /// # Safety
    ///
    /// The caller must have reserved `pos` and observed `free_stamp(pos)` with
    /// Acquire ordering, which makes it the only thread accessing the value.
    #[inline]
    pub(crate) unsafe fn publish(&self, pos: u64, value: i32) {
        // SAFETY: exclusive access guaranteed by the caller.
        self.value.with_mut(|ptr| ptr.write(value));
        // Release: the value write happens-before any Acquire load that sees it.
        self.stamp.store(ready_stamp(pos), Ordering::Release);
    }

    /// Copies out the value of position `pos` and frees the slot for `next`.
    ///
    /// # Safety
    ///
    /// The caller must have observed `ready_stamp(pos)` with Acquire ordering
    /// and won the claim on `pos`, which makes it the only thread accessing
    /// the value.
    #[inline]
    pub(crate) unsafe fn consume(&self, next: u64) -> i32 {
        // SAFETY: exclusive access guaranteed by the caller.
        let value = self.value.with(|ptr| ptr.read());
        // Release: the read above completes before a producer may reuse the slot.
        self.stamp.store(free_stamp(next), Ordering::Release);
        value
    }
}
