use std::sync::atomic::{AtomicU64, Ordering};

/// Optional counters for monitoring queue behavior.
///
/// Counters use relaxed atomics: they are statistics, never inputs to the
/// queue protocol. A queue only updates them when `enable_metrics` is set;
/// callers read them through [`Queue::metrics`](crate::Queue::metrics).
#[derive(Debug, Default)]
pub(crate) struct Metrics {
    pushes: AtomicU64,
    pops: AtomicU64,
    empty_pops: AtomicU64,
    full_waits: AtomicU64,
    slot_waits: AtomicU64,
    claim_retries: AtomicU64,
}

/// Point-in-time copy of a queue's counters, see [`Queue::metrics`](crate::Queue::metrics).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Values published by push or `try_push`.
    pub pushes: u64,
    /// Values returned by pop.
    pub pops: u64,
    /// Pops that found nothing to consume.
    pub empty_pops: u64,
    /// Wait rounds a producer spent on a full queue.
    pub full_waits: u64,
    /// Wait rounds a producer spent on a reserved slot not yet released.
    pub slot_waits: u64,
    /// Lost compare-and-swap races on either index.
    pub claim_retries: u64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_push(&self) {
        self.pushes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_pop(&self) {
        self.pops.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_empty_pop(&self) {
        self.empty_pops.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_full_wait(&self) {
        self.full_waits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_slot_wait(&self) {
        self.slot_waits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_claim_retry(&self) {
        self.claim_retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the current counter values.
    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pushes: self.pushes.load(Ordering::Relaxed),
            pops: self.pops.load(Ordering::Relaxed),
            empty_pops: self.empty_pops.load(Ordering::Relaxed),
            full_waits: self.full_waits.load(Ordering::Relaxed),
            slot_waits: self.slot_waits.load(Ordering::Relaxed),
            claim_retries: self.claim_retries.load(Ordering::Relaxed),
        }
    }
}
