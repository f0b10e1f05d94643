use crate::backoff::Waiter;
use crate::invariants::{debug_assert_bounded_occupancy, debug_assert_slot_owned};
use crate::metrics::Metrics;
use crate::slot::{free_stamp, ready_stamp, Slot};
use crate::sync::{spin_loop, AtomicU64, Ordering};
use crate::{trace, Config, MetricsSnapshot, QueueError, TryPushError, WaitStrategy};
use crossbeam_utils::CachePadded;
use std::fmt;

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// ## Indices
//
// `write_index` and `read_index` are logical positions held in u64 counters.
// The slot of a position is `pos % capacity`, for any capacity. The public
// accessors report the low 32 bits, so callers see counters that wrap at
// u32::MAX → 0 while the difference `write - read` (wrapping u32) is still the
// occupancy. The u64 counters themselves do not wrap in practice (2^64
// operations), which keeps the modulo mapping continuous.
//
// ## Slot stamps
//
// Each slot carries a stamp: `free(p) = 2p` when it may be written for
// position p, `ready(p) = 2p + 1` once the value of p is published. The
// consumer of p releases the slot as `free(p + capacity)`. Tying the flag to
// a position means neither side can act on a stamp left over from another lap.
//
// ## Producer (push)
// 1. Load `write_index` Relaxed and `read_index` Acquire; wait while full
// 2. CAS `write_index` w → w + 1 (AcqRel): reserves position w
// 3. Wait until the slot stamp is `free(w)` (Acquire): previous consumer done
// 4. Write the value (exclusive)
// 5. Store `ready(w)` with Release: publishes the value
//
// ## Consumer (pop)
// 1. Load `read_index` Relaxed: candidate position r
// 2. Load the slot stamp with Acquire; if it is not `ready(r)`, report empty
//    (or retry if `read_index` moved meanwhile)
// 3. CAS `read_index` r → r + 1 (AcqRel): claims position r
// 4. Read the value (exclusive)
// 5. Store `free(r + capacity)` with Release: hands the slot to the next lap
//
// Reservation (producer step 2) only succeeds while occupancy < capacity, so
// `write_index - read_index ≤ capacity` holds at every instant, and the n-th
// reserved push is the n-th claimed pop.
//
// =============================================================================

/// Bounded lock-free multi-producer multi-consumer queue of `i32` values.
///
/// Share it between threads by reference (`&Queue`, scoped threads) or
/// through an `Arc<Queue>`. [`push`](Self::push) waits while the queue is
/// full; [`pop`](Self::pop) never waits.
pub struct Queue {
    // === PRODUCER HOT ===
    write_index: CachePadded<AtomicU64>,

    // === CONSUMER HOT ===
    read_index: CachePadded<AtomicU64>,

    // === STORAGE ===
    /// Fixed at construction; empty once the queue is detached.
    slots: Box<[Slot]>,
    /// Number of slots, `0` when detached.
    capacity: u32,

    // === COLD STATE ===
    config: Config,
    metrics: Metrics,
}

/// Outcome of one reservation attempt.
enum Reserve {
    Reserved(u64),
    Full,
    /// Lost the CAS to another producer (or failed spuriously); retry at once.
    Contended,
}

impl Queue {
    /// Creates a queue with `capacity` slots and default settings.
    ///
    /// The capacity may be any value between 1 and
    /// [`MAX_CAPACITY`](crate::MAX_CAPACITY).
    ///
    /// # Errors
    ///
    /// Returns a [`QueueError`] describing why the capacity was rejected.
    pub fn new(capacity: u32) -> Result<Self, QueueError> {
        Self::with_config(Config::new(capacity))
    }

    /// Creates a queue from a full configuration.
    pub fn with_config(config: Config) -> Result<Self, QueueError> {
        if let Err(err) = config.validate() {
            trace::warn!(capacity = config.capacity, error = %err, "rejected queue configuration");
            return Err(err);
        }

        let queue = Self::build(config, 0);
        trace::debug!(
            capacity = config.capacity,
            wait = ?config.wait,
            metrics = config.enable_metrics,
            "queue created"
        );
        Ok(queue)
    }

    /// Builds a queue whose indices both start at `start` (validated config).
    fn build(config: Config, start: u64) -> Self {
        let capacity = u64::from(config.capacity);
        // Slot i is first used by the position in [start, start + capacity) congruent to i.
        let offset = start % capacity;
        let slots = (0..capacity)
            .map(|i| Slot::free_for(start + (i + capacity - offset) % capacity))
            .collect();

        Self {
            write_index: CachePadded::new(AtomicU64::new(start)),
            read_index: CachePadded::new(AtomicU64::new(start)),
            slots,
            capacity: config.capacity,
            config,
            metrics: Metrics::new(),
        }
    }

    fn detached(config: Config) -> Self {
        Self {
            write_index: CachePadded::new(AtomicU64::new(0)),
            read_index: CachePadded::new(AtomicU64::new(0)),
            slots: Box::default(),
            capacity: 0,
            config,
            metrics: Metrics::new(),
        }
    }

    // ---------------------------------------------------------------------
    // ACCESSORS
    // ---------------------------------------------------------------------

    /// Returns the logical read position (number of values ever claimed, mod 2^32).
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn read_index(&self) -> u32 {
        self.read_index.load(Ordering::Acquire) as u32
    }

    /// Returns the logical write position (number of slots ever reserved, mod 2^32).
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_index(&self) -> u32 {
        self.write_index.load(Ordering::Acquire) as u32
    }

    /// Returns the number of slots, or `0` for a detached queue.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the current occupancy (reserved but not yet claimed slots).
    ///
    /// A snapshot under concurrency; clamped to the capacity.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn len(&self) -> u32 {
        // Read first: write_index can only have moved further by the time it is loaded.
        let read = self.read_index.load(Ordering::Acquire);
        let write = self.write_index.load(Ordering::Acquire);
        write.saturating_sub(read).min(u64::from(self.capacity)) as u32
    }

    /// Returns true if every reserved position has been claimed.
    ///
    /// Unlike comparing `read_index() >= write_index()` this stays correct
    /// when the reported u32 counters wrap, which makes it the drain check to
    /// use once producers have stopped.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read_index.load(Ordering::Acquire) == self.write_index.load(Ordering::Acquire)
    }

    /// Returns true if a push would have to wait for a consumer.
    #[inline]
    pub fn is_full(&self) -> bool {
        !self.is_detached() && self.len() >= self.capacity
    }

    /// Returns true if the storage was transferred away by [`take`](Self::take).
    #[inline]
    pub fn is_detached(&self) -> bool {
        self.capacity == 0
    }

    /// Returns the strategy blocked pushes use to wait.
    #[inline]
    pub fn wait_strategy(&self) -> WaitStrategy {
        self.config.wait
    }

    /// Get a snapshot of metrics if enabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        if self.config.enable_metrics {
            self.metrics.snapshot()
        } else {
            MetricsSnapshot::default()
        }
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Pushes a value, waiting while the queue is full.
    ///
    /// Spins (using the configured [`WaitStrategy`]) until a consumer frees a
    /// slot; if nothing ever pops, this never returns.
    ///
    /// # Panics
    ///
    /// Panics if the queue is detached, since it has no slots to wait for.
    pub fn push(&self, value: i32) {
        if self.is_detached() {
            trace::error!(value, "push on a detached queue");
            panic!("push on a detached queue: its storage was transferred by take()");
        }

        let mut waiter = self.config.wait.waiter();
        let pos = loop {
            match self.try_reserve() {
                Reserve::Reserved(pos) => break pos,
                Reserve::Full => {
                    if self.config.enable_metrics {
                        self.metrics.add_full_wait();
                    }
                    waiter.wait();
                }
                Reserve::Contended => spin_loop(),
            }
        };
        waiter.reset();
        self.write_slot(pos, value, &mut waiter);
    }

    /// Pushes a value without waiting for free space.
    ///
    /// Returns the value back inside the error if the queue is full or
    /// detached. Once a position is reserved the push still waits for the
    /// previous lap's consumer to release the slot, which it is about to do.
    pub fn try_push(&self, value: i32) -> Result<(), TryPushError> {
        if self.is_detached() {
            return Err(TryPushError::Detached(value));
        }

        let pos = loop {
            match self.try_reserve() {
                Reserve::Reserved(pos) => break pos,
                Reserve::Full => return Err(TryPushError::Full(value)),
                Reserve::Contended => spin_loop(),
            }
        };
        let mut waiter = self.config.wait.waiter();
        self.write_slot(pos, value, &mut waiter);
        Ok(())
    }

    /// One attempt at reserving the next logical position.
    fn try_reserve(&self) -> Reserve {
        let write = self.write_index.load(Ordering::Relaxed);
        let read = self.read_index.load(Ordering::Acquire);
        let capacity = u64::from(self.capacity);

        if write < read {
            // Stale write_index behind a newer read_index; reload both.
            return Reserve::Contended;
        }
        let occupancy = write - read;
        if occupancy >= capacity {
            return Reserve::Full;
        }

        match self.write_index.compare_exchange_weak(
            write,
            write + 1,
            Ordering::AcqRel,
            Ordering::Relaxed,
        ) {
            Ok(_) => {
                debug_assert_bounded_occupancy!(occupancy + 1, capacity);
                Reserve::Reserved(write)
            }
            Err(_) => {
                if self.config.enable_metrics {
                    self.metrics.add_claim_retry();
                }
                Reserve::Contended
            }
        }
    }

    /// Waits for the reserved slot to be released, then writes and publishes.
    fn write_slot(&self, pos: u64, value: i32, waiter: &mut Waiter) {
        let slot = self.slot(pos);
        let free = free_stamp(pos);

        while slot.stamp() != free {
            if self.config.enable_metrics {
                self.metrics.add_slot_wait();
            }
            waiter.wait();
        }
        debug_assert_slot_owned!("producer", pos, slot.stamp(), free);

        // SAFETY: `pos` was reserved by this thread alone and the slot is
        // stamped free(pos) (Acquire), so no consumer still reads it and no
        // other producer can reach it until it is published.
        unsafe { slot.publish(pos, value) };

        if self.config.enable_metrics {
            self.metrics.add_push();
        }
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Pops the oldest published value, or returns `None` without waiting.
    ///
    /// `None` means nothing was ready at the read position: the queue is
    /// empty, or the next producer has reserved its slot but not published
    /// yet. Callers that need every value keep polling. A detached queue
    /// always returns `None`.
    pub fn pop(&self) -> Option<i32> {
        if self.is_detached() {
            return None;
        }

        let mut read = self.read_index.load(Ordering::Relaxed);
        loop {
            let slot = self.slot(read);
            let ready = ready_stamp(read);

            if slot.stamp() != ready {
                let current = self.read_index.load(Ordering::Relaxed);
                if current == read {
                    if self.config.enable_metrics {
                        self.metrics.add_empty_pop();
                    }
                    return None;
                }
                // Another consumer claimed `read` meanwhile; look at the next position.
                read = current;
                continue;
            }

            match self.read_index.compare_exchange_weak(
                read,
                read + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    debug_assert_slot_owned!("consumer", read, slot.stamp(), ready);

                    // SAFETY: the slot is stamped ready(read) (Acquire) and this
                    // thread won the claim on `read`, so it is the only reader
                    // and no producer writes until the slot is released below.
                    let value = unsafe { slot.consume(read + u64::from(self.capacity)) };

                    if self.config.enable_metrics {
                        self.metrics.add_pop();
                    }
                    return Some(value);
                }
                Err(current) => {
                    if self.config.enable_metrics {
                        self.metrics.add_claim_retry();
                    }
                    read = current;
                }
            }
        }
    }

    /// Slot holding logical position `pos` (non-detached queues only).
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn slot(&self, pos: u64) -> &Slot {
        &self.slots[(pos % u64::from(self.capacity)) as usize]
    }

    // ---------------------------------------------------------------------
    // CLONE & TRANSFER
    // ---------------------------------------------------------------------

    /// Creates a new, empty queue with the same shape.
    ///
    /// Only the capacity, wait strategy and metrics switch are copied; the
    /// values, stamps, indices and counters of `self` are not inspected.
    /// Cloning a detached queue yields a detached queue.
    pub fn empty_clone(&self) -> Self {
        trace::debug!(capacity = self.capacity, "queue shape cloned");
        if self.is_detached() {
            Self::detached(self.config)
        } else {
            Self::build(self.config, 0)
        }
    }

    /// Transfers the storage and both indices into a new queue.
    ///
    /// The returned queue holds every pending value in its original order.
    /// `self` is left detached: both indices read `0`, `capacity()` is `0`,
    /// `pop` returns `None`, `try_push` fails with
    /// [`TryPushError::Detached`] and `push` panics.
    ///
    /// A plain Rust move (`let b = a;`) relocates a queue without any of
    /// this; `take` is for owners that must keep the original binding.
    pub fn take(&mut self) -> Self {
        let read = self.read_index.load(Ordering::Acquire);
        let write = self.write_index.load(Ordering::Acquire);
        debug_assert_bounded_occupancy!(write - read, u64::from(self.capacity));

        let moved = Self {
            write_index: CachePadded::new(AtomicU64::new(write)),
            read_index: CachePadded::new(AtomicU64::new(read)),
            slots: std::mem::take(&mut self.slots),
            capacity: self.capacity,
            config: self.config,
            metrics: std::mem::take(&mut self.metrics),
        };

        self.read_index.store(0, Ordering::Release);
        self.write_index.store(0, Ordering::Release);
        self.capacity = 0;

        trace::debug!(
            capacity = moved.capacity,
            pending = write - read,
            "queue storage transferred"
        );
        moved
    }

    #[cfg(test)]
    pub(crate) fn with_start_index(config: Config, start: u64) -> Self {
        Self::build(config, start)
    }
}

/// Cloning produces an empty queue of the same shape; see [`Queue::empty_clone`].
impl Clone for Queue {
    fn clone(&self) -> Self {
        self.empty_clone()
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        // Unconsumed values are plain integers; they are discarded with the slots.
        if !self.is_detached() {
            trace::debug!(
                capacity = self.capacity,
                discarded = self.len(),
                "queue dropped"
            );
        }
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("capacity", &self.capacity)
            .field("read_index", &self.read_index())
            .field("write_index", &self.write_index())
            .field("wait", &self.config.wait)
            .finish_non_exhaustive()
    }
}
