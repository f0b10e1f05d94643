use crate::sync::{spin_loop, yield_now};

/// How a thread waits between attempts when the queue cannot make progress.
///
/// Every strategy keeps the thread runnable: there is no parking or
/// condition-variable tier, so a waiting producer always re-checks the queue
/// on its next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitStrategy {
    /// Yield to the OS scheduler between attempts.
    #[default]
    Yield,
    /// Issue a CPU spin hint between attempts. Lowest latency, burns a core.
    Spin,
    /// Adaptive backoff: exponentially longer runs of spin hints, then yield.
    Backoff,
}

impl WaitStrategy {
    /// Creates the per-wait state for this strategy.
    #[inline]
    pub(crate) fn waiter(self) -> Waiter {
        Waiter {
            strategy: self,
            backoff: Backoff::new(),
        }
    }
}

/// Wait state for one blocking loop (a single push).
#[derive(Debug)]
pub(crate) struct Waiter {
    strategy: WaitStrategy,
    backoff: Backoff,
}

impl Waiter {
    #[inline]
    pub(crate) fn wait(&mut self) {
        match self.strategy {
            WaitStrategy::Yield => yield_now(),
            WaitStrategy::Spin => spin_loop(),
            WaitStrategy::Backoff => self.backoff.snooze(),
        }
    }

    /// Called once a wait condition is satisfied, before the next one starts.
    #[inline]
    pub(crate) fn reset(&mut self) {
        self.backoff.reset();
    }
}

/// Spin-then-yield escalation behind [`WaitStrategy::Backoff`].
///
/// Step `k` issues `2^k` spin hints up to `SPIN_LIMIT`, after which every
/// snooze is a single yield. The step stops counting at `YIELD_LIMIT + 1`.
#[derive(Debug, Default)]
struct Backoff {
    step: u32,
}

impl Backoff {
    const SPIN_LIMIT: u32 = 6; // 2^6 = 64 spins max before yielding
    const YIELD_LIMIT: u32 = 10;

    const fn new() -> Self {
        Self { step: 0 }
    }

    #[inline]
    fn snooze(&mut self) {
        if self.step <= Self::SPIN_LIMIT {
            for _ in 0..1u32 << self.step {
                spin_loop();
            }
        } else {
            yield_now();
        }
        if self.step <= Self::YIELD_LIMIT {
            self.step += 1;
        }
    }

    #[inline]
    fn reset(&mut self) {
        self.step = 0;
    }

    #[cfg(test)]
    fn is_saturated(&self) -> bool {
        self.step > Self::YIELD_LIMIT
    }
}
