use crate::{QueueError, WaitStrategy};

/// Largest supported capacity (2^30 slots, 16 GiB of slot storage).
pub const MAX_CAPACITY: u32 = 1 << 30;

/// Configuration for [`Queue`](crate::Queue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of slots, in `1..=MAX_CAPACITY`.
    pub capacity: u32,
    /// How blocked producers wait (default: yield between attempts).
    pub wait: WaitStrategy,
    /// Enable metrics collection (slight overhead)
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a configuration with the given capacity and default settings.
    pub const fn new(capacity: u32) -> Self {
        Self {
            capacity,
            wait: WaitStrategy::Yield,
            enable_metrics: false,
        }
    }

    /// Sets the wait strategy used by blocking pushes.
    pub const fn with_wait(mut self, wait: WaitStrategy) -> Self {
        self.wait = wait;
        self
    }

    /// Enables or disables metrics collection.
    pub const fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Checks the capacity constraints.
    pub fn validate(&self) -> Result<(), QueueError> {
        let capacity = self.capacity;
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        if capacity > MAX_CAPACITY {
            return Err(QueueError::CapacityTooLarge {
                capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Low latency configuration (1K slots, pure spinning)
pub const LOW_LATENCY_CONFIG: Config = Config::new(1 << 10).with_wait(WaitStrategy::Spin);

/// High throughput configuration (64K slots, adaptive backoff)
pub const HIGH_THROUGHPUT_CONFIG: Config = Config::new(1 << 16).with_wait(WaitStrategy::Backoff);
