//! RingMPMC - Bounded Lock-Free Multi-Producer Multi-Consumer Queue
//!
//! A fixed-capacity ring buffer of `i32` values that any number of threads can
//! push into and pop from without locks. Producers reserve a logical position
//! with a compare-and-swap on the write index, then publish through a per-slot
//! readiness stamp; consumers claim positions with a compare-and-swap on the
//! read index and release the slot for the next lap.
//!
//! # Key Features
//!
//! - Linearizable FIFO: the n-th reserved push is the n-th claimed pop
//! - Bounded occupancy: `write_index - read_index ≤ capacity` at every instant
//! - Non-blocking `pop`, spinning `push` with a pluggable [`WaitStrategy`]
//! - Any capacity from 1 to [`MAX_CAPACITY`]; cache-padded indices reported as wrap-safe u32 counters
//! - Shape cloning ([`Queue::empty_clone`]) and storage transfer ([`Queue::take`])
//!
//! # Example
//!
//! ```
//! use ringmpmc::Queue;
//! use std::thread;
//!
//! let queue = Queue::new(256)?;
//!
//! thread::scope(|s| {
//!     s.spawn(|| {
//!         for i in 0..1_000 {
//!             queue.push(i);
//!         }
//!     });
//!
//!     let mut received = 0;
//!     while received < 1_000 {
//!         match queue.pop() {
//!             Some(_) => received += 1,
//!             None => thread::yield_now(),
//!         }
//!     }
//! });
//!
//! assert!(queue.is_empty());
//! # Ok::<(), ringmpmc::QueueError>(())
//! ```

mod backoff;
mod config;
mod error;
mod invariants;
mod metrics;
mod queue;
mod slot;
mod sync;
mod trace;

pub use backoff::WaitStrategy;
pub use config::{Config, HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG, MAX_CAPACITY};
pub use error::{QueueError, TryPushError};
pub use metrics::MetricsSnapshot;
pub use queue::Queue;
pub use trace::init_tracing;
