//! Demonstration of ringmpmc: one producer, several consumers, drain on shutdown.
//!
//! Run with: `cargo run -p ringmpmc --features demo --bin ringmpmc-demo`
//! With logs: `RUST_LOG=ringmpmc=debug cargo run -p ringmpmc --features demo,tracing --bin ringmpmc-demo`

use rand::Rng;
use ringmpmc::{Config, Queue};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

const CONSUMERS_COUNT: usize = 2;
const QUEUE_CAPACITY: u32 = 256;
const AMOUNT_OF_PRODUCED_VALUES: u32 = 10_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    ringmpmc::init_tracing();

    let queue = Queue::with_config(Config::new(QUEUE_CAPACITY).with_metrics(true))?;
    let shutdown = AtomicBool::new(false);
    let produced_sum = AtomicU64::new(0);
    let consumed_sum = AtomicU64::new(0);
    let consumed_count = AtomicU64::new(0);

    thread::scope(|s| {
        // Producer: pushes pseudo-random values, then raises the shutdown flag
        s.spawn(|| {
            let mut rng = rand::thread_rng();
            let mut sum = 0u64;
            for _ in 0..AMOUNT_OF_PRODUCED_VALUES {
                let value: i32 = rng.gen_range(0..1000);
                sum += value as u64;
                queue.push(value);
            }
            produced_sum.store(sum, Ordering::Relaxed);
            shutdown.store(true, Ordering::Release);
        });

        for id in 0..CONSUMERS_COUNT {
            let queue = &queue;
            let shutdown = &shutdown;
            let consumed_sum = &consumed_sum;
            let consumed_count = &consumed_count;
            s.spawn(move || loop {
                if let Some(value) = queue.pop() {
                    println!("Consumer #{id} popped value: {value}");
                    consumed_sum.fetch_add(value as u64, Ordering::Relaxed);
                    consumed_count.fetch_add(1, Ordering::Relaxed);
                } else if shutdown.load(Ordering::Acquire) && queue.is_empty() {
                    break; // done
                } else {
                    thread::yield_now(); // wait for more work
                }
            });
        }
    });

    let metrics = queue.metrics();
    println!("\n=== Summary ===");
    println!("  Produced: {AMOUNT_OF_PRODUCED_VALUES}");
    println!("  Consumed: {}", consumed_count.load(Ordering::Relaxed));
    println!("  Empty pops: {}", metrics.empty_pops);
    println!("  Full waits: {}", metrics.full_waits);
    println!("  Claim retries: {}", metrics.claim_retries);

    let consumed = consumed_count.load(Ordering::Relaxed);
    if consumed != u64::from(AMOUNT_OF_PRODUCED_VALUES)
        || consumed_sum.load(Ordering::Relaxed) != produced_sum.load(Ordering::Relaxed)
    {
        return Err(format!(
            "consumed {consumed} values, expected {AMOUNT_OF_PRODUCED_VALUES} with matching sum"
        )
        .into());
    }

    println!("\n=== Every value consumed exactly once ===");
    Ok(())
}
