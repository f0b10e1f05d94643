//! Loom-based concurrency tests for ringmpmc.
//!
//! Run with: `cargo test -p ringmpmc --features loom --test loom_tests --release`
//!
//! With the `loom` feature the queue itself is built on loom's atomics and
//! cells, so these tests explore every interleaving of the real push and pop
//! paths, including the slot stamp handshake and both CAS races. Queues and
//! thread counts stay tiny to keep the state space tractable.

#![cfg(feature = "loom")]

use loom::sync::Arc;
use loom::thread;
use ringmpmc::Queue;

/// Pops until `n` values arrive, yielding to loom between empty polls.
fn pop_n(queue: &Queue, n: usize) -> Vec<i32> {
    let mut received = Vec::with_capacity(n);
    while received.len() < n {
        match queue.pop() {
            Some(v) => received.push(v),
            None => thread::yield_now(),
        }
    }
    received
}

/// Single producer, single consumer: values arrive once and in order.
#[test]
fn loom_spsc_fifo() {
    loom::model(|| {
        let queue = Arc::new(Queue::new(2).unwrap());
        let q = Arc::clone(&queue);

        let producer = thread::spawn(move || {
            q.push(1);
            q.push(2);
        });

        let received = pop_n(&queue, 2);
        producer.join().unwrap();

        assert_eq!(received, vec![1, 2]);
        assert!(queue.is_empty());
    });
}

/// Two producers race for reservations: both values arrive exactly once.
#[test]
fn loom_two_producers() {
    loom::model(|| {
        let queue = Arc::new(Queue::new(2).unwrap());

        let producers: Vec<_> = [10, 20]
            .into_iter()
            .map(|v| {
                let q = Arc::clone(&queue);
                thread::spawn(move || q.push(v))
            })
            .collect();

        let mut received = pop_n(&queue, 2);
        for p in producers {
            p.join().unwrap();
        }

        received.sort_unstable();
        assert_eq!(received, vec![10, 20]);
    });
}

/// Two producers race on a three-slot queue while one consumer drains it:
/// each producer's values come out in the order that producer pushed them.
#[test]
fn loom_two_producers_keep_their_order() {
    loom::model(|| {
        let queue = Arc::new(Queue::new(3).unwrap());

        let producers: Vec<_> = [[1, 2], [11, 12]]
            .into_iter()
            .map(|values| {
                let q = Arc::clone(&queue);
                thread::spawn(move || {
                    for v in values {
                        q.push(v);
                    }
                })
            })
            .collect();

        let received = pop_n(&queue, 4);
        for p in producers {
            p.join().unwrap();
        }

        let position = |v: i32| received.iter().position(|&r| r == v).unwrap();
        assert!(position(1) < position(2), "producer 0 reordered: {received:?}");
        assert!(position(11) < position(12), "producer 1 reordered: {received:?}");
        assert!(queue.is_empty());
    });
}

/// Two consumers race for claims: no value is returned twice.
#[test]
fn loom_two_consumers() {
    loom::model(|| {
        let queue = Arc::new(Queue::new(2).unwrap());
        queue.push(1);
        queue.push(2);

        let consumers: Vec<_> = (0..2)
            .map(|_| {
                let q = Arc::clone(&queue);
                thread::spawn(move || q.pop())
            })
            .collect();

        let mut received: Vec<i32> = consumers
            .into_iter()
            .filter_map(|c| c.join().unwrap())
            .collect();
        // Any value a consumer missed is still in the queue
        received.extend(std::iter::from_fn(|| queue.pop()));

        received.sort_unstable();
        assert_eq!(received, vec![1, 2]);
    });
}

/// A one-slot queue forces every push to reuse the slot the consumer just
/// released, exercising the wait on the previous lap's stamp.
#[test]
fn loom_slot_reuse_across_laps() {
    loom::model(|| {
        let queue = Arc::new(Queue::new(1).unwrap());
        let q = Arc::clone(&queue);

        let producer = thread::spawn(move || {
            q.push(1);
            q.push(2);
        });

        let received = pop_n(&queue, 2);
        producer.join().unwrap();

        assert_eq!(received, vec![1, 2]);
        assert_eq!(queue.read_index(), 2);
        assert_eq!(queue.write_index(), 2);
    });
}

/// A full queue rejects try_push until a consumer frees a slot.
#[test]
fn loom_try_push_full() {
    loom::model(|| {
        let queue = Arc::new(Queue::new(1).unwrap());
        queue.try_push(1).unwrap();
        assert!(queue.try_push(2).unwrap_err().is_full());

        let q = Arc::clone(&queue);
        let consumer = thread::spawn(move || q.pop());

        let pushed = queue.try_push(3).is_ok();
        let first = consumer.join().unwrap();

        assert_eq!(first, Some(1));
        if pushed {
            assert_eq!(queue.pop(), Some(3));
        }
        assert_eq!(queue.pop(), None);
    });
}
