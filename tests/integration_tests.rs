use seqring::{Broadcast, CancelToken, Queue, ReaderCallback, RingConfig};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_fifo_ordering_single_producer_consumer() {
    let queue = Queue::with_capacity(16).unwrap();

    for i in 0..5 {
        assert!(queue.try_enqueue(i), "enqueue {i} failed");
    }
    for expected in 0..5 {
        assert_eq!(queue.try_dequeue(), Some(expected));
    }
    assert_eq!(queue.try_dequeue(), None);
}

#[test]
fn test_fifo_ordering_threaded_spsc() {
    const N: u64 = 10_000;

    let queue = Queue::with_capacity(1024).unwrap();
    let producer_queue = queue.clone();

    let producer = thread::spawn(move || {
        for i in 0..N {
            producer_queue.enqueue(i).unwrap();
        }
    });

    let mut expected = 0;
    while expected < N {
        if let Some(value) = queue.try_dequeue() {
            assert_eq!(value, expected, "FIFO violation");
            expected += 1;
        } else {
            thread::yield_now();
        }
    }

    producer.join().unwrap();
    assert_eq!(queue.try_dequeue(), None);
}

#[test]
fn test_full_queue_rejects_then_recovers() {
    let queue = Queue::with_capacity(4).unwrap();

    for i in 0..4 {
        assert!(queue.try_enqueue(format!("item-{i}")));
    }
    assert!(!queue.try_enqueue("overflow".to_string()));

    assert_eq!(queue.try_dequeue().as_deref(), Some("item-0"));
    assert!(queue.try_enqueue("new".to_string()));
}

#[test]
fn test_spmc_union_no_duplicates() {
    const N: u64 = 10_000;
    const CONSUMERS: usize = 4;

    let queue = Queue::with_capacity(1024).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let mut consumers = Vec::new();
    for _ in 0..CONSUMERS {
        let queue = queue.clone();
        let done = Arc::clone(&done);
        consumers.push(thread::spawn(move || {
            let mut seen = Vec::new();
            loop {
                match queue.try_dequeue() {
                    Some(value) => seen.push(value),
                    None if done.load(Ordering::Acquire) => break,
                    None => thread::yield_now(),
                }
            }
            seen
        }));
    }

    for i in 1..=N {
        queue.enqueue(i).unwrap();
    }
    // Let consumers finish the tail before flagging completion.
    while !queue.is_empty() {
        thread::yield_now();
    }
    done.store(true, Ordering::Release);

    let mut union = HashSet::new();
    let mut total = 0usize;
    for consumer in consumers {
        for value in consumer.join().unwrap() {
            assert!(union.insert(value), "duplicate delivery of {value}");
            total += 1;
        }
    }
    assert_eq!(total, N as usize);
    assert_eq!(union.len(), N as usize);
    assert!(union.contains(&1) && union.contains(&N));
}

#[test]
fn test_mpmc_exactly_once() {
    const PRODUCERS: u64 = 4;
    const CONSUMERS: usize = 4;
    const PER_PRODUCER: u64 = 5_000;

    let queue = Queue::with_capacity(256).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let mut consumers = Vec::new();
    for _ in 0..CONSUMERS {
        let queue = queue.clone();
        let done = Arc::clone(&done);
        consumers.push(thread::spawn(move || {
            let mut seen = Vec::new();
            loop {
                match queue.try_dequeue() {
                    Some(value) => seen.push(value),
                    None if done.load(Ordering::Acquire) => break,
                    None => thread::yield_now(),
                }
            }
            seen
        }));
    }

    let mut producers = Vec::new();
    for producer_id in 0..PRODUCERS {
        let queue = queue.clone();
        producers.push(thread::spawn(move || {
            for i in 0..PER_PRODUCER {
                queue.enqueue(producer_id * PER_PRODUCER + i).unwrap();
            }
        }));
    }
    for producer in producers {
        producer.join().unwrap();
    }
    while !queue.is_empty() {
        thread::yield_now();
    }
    done.store(true, Ordering::Release);

    let mut union = HashSet::new();
    let mut total = 0usize;
    for consumer in consumers {
        for value in consumer.join().unwrap() {
            assert!(union.insert(value), "duplicate delivery of {value}");
            total += 1;
        }
    }
    assert_eq!(total, (PRODUCERS * PER_PRODUCER) as usize);
}

// Stress: capacity 256, 4 producers vs 4 consumers moving 1M items. Every
// blocking enqueue must land inside the backoff budget.
#[test]
fn test_bounded_contention_under_stress() {
    const PRODUCERS: u64 = 4;
    const CONSUMERS: usize = 4;
    const PER_PRODUCER: u64 = 250_000;

    let queue = Queue::with_capacity(256).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let mut consumers = Vec::new();
    for _ in 0..CONSUMERS {
        let queue = queue.clone();
        let done = Arc::clone(&done);
        consumers.push(thread::spawn(move || {
            let mut count = 0u64;
            loop {
                match queue.try_dequeue() {
                    Some(_) => count += 1,
                    None if done.load(Ordering::Acquire) => break,
                    None => thread::yield_now(),
                }
            }
            count
        }));
    }

    let mut producers = Vec::new();
    for _ in 0..PRODUCERS {
        let queue = queue.clone();
        producers.push(thread::spawn(move || {
            for i in 0..PER_PRODUCER {
                queue
                    .enqueue(i)
                    .expect("backoff budget exhausted under stress");
            }
        }));
    }
    for producer in producers {
        producer.join().unwrap();
    }
    while !queue.is_empty() {
        thread::yield_now();
    }
    done.store(true, Ordering::Release);

    let received: u64 = consumers.into_iter().map(|c| c.join().unwrap()).sum();
    assert_eq!(received, PRODUCERS * PER_PRODUCER);
}

#[test]
fn test_broadcast_two_readers_see_all_in_order() {
    let cancel = CancelToken::new();
    let (tx_f, rx_f) = mpsc::channel();
    let (tx_g, rx_g) = mpsc::channel();

    let readers: Vec<ReaderCallback<i32>> = vec![
        Box::new(move |v| tx_f.send(v).unwrap()),
        Box::new(move |v| tx_g.send(v).unwrap()),
    ];
    let ring = Broadcast::with_capacity(cancel.clone(), 8, readers).unwrap();

    for i in 0..5 {
        ring.enqueue(i).unwrap();
    }

    for rx in [rx_f, rx_g] {
        for expected in 0..5 {
            assert_eq!(
                rx.recv_timeout(Duration::from_secs(5)).unwrap(),
                expected,
                "reader out of order"
            );
        }
    }

    cancel.cancel();
    ring.join();
}

#[test]
fn test_broadcast_many_items_per_reader() {
    const READERS: usize = 3;
    const N: u64 = 10_000;

    let cancel = CancelToken::new();
    let mut receivers = Vec::new();
    let mut readers: Vec<ReaderCallback<u64>> = Vec::new();
    for _ in 0..READERS {
        let (tx, rx) = mpsc::channel();
        readers.push(Box::new(move |v| tx.send(v).unwrap()));
        receivers.push(rx);
    }

    let ring = Broadcast::with_capacity(cancel.clone(), 64, readers).unwrap();
    let writer = thread::spawn(move || {
        for i in 0..N {
            ring.enqueue(i).unwrap();
        }
        ring
    });

    for rx in &receivers {
        for expected in 0..N {
            assert_eq!(
                rx.recv_timeout(Duration::from_secs(10)).unwrap(),
                expected
            );
        }
    }

    let ring = writer.join().unwrap();
    cancel.cancel();
    ring.join();
}

#[test]
fn test_broadcast_writer_gated_by_slowest_reader() {
    let cancel = CancelToken::new();
    let (tx, rx) = mpsc::channel();
    let gate = Arc::new(AtomicBool::new(false));
    let reader_gate = Arc::clone(&gate);

    // A reader that refuses to start until the gate opens.
    let readers: Vec<ReaderCallback<u64>> = vec![Box::new(move |v| {
        while !reader_gate.load(Ordering::Acquire) {
            thread::yield_now();
        }
        tx.send(v).unwrap();
    })];
    let ring = Broadcast::with_capacity(cancel.clone(), 4, readers).unwrap();

    for i in 0..4 {
        assert!(ring.try_enqueue(i), "enqueue {i} failed");
    }
    // Worker may have reserved a batch but cannot finish it; the ring stays
    // full from the writer's point of view until the reader advances.
    assert!(!ring.try_enqueue(99));

    gate.store(true, Ordering::Release);
    for expected in 0..4 {
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), expected);
    }

    cancel.cancel();
    ring.join();
}

#[test]
fn test_queue_drains_after_shutdown_signal() {
    // The queue has no workers; after an external shutdown decision the
    // remaining items stay dequeuable.
    let cancel = CancelToken::new();
    let queue = Queue::new(RingConfig::new(8).unwrap());

    for i in 0..6 {
        assert!(queue.try_enqueue(i));
    }
    cancel.cancel();

    let mut pending = Vec::new();
    let drained = queue.drain(|v| pending.push(v));
    assert_eq!(drained, 6);
    assert_eq!(pending, vec![0, 1, 2, 3, 4, 5]);
    assert!(queue.is_empty());
}
