use seqring::{Broadcast, CancelToken, Queue, ReaderCallback};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() {
    println!("seqring Basic Example");
    println!("=====================\n");

    queue_demo();
    broadcast_demo();
}

fn queue_demo() {
    const N_PRODUCERS: u64 = 4;
    const ITEMS_PER_PRODUCER: u64 = 1_000_000;

    println!("MPMC queue:");
    println!("  Producers: {}", N_PRODUCERS);
    println!("  Items per producer: {}", ITEMS_PER_PRODUCER);

    let queue = Queue::with_capacity(4096).unwrap();
    let start = Instant::now();

    let mut handles = vec![];
    for id in 0..N_PRODUCERS {
        let queue = queue.clone();
        handles.push(thread::spawn(move || {
            for i in 0..ITEMS_PER_PRODUCER {
                queue.enqueue(id * ITEMS_PER_PRODUCER + i).unwrap();
            }
        }));
    }

    let total = N_PRODUCERS * ITEMS_PER_PRODUCER;
    let mut received = 0u64;
    let mut sum = 0u64;
    while received < total {
        if let Some(value) = queue.try_dequeue() {
            sum += value;
            received += 1;
        } else {
            thread::yield_now();
        }
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let elapsed = start.elapsed();
    println!("  Received {} items (sum {}) in {:?}", received, sum, elapsed);
    println!(
        "  Throughput: {:.1}M items/sec\n",
        total as f64 / elapsed.as_secs_f64() / 1e6
    );
}

fn broadcast_demo() {
    const N_READERS: usize = 3;
    const ITEMS: u64 = 1_000_000;

    println!("Broadcast ring:");
    println!("  Readers: {}", N_READERS);
    println!("  Items: {}", ITEMS);

    let cancel = CancelToken::new();
    let counters: Vec<Arc<AtomicU64>> = (0..N_READERS)
        .map(|_| Arc::new(AtomicU64::new(0)))
        .collect();

    let readers: Vec<ReaderCallback<u64>> = counters
        .iter()
        .map(|counter| {
            let counter = Arc::clone(counter);
            Box::new(move |_: u64| {
                counter.fetch_add(1, Ordering::Relaxed);
            }) as ReaderCallback<u64>
        })
        .collect();

    let ring = Broadcast::with_capacity(cancel.clone(), 4096, readers).unwrap();
    let start = Instant::now();

    for i in 0..ITEMS {
        ring.enqueue(i).unwrap();
    }
    while ring.lag() > 0 {
        thread::yield_now();
    }

    let elapsed = start.elapsed();
    for (id, counter) in counters.iter().enumerate() {
        println!(
            "  Reader {} delivered {} items",
            id,
            counter.load(Ordering::Relaxed)
        );
    }
    println!(
        "  Throughput: {:.1}M items/sec",
        ITEMS as f64 / elapsed.as_secs_f64() / 1e6
    );

    cancel.cancel();
    ring.join();
}
