// src/capture/queue.rs
//! Bounded event queue with FIFO eviction
//!
//! A single mutex serializes every mutation: producers pushing from
//! concurrent notification contexts, and consumers draining. When the queue
//! is full the oldest record is evicted, never a record chosen by kind or
//! size, so memory stays bounded under sustained event rates at the cost of
//! completeness.

use crate::events::record::EventRecord;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bounded FIFO queue of event records
pub struct EventQueue {
    /// Records, oldest at the front
    records: Mutex<VecDeque<EventRecord>>,

    /// Capacity ceiling in records
    capacity: usize,

    /// Total records pushed
    push_count: AtomicU64,

    /// Total records drained to a consumer
    drain_count: AtomicU64,

    /// Total records evicted (queue full)
    evict_count: AtomicU64,
}

impl EventQueue {
    /// Create a queue holding at most `capacity` records
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");

        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            push_count: AtomicU64::new(0),
            drain_count: AtomicU64::new(0),
            evict_count: AtomicU64::new(0),
        }
    }

    /// Append a record, evicting the oldest record first when the queue is
    /// full. The queue never holds more than `capacity` records.
    pub fn push(&self, record: EventRecord) {
        let mut records = self.records.lock();

        if records.len() == self.capacity {
            records.pop_front();
            self.evict_count.fetch_add(1, Ordering::Relaxed);
        }

        records.push_back(record);
        self.push_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Drain whole records into `dst` in FIFO order and return the number of
    /// bytes written.
    ///
    /// The scan is atomic with respect to pushes and other drains: the lock
    /// is held for the whole operation. Records are copied back-to-back as
    /// their encoded byte images; the first record whose `total_size`
    /// exceeds the remaining space stays at the head for a later call, so a
    /// record is never split or truncated. A destination smaller than the
    /// head record yields 0 bytes written with the queue unchanged, which is
    /// an idle result, not an error.
    pub fn drain_into(&self, dst: &mut [u8]) -> usize {
        let mut records = self.records.lock();
        let mut written = 0;

        while let Some(head) = records.front() {
            let size = head.total_size();
            if written + size > dst.len() {
                break;
            }

            dst[written..written + size].copy_from_slice(head.as_bytes());
            written += size;

            // the record's storage is released here
            records.pop_front();
            self.drain_count.fetch_add(1, Ordering::Relaxed);
        }

        written
    }

    /// Current number of queued records
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the queue holds no records
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Capacity ceiling in records
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get queue statistics
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            push_count: self.push_count.load(Ordering::Relaxed),
            drain_count: self.drain_count.load(Ordering::Relaxed),
            evict_count: self.evict_count.load(Ordering::Relaxed),
            current_len: self.len(),
            capacity: self.capacity,
        }
    }
}

/// Queue statistics snapshot
#[derive(Debug, Clone)]
pub struct QueueStats {
    /// Total records pushed
    pub push_count: u64,

    /// Total records drained
    pub drain_count: u64,

    /// Total records evicted
    pub evict_count: u64,

    /// Records currently queued
    pub current_len: usize,

    /// Queue capacity
    pub capacity: usize,
}

impl QueueStats {
    /// Calculate fill percentage
    pub fn fill_percentage(&self) -> f64 {
        (self.current_len as f64 / self.capacity as f64) * 100.0
    }

    /// Calculate eviction rate
    pub fn evict_rate(&self) -> f64 {
        if self.push_count == 0 {
            0.0
        } else {
            (self.evict_count as f64 / self.push_count as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::decode::{decode_packed, EventPayload};
    use std::sync::Arc;

    fn exit_record(pid: u32) -> EventRecord {
        EventRecord::process_exit(pid, pid as i64).unwrap()
    }

    fn drained_pids(packed: &[u8]) -> Vec<u32> {
        decode_packed(packed)
            .unwrap()
            .into_iter()
            .map(|event| match event.payload {
                EventPayload::ProcessExit { process_id } => process_id,
                other => panic!("unexpected payload: {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_queue_creation() {
        let queue = EventQueue::new(100);
        assert_eq!(queue.capacity(), 100);
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn test_zero_capacity_panics() {
        EventQueue::new(0);
    }

    #[test]
    fn test_fifo_order() {
        let queue = EventQueue::new(16);
        for pid in 0..10 {
            queue.push(exit_record(pid));
        }

        let mut buffer = [0u8; 4096];
        let written = queue.drain_into(&mut buffer);

        assert_eq!(drained_pids(&buffer[..written]), (0..10).collect::<Vec<_>>());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_eviction_keeps_newest() {
        let queue = EventQueue::new(3);
        for pid in 1..=5 {
            queue.push(exit_record(pid));
        }

        assert_eq!(queue.len(), 3);

        let mut buffer = [0u8; 4096];
        let written = queue.drain_into(&mut buffer);

        // records 1 and 2 were evicted, never observed
        assert_eq!(drained_pids(&buffer[..written]), vec![3, 4, 5]);

        let stats = queue.stats();
        assert_eq!(stats.push_count, 5);
        assert_eq!(stats.evict_count, 2);
    }

    #[test]
    fn test_at_capacity_boundary() {
        let queue = EventQueue::new(3);
        for pid in 1..=3 {
            queue.push(exit_record(pid));
        }

        // exactly full, nothing evicted yet
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.stats().evict_count, 0);

        // one more evicts exactly the oldest; the queue never exceeds capacity
        queue.push(exit_record(4));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.stats().evict_count, 1);

        let mut buffer = [0u8; 4096];
        let written = queue.drain_into(&mut buffer);
        assert_eq!(drained_pids(&buffer[..written]), vec![2, 3, 4]);
    }

    #[test]
    fn test_partial_fit_keeps_head() {
        let queue = EventQueue::new(16);
        queue.push(exit_record(1));
        queue.push(exit_record(2));

        let record_size = EventRecord::process_exit(0, 0).unwrap().total_size();

        // room for exactly one record
        let mut buffer = vec![0u8; record_size];
        let written = queue.drain_into(&mut buffer);

        assert_eq!(written, record_size);
        assert_eq!(drained_pids(&buffer[..written]), vec![1]);
        assert_eq!(queue.len(), 1);

        // the second record was preserved at the head
        let written = queue.drain_into(&mut buffer);
        assert_eq!(drained_pids(&buffer[..written]), vec![2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_too_small_destination_writes_nothing() {
        let queue = EventQueue::new(16);
        queue.push(exit_record(1));

        let record_size = EventRecord::process_exit(0, 0).unwrap().total_size();
        let mut buffer = vec![0u8; record_size - 1];

        assert_eq!(queue.drain_into(&mut buffer), 0);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_zero_byte_destination() {
        let queue = EventQueue::new(16);
        queue.push(exit_record(1));

        let mut buffer = [0u8; 0];
        assert_eq!(queue.drain_into(&mut buffer), 0);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_single_delivery_per_record() {
        let queue = EventQueue::new(16);
        queue.push(exit_record(1));

        let mut buffer = [0u8; 4096];
        let written = queue.drain_into(&mut buffer);
        assert_eq!(drained_pids(&buffer[..written]), vec![1]);

        // a drained record is never re-emitted
        assert_eq!(queue.drain_into(&mut buffer), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_empty_queue() {
        let queue = EventQueue::new(16);
        let mut buffer = [0u8; 4096];
        assert_eq!(queue.drain_into(&mut buffer), 0);
    }

    #[test]
    fn test_stats() {
        let queue = EventQueue::new(16);
        queue.push(exit_record(1));
        queue.push(exit_record(2));

        let mut buffer = [0u8; 4096];
        queue.drain_into(&mut buffer);

        let stats = queue.stats();
        assert_eq!(stats.push_count, 2);
        assert_eq!(stats.drain_count, 2);
        assert_eq!(stats.evict_count, 0);
        assert_eq!(stats.current_len, 0);
        assert_eq!(stats.evict_rate(), 0.0);
    }

    #[test]
    fn test_concurrent_pushes() {
        use std::thread;

        let queue = Arc::new(EventQueue::new(512));
        let mut handles = vec![];

        // Spawn 10 producer threads
        for i in 0..10u32 {
            let q = Arc::clone(&queue);
            let handle = thread::spawn(move || {
                for j in 0..100u32 {
                    q.push(exit_record(i * 100 + j));
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = queue.stats();
        assert_eq!(stats.push_count, 1000);
        assert_eq!(stats.current_len, 512);
        assert_eq!(stats.evict_count, 1000 - 512);
    }

    #[test]
    fn test_concurrent_pushes_and_drains() {
        use std::thread;

        let queue = Arc::new(EventQueue::new(256));
        let mut producers = vec![];

        for i in 0..4u32 {
            let q = Arc::clone(&queue);
            producers.push(thread::spawn(move || {
                for j in 0..250u32 {
                    q.push(exit_record(i * 1000 + j));
                }
            }));
        }

        let drainer = {
            let q = Arc::clone(&queue);
            thread::spawn(move || {
                let mut buffer = vec![0u8; 8192];
                let mut drained = 0u64;
                loop {
                    let written = q.drain_into(&mut buffer);
                    if written == 0 {
                        if q.stats().push_count == 1000 && q.is_empty() {
                            break;
                        }
                        thread::yield_now();
                        continue;
                    }
                    drained += decode_packed(&buffer[..written]).unwrap().len() as u64;
                }
                drained
            })
        };

        for handle in producers {
            handle.join().unwrap();
        }
        let drained = drainer.join().unwrap();

        // every pushed record was either delivered exactly once or evicted
        let stats = queue.stats();
        assert_eq!(stats.push_count, 1000);
        assert_eq!(drained, stats.drain_count);
        assert_eq!(stats.drain_count + stats.evict_count, 1000);
    }
}
