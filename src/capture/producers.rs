// src/capture/producers.rs
//! Per-kind producer entry points
//!
//! The hook layer calls one entry point per notification kind. Each builds
//! an immutable record in a single allocation, stamps it with the current
//! time, and pushes it into the queue. Construction failure (allocation)
//! cannot propagate out of a notification context: the event is dropped and
//! logged, nothing else.

use crate::capture::queue::EventQueue;
use crate::events::record::{now_ticks, EventRecord};
use std::sync::Arc;
use tracing::warn;

/// Capture engine: the producer side of the event pipeline.
///
/// Cheap to clone; clones share the same queue. Identifiers supplied by the
/// hook layer are trusted as given and not validated.
#[derive(Clone)]
pub struct CaptureEngine {
    queue: Arc<EventQueue>,
}

impl CaptureEngine {
    /// Create an engine producing into `queue`
    pub fn new(queue: Arc<EventQueue>) -> Self {
        Self { queue }
    }

    /// Shared queue handle
    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    /// A process was created. `command_line` is optional text from the hook
    /// layer; absence degrades to a zero-length field, not an error.
    pub fn on_process_create(
        &self,
        process_id: u32,
        parent_process_id: u32,
        command_line: Option<&str>,
    ) {
        match EventRecord::process_create(process_id, parent_process_id, command_line, now_ticks())
        {
            Ok(record) => self.queue.push(record),
            Err(e) => warn!("dropped process create event for pid {}: {}", process_id, e),
        }
    }

    /// A process exited
    pub fn on_process_exit(&self, process_id: u32) {
        match EventRecord::process_exit(process_id, now_ticks()) {
            Ok(record) => self.queue.push(record),
            Err(e) => warn!("dropped process exit event for pid {}: {}", process_id, e),
        }
    }

    /// A thread was created
    pub fn on_thread_create(&self, thread_id: u32, process_id: u32) {
        match EventRecord::thread_create(thread_id, process_id, now_ticks()) {
            Ok(record) => self.queue.push(record),
            Err(e) => warn!("dropped thread create event for tid {}: {}", thread_id, e),
        }
    }

    /// A thread exited
    pub fn on_thread_exit(&self, thread_id: u32, process_id: u32) {
        match EventRecord::thread_exit(thread_id, process_id, now_ticks()) {
            Ok(record) => self.queue.push(record),
            Err(e) => warn!("dropped thread exit event for tid {}: {}", thread_id, e),
        }
    }

    /// An image (module) was mapped into a process. `image_path` is optional
    /// text from the hook layer.
    pub fn on_image_load(
        &self,
        process_id: u32,
        image_base: u64,
        image_size: u64,
        image_path: Option<&str>,
    ) {
        match EventRecord::image_load(process_id, image_base, image_size, image_path, now_ticks())
        {
            Ok(record) => self.queue.push(record),
            Err(e) => warn!("dropped image load event for pid {}: {}", process_id, e),
        }
    }
}
