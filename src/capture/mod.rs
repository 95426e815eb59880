// src/capture/mod.rs
//! Event capture and delivery
//!
//! This module is the core of the engine:
//!
//! - **Event Queue**: bounded FIFO buffer with oldest-first eviction
//! - **Capture Engine**: per-kind producer entry points for the hook layer
//!
//! # Architecture
//!
//! ```text
//! Hook Layer → CaptureEngine::on_* → EventRecord (single allocation)
//!                                         ↓
//!                                  EventQueue::push (evict oldest when full)
//!                                         ↓
//!                                  EventQueue::drain_into ← consumer poll
//! ```
//!
//! Producers run in concurrent notification contexts; one queue lock
//! serializes them against each other and against drains. Records observed
//! by any drain appear in the exact order their pushes acquired the lock.

pub mod producers;
pub mod queue;

// Re-export commonly used types
pub use producers::CaptureEngine;
pub use queue::{EventQueue, QueueStats};
