// src/events/mod.rs
//! Event record model
//!
//! This module defines the wire format shared by the capture and delivery
//! sides:
//!
//! - **Kind**: numeric tags for the five lifecycle notification kinds
//! - **Record**: immutable, single-allocation encoded event records
//! - **Decode**: parsing records and walking packed drain buffers
//!
//! # Wire format
//!
//! Every record is a fixed 12-byte header (kind tag, total size, timestamp),
//! a kind-specific body, and an optional UTF-16LE trailing blob addressed by
//! an in-body offset/length pair. `total_size` is the sole framing mechanism:
//! a consumer walks a packed buffer by reading a header, dispatching on the
//! kind tag, and advancing by `total_size` until the byte count is exhausted.
//! All integers are little-endian; field order and sizes are a stable
//! contract, not an implementation detail.

pub mod decode;
pub mod kind;
pub mod record;

// Re-export commonly used types
pub use decode::{decode_packed, DecodedEvent, EventPayload, RecordWalker};
pub use kind::EventKind;
pub use record::{now_ticks, EventRecord, HEADER_SIZE};
