// src/events/record.rs
//! Immutable encoded event records
//!
//! A record is built exactly once, as a single contiguous allocation holding
//! header, body, and optional trailing text, and is never mutated afterwards.
//! Ownership moves from the producer into the queue and out again during a
//! drain; records are deliberately not `Clone`.

use crate::events::kind::EventKind;
use crate::utils::errors::{EngineError, Result};
use bytes::BufMut;
use chrono::Utc;

/// Byte size of the fixed record header (kind tag, total size, timestamp)
pub const HEADER_SIZE: usize = 12;

/// Fixed body size of a ProcessExit record, header included
pub const PROCESS_EXIT_SIZE: usize = HEADER_SIZE + 4;

/// Fixed body size of a ProcessCreate record, header included
pub const PROCESS_CREATE_SIZE: usize = HEADER_SIZE + 4 + 4 + 2 + 2;

/// Fixed body size of a ThreadCreate/ThreadExit record, header included
pub const THREAD_SIZE: usize = HEADER_SIZE + 4 + 4;

/// Fixed body size of an ImageLoad record, header included
pub const IMAGE_LOAD_SIZE: usize = HEADER_SIZE + 4 + 8 + 8 + 2 + 2;

/// Current time as 100 ns ticks since the Unix epoch
pub fn now_ticks() -> i64 {
    Utc::now()
        .timestamp_nanos_opt()
        .map(|ns| ns / 100)
        .unwrap_or(i64::MAX)
}

/// One immutable captured event: header, kind-specific body, and optional
/// UTF-16LE trailing text, fully encoded at construction
#[derive(Debug, PartialEq, Eq)]
pub struct EventRecord {
    buf: Vec<u8>,
}

impl EventRecord {
    /// Build a ProcessCreate record. `command_line` is optional text from
    /// the hook layer; empty text is recorded as absent.
    pub fn process_create(
        process_id: u32,
        parent_process_id: u32,
        command_line: Option<&str>,
        timestamp: i64,
    ) -> Result<Self> {
        let units = command_line.map_or(0, |s| capped_units(s, PROCESS_CREATE_SIZE));
        let total = PROCESS_CREATE_SIZE + units * 2;

        let mut buf = alloc_buf(total)?;
        put_header(&mut buf, EventKind::ProcessCreate, total, timestamp);
        buf.put_u32_le(process_id);
        buf.put_u32_le(parent_process_id);
        if units > 0 {
            buf.put_u16_le(units as u16);
            buf.put_u16_le(PROCESS_CREATE_SIZE as u16);
        } else {
            buf.put_u16_le(0);
            buf.put_u16_le(0);
        }
        if let Some(text) = command_line {
            put_utf16le(&mut buf, text, units);
        }

        Ok(Self { buf })
    }

    /// Build a ProcessExit record
    pub fn process_exit(process_id: u32, timestamp: i64) -> Result<Self> {
        let mut buf = alloc_buf(PROCESS_EXIT_SIZE)?;
        put_header(&mut buf, EventKind::ProcessExit, PROCESS_EXIT_SIZE, timestamp);
        buf.put_u32_le(process_id);

        Ok(Self { buf })
    }

    /// Build a ThreadCreate record
    pub fn thread_create(thread_id: u32, process_id: u32, timestamp: i64) -> Result<Self> {
        Self::thread_record(EventKind::ThreadCreate, thread_id, process_id, timestamp)
    }

    /// Build a ThreadExit record
    pub fn thread_exit(thread_id: u32, process_id: u32, timestamp: i64) -> Result<Self> {
        Self::thread_record(EventKind::ThreadExit, thread_id, process_id, timestamp)
    }

    /// Build an ImageLoad record. `image_path` is optional text from the
    /// hook layer; empty text is recorded as absent.
    pub fn image_load(
        process_id: u32,
        image_base: u64,
        image_size: u64,
        image_path: Option<&str>,
        timestamp: i64,
    ) -> Result<Self> {
        let units = image_path.map_or(0, |s| capped_units(s, IMAGE_LOAD_SIZE));
        let total = IMAGE_LOAD_SIZE + units * 2;

        let mut buf = alloc_buf(total)?;
        put_header(&mut buf, EventKind::ImageLoad, total, timestamp);
        buf.put_u32_le(process_id);
        buf.put_u64_le(image_base);
        buf.put_u64_le(image_size);
        if units > 0 {
            buf.put_u16_le(units as u16);
            buf.put_u16_le(IMAGE_LOAD_SIZE as u16);
        } else {
            buf.put_u16_le(0);
            buf.put_u16_le(0);
        }
        if let Some(text) = image_path {
            put_utf16le(&mut buf, text, units);
        }

        Ok(Self { buf })
    }

    fn thread_record(
        kind: EventKind,
        thread_id: u32,
        process_id: u32,
        timestamp: i64,
    ) -> Result<Self> {
        let mut buf = alloc_buf(THREAD_SIZE)?;
        put_header(&mut buf, kind, THREAD_SIZE, timestamp);
        buf.put_u32_le(thread_id);
        buf.put_u32_le(process_id);

        Ok(Self { buf })
    }

    /// Numeric kind tag from the header
    pub fn kind_tag(&self) -> u16 {
        read_u16_le(&self.buf, 0)
    }

    /// Decoded kind, `None` for tags this build does not know
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_tag(self.kind_tag())
    }

    /// Authoritative record length in bytes, header and trailing text
    /// included
    pub fn total_size(&self) -> usize {
        read_u16_le(&self.buf, 2) as usize
    }

    /// Capture time as 100 ns ticks since the Unix epoch
    pub fn timestamp(&self) -> i64 {
        read_i64_le(&self.buf, 4)
    }

    /// Full encoded byte image
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

/// Reserve the full record size up front so a record is one allocation and
/// construction can report allocation failure instead of aborting.
fn alloc_buf(total: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(total)
        .map_err(|e| EngineError::CaptureFailed(format!("record allocation failed: {}", e)))?;
    Ok(buf)
}

fn put_header(buf: &mut Vec<u8>, kind: EventKind, total: usize, timestamp: i64) {
    buf.put_u16_le(kind.tag());
    buf.put_u16_le(total as u16);
    buf.put_i64_le(timestamp);
}

/// UTF-16 code units in `text`, capped so `total_size` stays within its
/// u16 header field. Oversized text is truncated.
fn capped_units(text: &str, fixed_size: usize) -> usize {
    let max = (u16::MAX as usize - fixed_size) / 2;
    text.encode_utf16().count().min(max)
}

fn put_utf16le(buf: &mut Vec<u8>, text: &str, units: usize) {
    for unit in text.encode_utf16().take(units) {
        buf.put_u16_le(unit);
    }
}

pub(crate) fn read_u16_le(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

pub(crate) fn read_u32_le(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

pub(crate) fn read_u64_le(buf: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(bytes)
}

pub(crate) fn read_i64_le(buf: &[u8], at: usize) -> i64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[at..at + 8]);
    i64::from_le_bytes(bytes)
}
