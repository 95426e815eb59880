// src/events/decode.rs
//! Decoding packed event buffers
//!
//! A drain result is a flat byte sequence of zero or more back-to-back
//! records, each self-describing via the `total_size` header field. The
//! walker advances by that length only; no separators or external index
//! exist. Records carrying a kind tag this build does not know are skipped,
//! letting newer producers and older consumers coexist.

use crate::events::kind::EventKind;
use crate::events::record::{
    read_i64_le, read_u16_le, read_u32_le, read_u64_le, HEADER_SIZE, IMAGE_LOAD_SIZE,
    PROCESS_CREATE_SIZE, PROCESS_EXIT_SIZE, THREAD_SIZE,
};
use crate::utils::errors::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind-specific fields of a decoded record. Trailing UTF-16 text is parsed
/// into an owned string; absent text decodes to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    ProcessCreate {
        process_id: u32,
        parent_process_id: u32,
        command_line: Option<String>,
    },
    ProcessExit {
        process_id: u32,
    },
    ThreadCreate {
        thread_id: u32,
        process_id: u32,
    },
    ThreadExit {
        thread_id: u32,
        process_id: u32,
    },
    ImageLoad {
        process_id: u32,
        image_base: u64,
        image_size: u64,
        image_path: Option<String>,
    },
}

/// One decoded event record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedEvent {
    /// Capture time, 100 ns ticks since the Unix epoch
    pub timestamp_ticks: i64,

    /// Kind-specific fields
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl DecodedEvent {
    /// Kind of this event
    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::ProcessCreate { .. } => EventKind::ProcessCreate,
            EventPayload::ProcessExit { .. } => EventKind::ProcessExit,
            EventPayload::ThreadCreate { .. } => EventKind::ThreadCreate,
            EventPayload::ThreadExit { .. } => EventKind::ThreadExit,
            EventPayload::ImageLoad { .. } => EventKind::ImageLoad,
        }
    }

    /// Capture time as a UTC timestamp
    pub fn timestamp(&self) -> DateTime<Utc> {
        let secs = self.timestamp_ticks.div_euclid(10_000_000);
        let nanos = self.timestamp_ticks.rem_euclid(10_000_000) as u32 * 100;
        DateTime::from_timestamp(secs, nanos).unwrap_or_default()
    }
}

/// Parse one record from a slice that spans exactly the record.
///
/// Returns `Ok(None)` for an unrecognized kind tag. Length fields that do
/// not add up are decode errors: the capture side never produces them.
pub fn parse_record(bytes: &[u8]) -> Result<Option<DecodedEvent>> {
    if bytes.len() < HEADER_SIZE {
        return Err(EngineError::DecodeFailed(format!(
            "record of {} bytes is shorter than the {} byte header",
            bytes.len(),
            HEADER_SIZE
        )));
    }

    let total = read_u16_le(bytes, 2) as usize;
    if total != bytes.len() {
        return Err(EngineError::DecodeFailed(format!(
            "header total_size {} does not match record slice of {} bytes",
            total,
            bytes.len()
        )));
    }

    let kind = match EventKind::from_tag(read_u16_le(bytes, 0)) {
        Some(kind) => kind,
        None => return Ok(None),
    };
    let timestamp_ticks = read_i64_le(bytes, 4);

    let payload = match kind {
        EventKind::ProcessCreate => {
            ensure_fixed(bytes, PROCESS_CREATE_SIZE, kind)?;
            let length = read_u16_le(bytes, 20);
            let offset = read_u16_le(bytes, 22);
            EventPayload::ProcessCreate {
                process_id: read_u32_le(bytes, 12),
                parent_process_id: read_u32_le(bytes, 16),
                command_line: read_blob(bytes, PROCESS_CREATE_SIZE, length, offset)?,
            }
        }
        EventKind::ProcessExit => {
            ensure_exact(bytes, PROCESS_EXIT_SIZE, kind)?;
            EventPayload::ProcessExit {
                process_id: read_u32_le(bytes, 12),
            }
        }
        EventKind::ThreadCreate => {
            ensure_exact(bytes, THREAD_SIZE, kind)?;
            EventPayload::ThreadCreate {
                thread_id: read_u32_le(bytes, 12),
                process_id: read_u32_le(bytes, 16),
            }
        }
        EventKind::ThreadExit => {
            ensure_exact(bytes, THREAD_SIZE, kind)?;
            EventPayload::ThreadExit {
                thread_id: read_u32_le(bytes, 12),
                process_id: read_u32_le(bytes, 16),
            }
        }
        EventKind::ImageLoad => {
            ensure_fixed(bytes, IMAGE_LOAD_SIZE, kind)?;
            let length = read_u16_le(bytes, 32);
            let offset = read_u16_le(bytes, 34);
            EventPayload::ImageLoad {
                process_id: read_u32_le(bytes, 12),
                image_base: read_u64_le(bytes, 16),
                image_size: read_u64_le(bytes, 24),
                image_path: read_blob(bytes, IMAGE_LOAD_SIZE, length, offset)?,
            }
        }
    };

    Ok(Some(DecodedEvent {
        timestamp_ticks,
        payload,
    }))
}

/// Kinds without trailing text must be exactly their fixed size
fn ensure_exact(bytes: &[u8], fixed: usize, kind: EventKind) -> Result<()> {
    if bytes.len() != fixed {
        return Err(EngineError::DecodeFailed(format!(
            "{:?} record must be {} bytes, got {}",
            kind,
            fixed,
            bytes.len()
        )));
    }
    Ok(())
}

/// Kinds with trailing text must be at least their fixed size
fn ensure_fixed(bytes: &[u8], fixed: usize, kind: EventKind) -> Result<()> {
    if bytes.len() < fixed {
        return Err(EngineError::DecodeFailed(format!(
            "{:?} record must be at least {} bytes, got {}",
            kind,
            fixed,
            bytes.len()
        )));
    }
    Ok(())
}

/// Read the trailing UTF-16LE blob addressed by an offset/length pair.
/// Both fields zero means absent; a nonzero offset must point exactly at
/// the byte after the fixed body and the blob must end the record.
fn read_blob(bytes: &[u8], fixed: usize, length: u16, offset: u16) -> Result<Option<String>> {
    if length == 0 && offset == 0 {
        if bytes.len() != fixed {
            return Err(EngineError::DecodeFailed(format!(
                "record without trailing text must be {} bytes, got {}",
                fixed,
                bytes.len()
            )));
        }
        return Ok(None);
    }

    let offset = offset as usize;
    let blob_bytes = length as usize * 2;

    if offset != fixed {
        return Err(EngineError::DecodeFailed(format!(
            "trailing text offset {} does not point at the fixed body end {}",
            offset, fixed
        )));
    }
    if offset + blob_bytes != bytes.len() {
        return Err(EngineError::DecodeFailed(format!(
            "trailing text of {} bytes does not end the {} byte record",
            blob_bytes,
            bytes.len()
        )));
    }

    let units: Vec<u16> = bytes[offset..]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    Ok(Some(String::from_utf16_lossy(&units)))
}

/// Iterator over the records of a packed drain buffer.
///
/// Yields decoded events in buffer order, silently skipping unknown kinds.
/// A framing error ends iteration after the error is yielded.
pub struct RecordWalker<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> RecordWalker<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }
}

impl<'a> Iterator for RecordWalker<'a> {
    type Item = Result<DecodedEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.offset >= self.buf.len() {
                return None;
            }

            let remaining = &self.buf[self.offset..];
            if remaining.len() < HEADER_SIZE {
                self.offset = self.buf.len();
                return Some(Err(EngineError::DecodeFailed(format!(
                    "{} trailing bytes cannot hold a record header",
                    remaining.len()
                ))));
            }

            let total = read_u16_le(remaining, 2) as usize;
            if total < HEADER_SIZE || total > remaining.len() {
                self.offset = self.buf.len();
                return Some(Err(EngineError::DecodeFailed(format!(
                    "record total_size {} is outside the {} remaining bytes",
                    total,
                    remaining.len()
                ))));
            }

            let record = &remaining[..total];
            self.offset += total;

            match parse_record(record) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => continue,
                Err(e) => {
                    self.offset = self.buf.len();
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Decode every record in a packed buffer, skipping unknown kinds
pub fn decode_packed(buf: &[u8]) -> Result<Vec<DecodedEvent>> {
    RecordWalker::new(buf).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::record::EventRecord;
    use bytes::BufMut;
    use proptest::prelude::*;

    #[test]
    fn test_process_create_round_trip() {
        let record =
            EventRecord::process_create(100, 1, Some("notepad.exe"), 123_456_789).unwrap();
        let decoded = parse_record(record.as_bytes()).unwrap().unwrap();

        assert_eq!(decoded.timestamp_ticks, 123_456_789);
        assert_eq!(
            decoded.payload,
            EventPayload::ProcessCreate {
                process_id: 100,
                parent_process_id: 1,
                command_line: Some("notepad.exe".to_string()),
            }
        );
    }

    #[test]
    fn test_image_load_round_trip() {
        let record =
            EventRecord::image_load(7, 0x5000_0000, 4096, Some("/usr/lib/libm.so.6"), 42).unwrap();
        let decoded = parse_record(record.as_bytes()).unwrap().unwrap();

        assert_eq!(
            decoded.payload,
            EventPayload::ImageLoad {
                process_id: 7,
                image_base: 0x5000_0000,
                image_size: 4096,
                image_path: Some("/usr/lib/libm.so.6".to_string()),
            }
        );
    }

    #[test]
    fn test_non_ascii_command_line() {
        let text = "grép --färbe=auto 日本語";
        let record = EventRecord::process_create(9, 1, Some(text), 0).unwrap();
        let decoded = parse_record(record.as_bytes()).unwrap().unwrap();

        match decoded.payload {
            EventPayload::ProcessCreate { command_line, .. } => {
                assert_eq!(command_line.as_deref(), Some(text));
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn test_packed_walk_in_order() {
        let records = vec![
            EventRecord::process_create(100, 1, Some("a"), 1).unwrap(),
            EventRecord::thread_create(200, 100, 2).unwrap(),
            EventRecord::process_exit(100, 3).unwrap(),
        ];

        let mut packed = Vec::new();
        for record in &records {
            packed.extend_from_slice(record.as_bytes());
        }

        let decoded = decode_packed(&packed).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].kind(), EventKind::ProcessCreate);
        assert_eq!(decoded[1].kind(), EventKind::ThreadCreate);
        assert_eq!(decoded[2].kind(), EventKind::ProcessExit);
        assert_eq!(
            decoded.iter().map(|e| e.timestamp_ticks).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_unknown_kind_skipped() {
        // Header-only record with a tag from the future
        let mut packed = Vec::new();
        packed.put_u16_le(99);
        packed.put_u16_le(HEADER_SIZE as u16);
        packed.put_i64_le(0);

        let known = EventRecord::process_exit(5, 0).unwrap();
        packed.extend_from_slice(known.as_bytes());

        let decoded = decode_packed(&packed).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].kind(), EventKind::ProcessExit);
    }

    #[test]
    fn test_truncated_buffer_fails() {
        let record = EventRecord::process_exit(5, 0).unwrap();
        let bytes = record.as_bytes();

        assert!(decode_packed(&bytes[..bytes.len() - 1]).is_err());
        assert!(decode_packed(&bytes[..HEADER_SIZE - 2]).is_err());
    }

    #[test]
    fn test_bad_blob_offset_fails() {
        let record = EventRecord::process_create(1, 1, Some("abc"), 0).unwrap();
        let mut bytes = record.as_bytes().to_vec();
        // Point the command line offset somewhere else
        bytes[22] = 0xFF;

        assert!(parse_record(&bytes).is_err());
    }

    #[test]
    fn test_empty_buffer() {
        let decoded = decode_packed(&[]).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_json_serialization() {
        let record = EventRecord::process_create(100, 1, Some("sh -c ls"), 0).unwrap();
        let decoded = parse_record(record.as_bytes()).unwrap().unwrap();

        let json = serde_json::to_string(&decoded).unwrap();
        assert!(json.contains("\"kind\":\"process_create\""));
        assert!(json.contains("\"process_id\":100"));
        assert!(json.contains("sh -c ls"));
    }

    proptest! {
        #[test]
        fn prop_framing_round_trip(
            pid in any::<u32>(),
            ppid in any::<u32>(),
            command_line in proptest::option::of(".{0,64}"),
            ticks in any::<i64>(),
        ) {
            let record =
                EventRecord::process_create(pid, ppid, command_line.as_deref(), ticks).unwrap();
            let decoded = parse_record(record.as_bytes()).unwrap().unwrap();

            prop_assert_eq!(decoded.timestamp_ticks, ticks);
            match decoded.payload {
                EventPayload::ProcessCreate {
                    process_id,
                    parent_process_id,
                    command_line: decoded_line,
                } => {
                    prop_assert_eq!(process_id, pid);
                    prop_assert_eq!(parent_process_id, ppid);
                    // empty input text is recorded as absent
                    let expected = command_line.filter(|s| !s.is_empty());
                    prop_assert_eq!(decoded_line, expected);
                }
                other => prop_assert!(false, "unexpected payload: {:?}", other),
            }
        }
    }
}
