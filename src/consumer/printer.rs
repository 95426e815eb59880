// src/consumer/printer.rs
//! Console sink for drained events
//!
//! Renders one line per decoded record, timestamp first, mirroring what an
//! operator tailing the monitor expects to read.

use crate::consumer::poller::EventSink;
use crate::events::decode::{DecodedEvent, EventPayload, RecordWalker};
use crate::utils::errors::Result;

/// Sink printing each decoded record to stdout
pub struct ConsolePrinter;

impl ConsolePrinter {
    /// Render a single decoded record
    fn render(event: &DecodedEvent) -> String {
        let time = event.timestamp().format("%H:%M:%S%.3f");

        match &event.payload {
            EventPayload::ProcessCreate {
                process_id,
                parent_process_id,
                command_line,
            } => format!(
                "{}: process {} created (parent {}), command line: {}",
                time,
                process_id,
                parent_process_id,
                command_line.as_deref().unwrap_or("<none>")
            ),
            EventPayload::ProcessExit { process_id } => {
                format!("{}: process {} exited", time, process_id)
            }
            EventPayload::ThreadCreate {
                thread_id,
                process_id,
            } => format!(
                "{}: thread {} created in process {}",
                time, thread_id, process_id
            ),
            EventPayload::ThreadExit {
                thread_id,
                process_id,
            } => format!(
                "{}: thread {} exited in process {}",
                time, thread_id, process_id
            ),
            EventPayload::ImageLoad {
                process_id,
                image_base,
                image_size,
                image_path,
            } => format!(
                "{}: image loaded into process {} at {:#x} ({} bytes): {}",
                time,
                process_id,
                image_base,
                image_size,
                image_path.as_deref().unwrap_or("<unknown>")
            ),
        }
    }
}

impl EventSink for ConsolePrinter {
    fn deliver(&mut self, packed: &[u8]) -> Result<()> {
        for event in RecordWalker::new(packed) {
            println!("{}", Self::render(&event?));
        }
        Ok(())
    }
}
