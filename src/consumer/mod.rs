// src/consumer/mod.rs
//! Event delivery consumers
//!
//! The pull side of the pipeline:
//!
//! - **Poller**: periodic drain loop feeding packed buffers to a sink
//! - **Printer**: console sink rendering one line per decoded record
//! - **Exporter**: JSON export of decoded events
//!
//! Consumers only depend on the packed wire format: they walk drained
//! buffers by `total_size` framing and never reach into the queue beyond
//! `drain_into`.

pub mod exporter;
pub mod poller;
pub mod printer;

// Re-export commonly used types
pub use exporter::{ExportFormat, Exporter};
pub use poller::{EventPoller, EventSink, PollerConfig};
pub use printer::ConsolePrinter;
