// src/hooks/mod.rs
//! Notification sources
//!
//! The OS hook layer is external to the capture core: anything that can
//! observe lifecycle notifications drives the `CaptureEngine` entry points.
//! This module ships one reference source for Linux:
//!
//! - **Proc Scanner**: diffs the procfs process/thread tables on an
//!   interval and synthesizes create/exit notifications
//!
//! The source is thin glue: it trusts what procfs reports and skips
//! processes that vanish mid-scan.

pub mod proc_scanner;

// Re-export commonly used types
pub use proc_scanner::{ProcScanner, ScannerConfig};
