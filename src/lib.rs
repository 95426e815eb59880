// src/lib.rs
//! Procwatch Engine Library
//!
//! This library provides the core components for capturing and delivering
//! process lifecycle events.
//!
//! # Architecture
//!
//! The engine is structured into several key modules:
//!
//! - **events**: wire-format event records, encoding and decoding
//! - **capture**: bounded event queue and per-kind producers
//! - **consumer**: drain polling, console printing, JSON export
//! - **hooks**: notification sources feeding the capture engine
//! - **observability**: tracing and logging
//! - **utils**: errors and configuration

// Public module exports
pub mod capture;
pub mod consumer;
pub mod events;
pub mod hooks;
pub mod observability;
pub mod utils;

// Re-export commonly used types
pub use capture::{CaptureEngine, EventQueue};
pub use events::{DecodedEvent, EventKind, EventPayload, EventRecord};
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HASH: &str = env!("GIT_HASH");

/// Engine build information
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            git_hash: GIT_HASH,
            build_timestamp: env!("BUILD_TIMESTAMP"),
            rustc_version: env!("RUSTC_VERSION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_build_info() {
        let info = BuildInfo::current();
        assert!(!info.version.is_empty());
    }
}
