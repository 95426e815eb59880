// src/utils/config.rs
//! Engine configuration
//!
//! Loaded from an optional `procwatch.toml` file with `PROCWATCH_*`
//! environment overrides. The queue capacity is the only capture tunable;
//! everything else belongs to the consumer and hook glue.

use crate::utils::errors::{EngineError, Result};
use serde::Deserialize;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capture subsystem settings
    pub capture: CaptureConfig,

    /// Consumer (drain/poll) settings
    pub consumer: ConsumerConfig,

    /// Hook source settings
    pub hooks: HookConfig,
}

/// Capture subsystem configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Maximum records buffered before oldest-first eviction
    pub queue_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

/// Consumer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    /// Interval between drain polls (milliseconds)
    pub poll_interval_ms: u64,

    /// Size of the drain destination buffer (bytes)
    pub read_buffer_size: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            read_buffer_size: 64 * 1024,
        }
    }
}

/// Hook source configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Interval between process-table scans (milliseconds)
    pub scan_interval_ms: u64,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: 250,
        }
    }
}

impl EngineConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let raw = config::Config::builder()
            .add_source(config::File::with_name("procwatch").required(false))
            .add_source(
                config::Environment::with_prefix("PROCWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| EngineError::ConfigFailed(format!("failed to read configuration: {}", e)))?;

        let cfg: EngineConfig = raw
            .try_deserialize()
            .map_err(|e| EngineError::ConfigFailed(format!("invalid configuration: {}", e)))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.capture.queue_capacity == 0 {
            return Err(EngineError::ConfigFailed(
                "capture.queue_capacity must be a positive integer".to_string(),
            ));
        }

        if self.consumer.poll_interval_ms == 0 {
            return Err(EngineError::ConfigFailed(
                "consumer.poll_interval_ms must be a positive integer".to_string(),
            ));
        }

        if self.consumer.read_buffer_size == 0 {
            return Err(EngineError::ConfigFailed(
                "consumer.read_buffer_size must be a positive integer".to_string(),
            ));
        }

        if self.hooks.scan_interval_ms == 0 {
            return Err(EngineError::ConfigFailed(
                "hooks.scan_interval_ms must be a positive integer".to_string(),
            ));
        }

        Ok(())
    }
}
