// src/consumer/poller.rs
//! Periodic drain loop
//!
//! Polls the queue on an interval, draining into a fixed read buffer and
//! handing each non-empty packed result to a sink. An undersized buffer is
//! not an error: the drain protocol reports zero bytes and preserves the
//! queue, so the poll simply tries again next tick.

use crate::capture::queue::EventQueue;
use crate::utils::errors::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error};

/// Poller configuration
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Interval between drain polls (milliseconds)
    pub poll_interval_ms: u64,

    /// Size of the drain destination buffer (bytes)
    pub read_buffer_size: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            read_buffer_size: 64 * 1024,
        }
    }
}

/// Receives packed drain results
pub trait EventSink: Send {
    /// Deliver one packed buffer of whole records
    fn deliver(&mut self, packed: &[u8]) -> Result<()>;
}

/// Periodic drain poller
pub struct EventPoller {
    queue: Arc<EventQueue>,
    config: PollerConfig,
}

impl EventPoller {
    /// Create a poller draining `queue`
    pub fn new(queue: Arc<EventQueue>, config: PollerConfig) -> Self {
        Self { queue, config }
    }

    /// Run until `shutdown` flips, draining on every tick.
    ///
    /// Performs one final drain on the way out so records captured between
    /// the last tick and shutdown are still delivered.
    pub async fn run<S: EventSink>(
        self,
        mut sink: S,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.poll_interval_ms));
        let mut buffer = vec![0u8; self.config.read_buffer_size];

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    Self::drain_once(&self.queue, &mut buffer, &mut sink);
                }

                _ = shutdown.changed() => {
                    debug!("poller shutting down");
                    break;
                }
            }
        }

        Self::drain_once(&self.queue, &mut buffer, &mut sink);
        Ok(())
    }

    fn drain_once<S: EventSink>(queue: &EventQueue, buffer: &mut [u8], sink: &mut S) {
        let written = queue.drain_into(buffer);
        if written == 0 {
            return;
        }

        debug!("drained {} bytes", written);
        if let Err(e) = sink.deliver(&buffer[..written]) {
            error!("failed to deliver drained events: {}", e);
        }
    }
}
