// src/main.rs
//! Procwatch Engine
//!
//! Captures process, thread, and image lifecycle events into a bounded
//! in-process queue and prints them as they are drained.

use anyhow::Result;
use procwatch_engine::capture::{CaptureEngine, EventQueue};
use procwatch_engine::consumer::{ConsolePrinter, EventPoller, PollerConfig};
use procwatch_engine::hooks::{ProcScanner, ScannerConfig};
use procwatch_engine::observability::init_tracing;
use procwatch_engine::utils::config::EngineConfig;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize observability (tracing, logging)
    init_tracing()?;

    info!("Starting Procwatch Engine v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = EngineConfig::load()?;
    info!("Configuration loaded: {:?}", config);

    // Create the bounded queue and the capture engine producing into it
    let queue = Arc::new(EventQueue::new(config.capture.queue_capacity));
    let engine = CaptureEngine::new(Arc::clone(&queue));

    let scanner = ProcScanner::new(
        engine,
        ScannerConfig {
            scan_interval_ms: config.hooks.scan_interval_ms,
        },
    );
    let poller = EventPoller::new(
        Arc::clone(&queue),
        PollerConfig {
            poll_interval_ms: config.consumer.poll_interval_ms,
            read_buffer_size: config.consumer.read_buffer_size,
        },
    );

    // Graceful shutdown handler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scanner_task = tokio::spawn(scanner.run(shutdown_rx.clone()));
    let poller_task = tokio::spawn(poller.run(ConsolePrinter, shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Received shutdown signal, cleaning up...");
    let _ = shutdown_tx.send(true);

    for task in [scanner_task, poller_task] {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("task failed: {}", e),
            Err(e) => error!("task panicked: {}", e),
        }
    }

    let stats = queue.stats();
    info!(
        "Engine stopped gracefully ({} captured, {} delivered, {} evicted)",
        stats.push_count, stats.drain_count, stats.evict_count
    );
    Ok(())
}
