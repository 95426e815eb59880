// src/hooks/proc_scanner.rs
//! Process-table scanner source (Linux)
//!
//! Polls procfs on an interval, diffs the observed process and thread
//! tables against the previous scan, and feeds the differences to the
//! capture engine as lifecycle notifications. Identifiers are reported as
//! procfs exposes them; a process that disappears between the table listing
//! and its detail reads is simply skipped and picked up as an exit on the
//! next scan.

use crate::capture::producers::CaptureEngine;
use crate::utils::errors::{EngineError, Result};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Scanner configuration
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Interval between process-table scans (milliseconds)
    pub scan_interval_ms: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: 250,
        }
    }
}

/// What one scan observed about a process
struct ProcessSnapshot {
    parent_pid: u32,
    threads: HashSet<i32>,
}

/// Procfs-backed notification source
pub struct ProcScanner {
    engine: CaptureEngine,
    config: ScannerConfig,
    seen: HashMap<i32, ProcessSnapshot>,
}

impl ProcScanner {
    /// Create a scanner feeding `engine`
    pub fn new(engine: CaptureEngine, config: ScannerConfig) -> Self {
        Self {
            engine,
            config,
            seen: HashMap::new(),
        }
    }

    /// Run until `shutdown` flips.
    ///
    /// The first scan only establishes a baseline: processes already running
    /// when the scanner starts are not reported as creations.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        self.seen = Self::snapshot()?;
        debug!("process scanner primed with {} processes", self.seen.len());

        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.scan_interval_ms));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.scan_once();
                }

                _ = shutdown.changed() => {
                    debug!("process scanner shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Diff the current table against the previous scan and emit
    /// notifications for every difference
    fn scan_once(&mut self) {
        let current = match Self::snapshot() {
            Ok(table) => table,
            Err(e) => {
                warn!("process table scan failed: {}", e);
                return;
            }
        };

        for (pid, snap) in &current {
            match self.seen.get(pid) {
                None => {
                    let command_line = Self::command_line(*pid);
                    self.engine.on_process_create(
                        *pid as u32,
                        snap.parent_pid,
                        command_line.as_deref(),
                    );
                    for tid in &snap.threads {
                        self.engine.on_thread_create(*tid as u32, *pid as u32);
                    }
                }
                Some(prev) => {
                    for tid in snap.threads.difference(&prev.threads) {
                        self.engine.on_thread_create(*tid as u32, *pid as u32);
                    }
                    for tid in prev.threads.difference(&snap.threads) {
                        self.engine.on_thread_exit(*tid as u32, *pid as u32);
                    }
                }
            }
        }

        for (pid, prev) in &self.seen {
            if !current.contains_key(pid) {
                for tid in &prev.threads {
                    self.engine.on_thread_exit(*tid as u32, *pid as u32);
                }
                self.engine.on_process_exit(*pid as u32);
            }
        }

        self.seen = current;
    }

    /// Read the current process/thread table
    fn snapshot() -> Result<HashMap<i32, ProcessSnapshot>> {
        let processes = procfs::process::all_processes()
            .map_err(|e| EngineError::SourceFailed(format!("cannot read process table: {}", e)))?;

        let mut table = HashMap::new();
        for process in processes.flatten() {
            // gone mid-scan
            let stat = match process.stat() {
                Ok(stat) => stat,
                Err(_) => continue,
            };

            let threads = process
                .tasks()
                .map(|tasks| tasks.flatten().map(|task| task.tid).collect())
                .unwrap_or_default();

            table.insert(
                process.pid,
                ProcessSnapshot {
                    parent_pid: stat.ppid as u32,
                    threads,
                },
            );
        }

        Ok(table)
    }

    /// Command line for `pid`, `None` when unreadable or empty (kernel
    /// threads have no command line)
    fn command_line(pid: i32) -> Option<String> {
        procfs::process::Process::new(pid)
            .ok()?
            .cmdline()
            .ok()
            .filter(|args| !args.is_empty())
            .map(|args| args.join(" "))
    }
}
