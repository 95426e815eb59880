// src/consumer/exporter.rs
//! Export decoded events to JSON
//!
//! Supports:
//! - JSON (pretty-printed array, for analysis and visualization)
//! - JSON Lines (one object per line, for streaming pipelines)

use crate::events::decode::DecodedEvent;
use crate::utils::errors::{EngineError, Result};
use std::path::Path;
use tracing::debug;

/// Export formats
#[derive(Debug, Clone, Copy)]
pub enum ExportFormat {
    /// Pretty-printed JSON array
    Json,

    /// One JSON object per line
    JsonLines,
}

/// Exporter for decoded events
pub struct Exporter {
    format: ExportFormat,
}

impl Exporter {
    /// Create a new exporter
    pub fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    /// Export events to a string
    pub fn export(&self, events: &[DecodedEvent]) -> Result<String> {
        debug!("exporting {} events to {:?} format", events.len(), self.format);

        match self.format {
            ExportFormat::Json => self.export_json(events),
            ExportFormat::JsonLines => self.export_json_lines(events),
        }
    }

    /// Export events to a file
    pub fn export_to_file<P: AsRef<Path>>(&self, events: &[DecodedEvent], path: P) -> Result<()> {
        let rendered = self.export(events)?;
        std::fs::write(path.as_ref(), rendered)
            .map_err(|e| EngineError::ExportFailed(format!("failed to write export: {}", e)))?;
        Ok(())
    }

    fn export_json(&self, events: &[DecodedEvent]) -> Result<String> {
        serde_json::to_string_pretty(events)
            .map_err(|e| EngineError::ExportFailed(format!("JSON serialization error: {}", e)))
    }

    fn export_json_lines(&self, events: &[DecodedEvent]) -> Result<String> {
        let mut out = String::new();
        for event in events {
            let line = serde_json::to_string(event).map_err(|e| {
                EngineError::ExportFailed(format!("JSON serialization error: {}", e))
            })?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::decode::parse_record;
    use crate::events::record::EventRecord;
    use tempfile::tempdir;

    fn test_events() -> Vec<DecodedEvent> {
        let records = vec![
            EventRecord::process_create(100, 1, Some("notepad.exe"), 10).unwrap(),
            EventRecord::process_exit(100, 20).unwrap(),
        ];
        records
            .iter()
            .map(|r| parse_record(r.as_bytes()).unwrap().unwrap())
            .collect()
    }

    #[test]
    fn test_json_export() {
        let exporter = Exporter::new(ExportFormat::Json);
        let json = exporter.export(&test_events()).unwrap();

        assert!(json.contains("process_create"));
        assert!(json.contains("notepad.exe"));
        assert!(json.contains("process_exit"));
    }

    #[test]
    fn test_json_lines_export() {
        let exporter = Exporter::new(ExportFormat::JsonLines);
        let out = exporter.export(&test_events()).unwrap();

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("process_create"));
        assert!(lines[1].contains("process_exit"));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let exporter = Exporter::new(ExportFormat::JsonLines);
        exporter.export_to_file(&test_events(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
