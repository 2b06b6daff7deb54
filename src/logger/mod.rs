//! Activity logging: JSONL records of sessions, decodes, and rejected input.

#![allow(missing_docs)]

pub mod jsonl;

use std::path::Path;
use std::time::Duration;

use crate::core::config::LoggingConfig;
use crate::core::errors::FwvError;
use crate::decoder::source::DecodedLog;
use crate::session::JumpOutcome;

use self::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};

/// Typed front end over [`JsonlWriter`]. A disabled logger drops everything.
pub struct ActivityLogger {
    writer: Option<JsonlWriter>,
}

impl ActivityLogger {
    /// Open according to the `[logging]` config section.
    #[must_use]
    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self {
            writer: Some(JsonlWriter::open(JsonlConfig {
                path: config.jsonl_path.clone(),
                max_size_bytes: config.max_size_bytes,
                max_rotated_files: config.max_rotated_files,
            })),
        }
    }

    #[must_use]
    pub const fn disabled() -> Self {
        Self { writer: None }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    fn emit(&mut self, entry: &LogEntry) {
        if let Some(writer) = self.writer.as_mut() {
            writer.write_entry(entry);
        }
    }

    pub fn session_start(&mut self, path: &Path, config_hash: &str) {
        let mut entry = LogEntry::new(EventType::SessionStart, Severity::Info);
        entry.path = Some(path.display().to_string());
        entry.details = Some(format!("config_hash={config_hash}"));
        self.emit(&entry);
    }

    pub fn decode_complete(&mut self, log: &DecodedLog) {
        let mut entry = LogEntry::new(EventType::DecodeComplete, Severity::Info);
        entry.path = Some(log.path.display().to_string());
        entry.bytes = Some(log.byte_len as u64);
        entry.frames = Some(log.report.frames as u64);
        entry.skipped_bytes = Some(log.report.skipped_bytes as u64);
        entry.resync_events = Some(log.report.resync_events as u64);
        entry.duration_ms = Some(millis(log.elapsed));
        entry.details = Some(format!(
            "layout={} sha256={}",
            log.layout
                .preset()
                .map_or("custom", crate::decoder::layout::LayoutPreset::label),
            log.sha256
        ));
        self.emit(&entry);
    }

    pub fn no_frames(&mut self, path: &Path, bytes: usize) {
        let mut entry = LogEntry::new(EventType::NoFrames, Severity::Warning);
        entry.path = Some(path.display().to_string());
        entry.bytes = Some(bytes as u64);
        entry.frames = Some(0);
        entry.error_code = Some("FWV-2002".to_string());
        self.emit(&entry);
    }

    pub fn jump_rejected(&mut self, outcome: &JumpOutcome) {
        let mut entry = LogEntry::new(EventType::JumpRejected, Severity::Warning);
        if let JumpOutcome::OutOfRange { requested, total } = outcome {
            entry.row = requested.parse().ok();
            entry.total = Some(*total as u64);
        }
        entry.details = Some(outcome.to_string());
        self.emit(&entry);
    }

    pub fn session_end(&mut self, position: (usize, usize), duration: Duration) {
        let mut entry = LogEntry::new(EventType::SessionEnd, Severity::Info);
        entry.row = Some(position.0 as u64);
        entry.total = Some(position.1 as u64);
        entry.duration_ms = Some(millis(duration));
        self.emit(&entry);
        self.flush();
    }

    pub fn error(&mut self, err: &FwvError) {
        let mut entry = LogEntry::new(EventType::Error, Severity::Error);
        entry.error_code = Some(err.code().to_string());
        entry.details = Some(err.to_string());
        self.emit(&entry);
        self.flush();
    }

    pub fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush();
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::layout::FrameLayout;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn disabled_logger_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("off.jsonl");
        let mut logger = ActivityLogger::from_config(&LoggingConfig {
            enabled: false,
            jsonl_path: path.clone(),
            ..LoggingConfig::default()
        });
        logger.session_start(Path::new("x.bin"), "abc");
        logger.flush();
        assert!(!logger.is_enabled());
        assert!(!path.exists());
    }

    #[test]
    fn session_events_are_recorded_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.jsonl");
        let mut logger = ActivityLogger::from_config(&LoggingConfig {
            jsonl_path: path.clone(),
            ..LoggingConfig::default()
        });

        let mut bytes = vec![0x7F, 0x80];
        bytes.extend_from_slice(&[0u8; 18]);
        bytes.extend_from_slice(&[0x80, 0x7F]);
        let log = DecodedLog::from_bytes("LOG00083.TXT", &bytes, &FrameLayout::extended());

        logger.session_start(Path::new("LOG00083.TXT"), "0123456789abcdef");
        logger.decode_complete(&log);
        logger.jump_rejected(&JumpOutcome::OutOfRange {
            requested: "9".to_string(),
            total: 1,
        });
        logger.session_end((1, 1), Duration::from_millis(1500));

        let lines = read_lines(&path);
        let events: Vec<&str> = lines.iter().map(|v| v["event"].as_str().unwrap()).collect();
        assert_eq!(
            events,
            ["session_start", "decode_complete", "jump_rejected", "session_end"]
        );
        assert_eq!(lines[1]["frames"], 1);
        assert_eq!(lines[1]["bytes"], 22);
        assert_eq!(lines[2]["row"], 9);
        assert_eq!(lines[3]["duration_ms"], 1500);
    }

    #[test]
    fn error_records_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("err.jsonl");
        let mut logger = ActivityLogger::from_config(&LoggingConfig {
            jsonl_path: path.clone(),
            ..LoggingConfig::default()
        });
        logger.no_frames(Path::new("empty.bin"), 0);
        logger.error(&FwvError::InputNotFound {
            path: "gone.bin".into(),
        });
        let lines = read_lines(&path);
        assert_eq!(lines[0]["error_code"], "FWV-2002");
        assert_eq!(lines[1]["error_code"], "FWV-3001");
        assert_eq!(lines[1]["severity"], "error");
    }
}
