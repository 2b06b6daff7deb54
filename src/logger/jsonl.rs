//! JSONL activity log: one self-contained JSON object per line.
//!
//! Lines are assembled in memory and written with a single `write_all` so a
//! concurrent `tail -f` never sees half a record.
//!
//! Degradation chain:
//! 1. Configured file path
//! 2. stderr with `[FWV-JSONL]` prefix
//! 3. Silent discard (the viewer never dies because logging failed)

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions, rename};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{FwvError, Result};

/// Severity level for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Activity event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SessionStart,
    DecodeComplete,
    NoFrames,
    JumpRejected,
    SessionEnd,
    Error,
}

/// A single JSONL record. Only `ts`, `event`, and `severity` are always set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// RFC 3339 UTC timestamp with milliseconds.
    pub ts: String,
    pub event: EventType,
    pub severity: Severity,
    /// Input log file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Input size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resync_events: Option<u64>,
    /// 1-indexed row (cursor position or rejected jump target).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u64>,
    /// Total rows in the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// FWV error code when the event reports a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current UTC time.
    #[must_use]
    pub fn new(event: EventType, severity: Severity) -> Self {
        Self {
            ts: format_utc_now(),
            event,
            severity,
            path: None,
            bytes: None,
            frames: None,
            skipped_bytes: None,
            resync_events: None,
            row: None,
            total: None,
            duration_ms: None,
            error_code: None,
            details: None,
        }
    }
}

/// Where lines currently go. Each failure moves one step down the chain.
enum Sink {
    File(BufWriter<File>),
    Stderr,
    Discard,
}

impl Sink {
    const fn label(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Stderr => "stderr",
            Self::Discard => "discard",
        }
    }
}

/// Settings for the JSONL writer.
#[derive(Debug, Clone)]
pub struct JsonlConfig {
    pub path: PathBuf,
    /// Rotate once the file would grow past this many bytes.
    pub max_size_bytes: u64,
    /// Rotated generations kept (`file.1` … `file.N`).
    pub max_rotated_files: u32,
}

/// Append-only JSONL writer with size-based rotation.
pub struct JsonlWriter {
    config: JsonlConfig,
    sink: Sink,
    /// Size of the live file, including what was there at open.
    bytes_written: u64,
}

impl JsonlWriter {
    /// Open the log file, degrading to stderr if that fails.
    #[must_use]
    pub fn open(config: JsonlConfig) -> Self {
        let (sink, bytes_written) = match open_append(&config.path) {
            Ok((file, size)) => (Sink::File(BufWriter::new(file)), size),
            Err(e) => {
                eprintln!("[FWV-JSONL] {e}; logging to stderr");
                (Sink::Stderr, 0)
            }
        };
        Self {
            config,
            sink,
            bytes_written,
        }
    }

    /// Append one entry as one line.
    pub fn write_entry(&mut self, entry: &LogEntry) {
        match serde_json::to_string(entry) {
            Ok(mut line) => {
                line.push('\n');
                self.append(&line);
            }
            Err(e) => eprintln!("[FWV-JSONL] serialize error: {e}"),
        }
    }

    pub fn flush(&mut self) {
        if let Sink::File(file) = &mut self.sink {
            let _ = file.flush();
        }
    }

    /// Current degradation state: `file`, `stderr`, or `discard`.
    #[must_use]
    pub const fn state(&self) -> &'static str {
        self.sink.label()
    }

    #[must_use]
    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    // ──────────────────────── internals ────────────────────────

    fn append(&mut self, line: &str) {
        let len = line.len() as u64;
        let over_limit =
            self.bytes_written > 0 && self.bytes_written + len > self.config.max_size_bytes;
        if over_limit && matches!(self.sink, Sink::File(_)) {
            self.rotate();
        }

        let delivered = match &mut self.sink {
            Sink::File(file) => file.write_all(line.as_bytes()).is_ok(),
            Sink::Stderr => io::stderr()
                .write_all(format!("[FWV-JSONL] {line}").as_bytes())
                .is_ok(),
            Sink::Discard => true,
        };

        if delivered {
            if matches!(self.sink, Sink::File(_)) {
                self.bytes_written += len;
            }
        } else {
            let retry = matches!(self.sink, Sink::File(_));
            self.step_down();
            if retry {
                self.append(line);
            }
        }
    }

    fn step_down(&mut self) {
        self.sink = match self.sink {
            Sink::File(_) => {
                eprintln!("[FWV-JSONL] file write failed, using stderr");
                Sink::Stderr
            }
            Sink::Stderr | Sink::Discard => Sink::Discard,
        };
    }

    /// Shift `file.N-1 → file.N … file → file.1` and reopen a fresh file.
    fn rotate(&mut self) {
        self.flush();
        let base = self.config.path.clone();
        let keep = self.config.max_rotated_files;

        let _ = fs::remove_file(rotated_name(&base, keep));
        for generation in (1..keep).rev() {
            let _ = rename(rotated_name(&base, generation), rotated_name(&base, generation + 1));
        }
        let _ = rename(&base, rotated_name(&base, 1));

        match open_append(&base) {
            Ok((file, _)) => {
                self.sink = Sink::File(BufWriter::new(file));
                self.bytes_written = 0;
            }
            Err(_) => self.step_down(),
        }
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        self.flush();
    }
}

// ──────────────────────── helpers ────────────────────────

/// Open or create a file for appending. Returns `(File, current_size)`.
fn open_append(path: &Path) -> Result<(File, u64)> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| FwvError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| FwvError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok((file, size))
}

/// `activity.jsonl` → `activity.jsonl.3`
fn rotated_name(base: &Path, index: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ──────────────────────── tests ────────────────────────
