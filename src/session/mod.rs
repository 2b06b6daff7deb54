//! Viewing session: the decoded frame list plus the one cursor into it.
//!
//! Every mutation validates bounds before touching the cursor, so the
//! cursor is always a valid index into a non-empty frame list.

#![allow(missing_docs)]

pub mod loader;

use std::fmt;
use std::num::IntErrorKind;
use std::path::PathBuf;

use crate::core::errors::{FwvError, Result};
use crate::decoder::frame::Frame;
use crate::decoder::source::DecodedLog;
use crate::window::{WINDOW_ROWS, Window, materialize};

/// Direction of a relative move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Result of a jump request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpOutcome {
    /// Cursor moved; rows are zero-based.
    Moved { from: usize, to: usize },
    /// Valid row that is already current.
    Unchanged,
    /// Numeric input outside `1..=total`.
    OutOfRange { requested: String, total: usize },
    /// Input that is not an integer at all.
    NotANumber { input: String },
}

impl JumpOutcome {
    /// Whether the request was valid (moved or already there).
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Moved { .. } | Self::Unchanged)
    }
}

impl fmt::Display for JumpOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moved { to, .. } => write!(f, "jumped to row {}", to + 1),
            Self::Unchanged => f.write_str("already on that row"),
            Self::OutOfRange { requested, total } => {
                write!(f, "row {requested} is out of range (1-{total})")
            }
            Self::NotANumber { input } => write!(f, "'{input}' is not a row number"),
        }
    }
}

// ──────────────────── session ────────────────────

/// Frame list and cursor for one input file.
#[derive(Debug, Clone)]
pub struct Session {
    source: PathBuf,
    frames: Vec<Frame>,
    cursor: usize,
}

impl Session {
    /// Session over in-memory frames, cursor on the first row.
    ///
    /// # Errors
    /// [`FwvError::NoFrames`] when `frames` is empty.
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        Self::with_source(PathBuf::from("<memory>"), frames, 0)
    }

    /// Session over a decoded log.
    ///
    /// # Errors
    /// [`FwvError::NoFrames`] when the log decoded to nothing.
    pub fn from_log(log: DecodedLog) -> Result<Self> {
        let bytes = log.byte_len;
        Self::with_source(log.path, log.frames, bytes)
    }

    fn with_source(source: PathBuf, frames: Vec<Frame>, bytes: usize) -> Result<Self> {
        if frames.is_empty() {
            return Err(FwvError::NoFrames {
                path: source,
                bytes,
            });
        }
        Ok(Self {
            source,
            frames,
            cursor: 0,
        })
    }

    #[must_use]
    pub fn source(&self) -> &std::path::Path {
        &self.source
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Zero-based cursor.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    fn last_index(&self) -> usize {
        self.frames.len() - 1
    }

    /// `(current_row, total_rows)`, current row 1-indexed for display.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.cursor + 1, self.frames.len())
    }

    #[must_use]
    pub fn current_frame(&self) -> &Frame {
        &self.frames[self.cursor]
    }

    /// Window with the current row at the bottom.
    #[must_use]
    pub fn window(&self) -> Window {
        materialize(&self.frames, self.cursor)
    }

    fn move_to(&mut self, target: usize) -> bool {
        let target = target.min(self.last_index());
        let moved = target != self.cursor;
        self.cursor = target;
        moved
    }

    /// Move one row; a no-op at either end. Returns whether the cursor moved.
    pub fn step(&mut self, direction: Direction) -> bool {
        self.move_by(direction, 1)
    }

    /// Move one full window height, stopping at the ends.
    pub fn page(&mut self, direction: Direction) -> bool {
        self.move_by(direction, WINDOW_ROWS)
    }

    fn move_by(&mut self, direction: Direction, amount: usize) -> bool {
        let target = match direction {
            Direction::Forward => self.cursor.saturating_add(amount),
            Direction::Backward => self.cursor.saturating_sub(amount),
        };
        self.move_to(target)
    }

    pub fn first(&mut self) -> bool {
        self.move_to(0)
    }

    pub fn last(&mut self) -> bool {
        self.move_to(self.last_index())
    }

    /// Jump to a 1-indexed row typed by the user.
    ///
    /// Surrounding whitespace is ignored. The remaining text must be what
    /// `str::parse::<i64>` accepts: an optional sign followed by ASCII digits,
    /// so digit separators such as `1_0` are not a number. Anything that is
    /// not an integer in `1..=frame_count` leaves the cursor where it was.
    pub fn jump(&mut self, input: &str) -> JumpOutcome {
        let trimmed = input.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => match usize::try_from(n) {
                Ok(row) => self.jump_to_row(row),
                Err(_) => self.out_of_range(trimmed),
            },
            Err(err)
                if matches!(err.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) =>
            {
                self.out_of_range(trimmed)
            }
            Err(_) => JumpOutcome::NotANumber {
                input: trimmed.to_string(),
            },
        }
    }

    /// Jump to a 1-indexed row.
    pub fn jump_to_row(&mut self, row: usize) -> JumpOutcome {
        if row == 0 || row > self.frames.len() {
            return self.out_of_range(&row.to_string());
        }
        let from = self.cursor;
        if self.move_to(row - 1) {
            JumpOutcome::Moved { from, to: row - 1 }
        } else {
            JumpOutcome::Unchanged
        }
    }

    fn out_of_range(&self, requested: &str) -> JumpOutcome {
        JumpOutcome::OutOfRange {
            requested: requested.to_string(),
            total: self.frames.len(),
        }
    }
}
