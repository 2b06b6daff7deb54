//! Elm-style state model for the waterfall viewer.
//!
//! All display state lives in [`ViewerModel`]. Terminal and loader events
//! arrive as [`ViewerMsg`] values; side-effects come back from `update` as
//! [`ViewerCmd`] values. Nothing in this module performs I/O.

#![allow(missing_docs)]

use std::path::PathBuf;

use crossterm::event::KeyEvent;

use crate::core::errors::{FwvError, Result};
use crate::decoder::scanner::ScanReport;
use crate::decoder::source::DecodedLog;
use crate::session::{JumpOutcome, Session};

/// Digits accepted in the jump box.
pub const JUMP_INPUT_MAX: usize = 12;

/// Where the session is in its lifecycle.
#[derive(Debug)]
pub enum LoadState {
    Loading,
    Ready(Session),
    Failed(FwvError),
}

/// Non-fatal message shown under the jump box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_warning: bool,
}

/// Glyphs for lit and dark pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyphs {
    pub on: String,
    pub off: String,
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            on: "██".to_string(),
            off: "··".to_string(),
        }
    }
}

/// Full viewer state.
#[derive(Debug)]
pub struct ViewerModel {
    pub path: PathBuf,
    pub state: LoadState,
    pub report: Option<ScanReport>,
    pub jump_input: String,
    pub status: Option<StatusMessage>,
    pub show_help: bool,
    pub start_at_end: bool,
    pub glyphs: Glyphs,
    pub terminal_size: (u16, u16),
    pub quit: bool,
}

impl ViewerModel {
    #[must_use]
    pub fn new(path: PathBuf, glyphs: Glyphs, start_at_end: bool) -> Self {
        Self {
            path,
            state: LoadState::Loading,
            report: None,
            jump_input: String::new(),
            status: None,
            show_help: false,
            start_at_end,
            glyphs,
            terminal_size: (80, 24),
            quit: false,
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            LoadState::Ready(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match &mut self.state {
            LoadState::Ready(session) => Some(session),
            _ => None,
        }
    }

    /// `(current_row, total_rows)` once loaded.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        self.session().map(Session::position)
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_warning: false,
        });
    }

    pub fn set_warning(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_warning: true,
        });
    }
}

// ──────────────────── messages ────────────────────

/// Events that drive state transitions.
#[derive(Debug)]
pub enum ViewerMsg {
    Key(KeyEvent),
    Resize { cols: u16, rows: u16 },
    /// Background decode finished.
    Loaded(Result<DecodedLog>),
}

// ──────────────────── commands ────────────────────

/// Side-effects for the runtime to execute.
#[derive(Debug, PartialEq, Eq)]
pub enum ViewerCmd {
    None,
    /// Repaint needed.
    Redraw,
    /// Record a rejected jump in the activity log, then repaint.
    JumpRejected(JumpOutcome),
    Quit,
}
