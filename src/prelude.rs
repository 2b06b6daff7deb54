//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use frame_waterfall::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{FwvError, Result};

// Decoder
pub use crate::decoder::{
    DecodedLog, Frame, FrameLayout, LayoutPreset, ScanReport, StatusCode, decode_file,
    decode_frames, read_log,
};

// Window + navigation
pub use crate::session::{Direction, JumpOutcome, Session};
pub use crate::window::{WINDOW_ROWS, Window, materialize};

// Logging
pub use crate::logger::ActivityLogger;
