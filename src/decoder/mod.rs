//! Binary log decoding: layout description, resynchronizing scanner, and
//! typed frame records.

pub mod frame;
pub mod layout;
pub mod scanner;
pub mod source;

pub use frame::{Frame, StatusCode};
pub use layout::{FrameLayout, LayoutPreset};
pub use scanner::{DecodeOutput, ScanReport, decode_frames, scan_frames};
pub use source::{DecodedLog, decode_file, read_log};
