//! Fixed 16-row recency window.
//!
//! Display row 15 always holds the target frame; rows above it hold the 15
//! frames before it, oldest at the top. Rows with no source frame are padded
//! with dark pixels and a `Normal` / 0 status.

#![allow(missing_docs)]

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::decoder::frame::{Frame, PIXEL_OFF, StatusCode};
use crate::decoder::layout::IMAGE_ROW_LEN;

/// Rows shown at once.
pub const WINDOW_ROWS: usize = 16;

/// Sidebar entry for one display row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowStatus {
    pub code: StatusCode,
    pub error: i8,
}

impl RowStatus {
    #[must_use]
    pub fn label(&self) -> Cow<'static, str> {
        self.code.label()
    }
}

/// Materialized view at one cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Zero-based target row the window was built for.
    pub target_row: usize,
    /// Display intensities, row-major, display row 0 first.
    pub pixels: [[u8; IMAGE_ROW_LEN]; WINDOW_ROWS],
    pub statuses: [RowStatus; WINDOW_ROWS],
    /// Frame index shown on each display row, `None` for padding.
    pub sources: [Option<usize>; WINDOW_ROWS],
}

impl Window {
    /// Number of display rows backed by a real frame.
    #[must_use]
    pub fn filled_rows(&self) -> usize {
        self.sources.iter().filter(|s| s.is_some()).count()
    }

    /// Render one display row with the given glyphs for lit and dark pixels.
    #[must_use]
    pub fn row_text(&self, display_row: usize, on: &str, off: &str) -> String {
        let Some(row) = self.pixels.get(display_row) else {
            return String::new();
        };
        row.iter()
            .map(|&px| if px == PIXEL_OFF { off } else { on })
            .collect()
    }
}

/// Build the window whose bottom row is `frames[target_row]`.
///
/// Display row `d` shows `frames[target_row - 15 + d]` when that index
/// exists. Out-of-range targets are not an error; they just produce more
/// padding.
#[must_use]
pub fn materialize(frames: &[Frame], target_row: usize) -> Window {
    let mut window = Window {
        target_row,
        pixels: [[PIXEL_OFF; IMAGE_ROW_LEN]; WINDOW_ROWS],
        statuses: [RowStatus::default(); WINDOW_ROWS],
        sources: [None; WINDOW_ROWS],
    };

    for d in 0..WINDOW_ROWS {
        let Some(index) = (target_row + d).checked_sub(WINDOW_ROWS - 1) else {
            continue;
        };
        let Some(frame) = frames.get(index) else {
            continue;
        };
        window.pixels[d] = frame.intensities();
        window.statuses[d] = RowStatus {
            code: frame.status_code,
            error: frame.error_value,
        };
        window.sources[d] = Some(index);
    }
    window
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: usize) -> Vec<Frame> {
        (0..n)
            .map(|i| {
                let mut row = [0u8; IMAGE_ROW_LEN];
                row[i % IMAGE_ROW_LEN] = 1;
                Frame {
                    image_row: row,
                    status_code: StatusCode(u8::try_from(i % 7).unwrap()),
                    error_value: i8::try_from(i % 100).unwrap() - 50,
                }
            })
            .collect()
    }

    #[test]
    fn first_row_pads_fifteen_rows_above() {
        let frames = frames(40);
        let w = materialize(&frames, 0);
        for d in 0..15 {
            assert_eq!(w.pixels[d], [0; 16]);
            assert_eq!(w.statuses[d], RowStatus::default());
            assert_eq!(w.statuses[d].label(), "Normal");
            assert_eq!(w.sources[d], None);
        }
        assert_eq!(w.pixels[15], frames[0].intensities());
        assert_eq!(w.sources[15], Some(0));
        assert_eq!(w.filled_rows(), 1);
    }

    #[test]
    fn deep_target_fills_every_row_oldest_on_top() {
        let frames = frames(40);
        let w = materialize(&frames, 30);
        assert_eq!(w.filled_rows(), 16);
        for d in 0..WINDOW_ROWS {
            assert_eq!(w.sources[d], Some(15 + d));
            assert_eq!(w.statuses[d].code, frames[15 + d].status_code);
            assert_eq!(w.statuses[d].error, frames[15 + d].error_value);
        }
    }

    #[test]
    fn advancing_target_shifts_rows_up() {
        let frames = frames(25);
        for t in 0..24 {
            let before = materialize(&frames, t);
            let after = materialize(&frames, t + 1);
            for d in 0..15 {
                assert_eq!(after.pixels[d], before.pixels[d + 1]);
                assert_eq!(after.statuses[d], before.statuses[d + 1]);
            }
            assert_eq!(after.sources[15], Some(t + 1));
        }
    }

    #[test]
    fn single_frame_log() {
        let frames = frames(1);
        let w = materialize(&frames, 0);
        assert_eq!(w.filled_rows(), 1);
        assert_eq!(w.sources[15], Some(0));
    }

    #[test]
    fn empty_or_out_of_range_input_is_all_padding() {
        assert_eq!(materialize(&[], 0).filled_rows(), 0);
        let frames = frames(3);
        let w = materialize(&frames, 100);
        assert_eq!(w.filled_rows(), 0);
        assert_eq!(w.pixels, [[0; 16]; 16]);
    }

    #[test]
    fn row_text_uses_glyphs() {
        let mut row = [0u8; IMAGE_ROW_LEN];
        row[0] = 1;
        row[15] = 1;
        let w = materialize(&[Frame::from_image(row)], 0);
        assert_eq!(w.row_text(15, "#", "."), "#..............#");
        assert_eq!(w.row_text(0, "#", "."), ".".repeat(16));
        assert_eq!(w.row_text(16, "#", "."), "");
    }
}
