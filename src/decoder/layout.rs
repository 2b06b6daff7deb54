//! On-disk frame layout: delimiter markers plus payload shape.
//!
//! Two layouts exist in the field. The older firmware writes only the 16-byte
//! image row (20-byte frames); newer firmware appends a status byte and a
//! signed error byte (22-byte frames). The layout is configuration, never
//! sniffed from the data.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use crate::core::errors::{FwvError, Result};

/// Number of pixels in one image row.
pub const IMAGE_ROW_LEN: usize = 16;

/// Header marker written by the controller firmware.
pub const DEFAULT_HEADER: [u8; 2] = [0x7F, 0x80];

/// Trailer marker written by the controller firmware.
pub const DEFAULT_TRAILER: [u8; 2] = [0x80, 0x7F];

/// Named layout presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPreset {
    /// 16 image bytes only (20-byte frames).
    ImageOnly,
    /// 16 image bytes + status byte + error byte (22-byte frames).
    #[default]
    Extended,
}

impl LayoutPreset {
    /// Stable label used in config files, CLI flags, and log records.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ImageOnly => "image_only",
            Self::Extended => "extended",
        }
    }

    /// Parse a label, accepting `-` or `_` as separator.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "image_only" | "image" | "20" => Some(Self::ImageOnly),
            "extended" | "ext" | "22" => Some(Self::Extended),
            _ => None,
        }
    }
}

/// Byte-level shape of one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameLayout {
    pub header: Vec<u8>,
    pub trailer: Vec<u8>,
    pub payload_length: usize,
    pub has_status_byte: bool,
    pub has_error_byte: bool,
}

impl FrameLayout {
    /// 20-byte frames carrying only the image row.
    #[must_use]
    pub fn image_only() -> Self {
        Self {
            header: DEFAULT_HEADER.to_vec(),
            trailer: DEFAULT_TRAILER.to_vec(),
            payload_length: IMAGE_ROW_LEN,
            has_status_byte: false,
            has_error_byte: false,
        }
    }

    /// 22-byte frames carrying image row, status code, and error value.
    #[must_use]
    pub fn extended() -> Self {
        Self {
            header: DEFAULT_HEADER.to_vec(),
            trailer: DEFAULT_TRAILER.to_vec(),
            payload_length: IMAGE_ROW_LEN + 2,
            has_status_byte: true,
            has_error_byte: true,
        }
    }

    /// Build a preset layout with custom markers.
    #[must_use]
    pub fn from_preset(preset: LayoutPreset, header: &[u8], trailer: &[u8]) -> Self {
        let mut layout = match preset {
            LayoutPreset::ImageOnly => Self::image_only(),
            LayoutPreset::Extended => Self::extended(),
        };
        layout.header = header.to_vec();
        layout.trailer = trailer.to_vec();
        layout
    }

    /// Total on-disk frame length: header + payload + trailer.
    #[must_use]
    pub fn frame_length(&self) -> usize {
        self.header.len() + self.payload_length + self.trailer.len()
    }

    /// Payload offset of the status byte, if the layout has one.
    #[must_use]
    pub const fn status_offset(&self) -> Option<usize> {
        if self.has_status_byte {
            Some(IMAGE_ROW_LEN)
        } else {
            None
        }
    }

    /// Payload offset of the error byte, if the layout has one.
    #[must_use]
    pub const fn error_offset(&self) -> Option<usize> {
        match (self.has_status_byte, self.has_error_byte) {
            (_, false) => None,
            (true, true) => Some(IMAGE_ROW_LEN + 1),
            (false, true) => Some(IMAGE_ROW_LEN),
        }
    }

    /// Which preset this layout matches, ignoring markers.
    #[must_use]
    pub const fn preset(&self) -> Option<LayoutPreset> {
        match (self.has_status_byte, self.has_error_byte) {
            (false, false) => Some(LayoutPreset::ImageOnly),
            (true, true) => Some(LayoutPreset::Extended),
            _ => None,
        }
    }

    /// Check the structural invariants of the layout.
    ///
    /// # Errors
    /// Returns [`FwvError::InvalidLayout`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.header.is_empty() || self.trailer.is_empty() {
            return Err(FwvError::InvalidLayout {
                details: "header and trailer markers must be non-empty".to_string(),
            });
        }
        let expected = IMAGE_ROW_LEN
            + usize::from(self.has_status_byte)
            + usize::from(self.has_error_byte);
        if self.payload_length != expected {
            return Err(FwvError::InvalidLayout {
                details: format!(
                    "payload_length {} does not match fields (16 image bytes{}{}) = {expected}",
                    self.payload_length,
                    if self.has_status_byte { " + status" } else { "" },
                    if self.has_error_byte { " + error" } else { "" },
                ),
            });
        }
        Ok(())
    }
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self::extended()
    }
}
