//! Decoded frame record and payload field interpretation.

#![allow(missing_docs)]

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::layout::{FrameLayout, IMAGE_ROW_LEN};

/// Display intensity of a lit pixel.
pub const PIXEL_ON: u8 = 255;

/// Display intensity of a dark pixel.
pub const PIXEL_OFF: u8 = 0;

/// Steering status reported by the controller alongside each image row.
///
/// Stored as the raw byte; codes outside the known table are kept verbatim
/// and labelled `Unknown(<code>)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub u8);

impl StatusCode {
    pub const NORMAL: Self = Self(0);
    pub const LEFT: Self = Self(1);
    pub const RIGHT: Self = Self(2);
    pub const STRAIGHT: Self = Self(3);
    pub const GO_LEFT: Self = Self(4);
    pub const GO_RIGHT: Self = Self(5);

    /// Raw byte value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Label from the fixed table, `None` for unrecognized codes.
    #[must_use]
    pub const fn known_label(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("Normal"),
            1 => Some("Left"),
            2 => Some("Right"),
            3 => Some("Straight"),
            4 => Some("Go_Left"),
            5 => Some("Go_Right"),
            _ => None,
        }
    }

    /// Human label; unrecognized codes render as `Unknown(<code>)`.
    #[must_use]
    pub fn label(self) -> Cow<'static, str> {
        match self.known_label() {
            Some(label) => Cow::Borrowed(label),
            None => Cow::Owned(format!("Unknown({})", self.0)),
        }
    }

    /// Whether the code is in the label table.
    #[must_use]
    pub const fn is_known(self) -> bool {
        self.known_label().is_some()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<u8> for StatusCode {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

/// Reinterpret a raw error byte as signed 8-bit two's complement.
#[must_use]
pub const fn decode_error_value(raw: u8) -> i8 {
    raw as i8
}

/// Map a wire pixel byte to display intensity: zero stays dark, anything
/// else is lit.
#[must_use]
pub const fn pixel_intensity(raw: u8) -> u8 {
    if raw == 0 { PIXEL_OFF } else { PIXEL_ON }
}

/// One decoded log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Raw pixel bytes as written by the controller (0 or 1 in practice).
    pub image_row: [u8; IMAGE_ROW_LEN],
    pub status_code: StatusCode,
    pub error_value: i8,
}

impl Frame {
    /// Frame with the given pixels and default status (`Normal`, error 0).
    #[must_use]
    pub const fn from_image(image_row: [u8; IMAGE_ROW_LEN]) -> Self {
        Self {
            image_row,
            status_code: StatusCode::NORMAL,
            error_value: 0,
        }
    }

    /// Interpret a payload slice according to `layout`.
    ///
    /// Returns `None` when the payload is shorter than the layout requires,
    /// or when a field the layout declares lies past the end of the payload.
    #[must_use]
    pub fn from_payload(payload: &[u8], layout: &FrameLayout) -> Option<Self> {
        if payload.len() < layout.payload_length {
            return None;
        }
        let image_row: [u8; IMAGE_ROW_LEN] = payload.get(..IMAGE_ROW_LEN)?.try_into().ok()?;

        let status_code = match layout.status_offset() {
            Some(at) => StatusCode(*payload.get(at)?),
            None => StatusCode::NORMAL,
        };
        let error_value = match layout.error_offset() {
            Some(at) => decode_error_value(*payload.get(at)?),
            None => 0,
        };

        Some(Self {
            image_row,
            status_code,
            error_value,
        })
    }

    /// Display intensities (0 or 255) for the 16 pixels.
    #[must_use]
    pub fn intensities(&self) -> [u8; IMAGE_ROW_LEN] {
        let mut out = [PIXEL_OFF; IMAGE_ROW_LEN];
        for (dst, raw) in out.iter_mut().zip(self.image_row) {
            *dst = pixel_intensity(raw);
        }
        out
    }

    /// Number of lit pixels.
    #[must_use]
    pub fn lit_count(&self) -> usize {
        self.image_row.iter().filter(|&&b| b != 0).count()
    }

    /// Compact `#`/`.` rendering of the row, for text output.
    #[must_use]
    pub fn bitmap(&self) -> String {
        self.image_row
            .iter()
            .map(|&b| if b == 0 { '.' } else { '#' })
            .collect()
    }
}
