//! Synthetic log generation for demos and randomized fixtures.
//!
//! Produces the byte stream a controller would write: valid frames with a
//! lane pattern, interleaved with junk runs. Junk never contains the first
//! header byte, so every generated frame decodes back exactly.

#![allow(missing_docs)]

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::errors::{FwvError, Result};
use crate::decoder::frame::{Frame, StatusCode};
use crate::decoder::layout::{FrameLayout, IMAGE_ROW_LEN};

/// Frames per status code before the cycle moves on.
const STATUS_RUN: usize = 8;

/// Generator parameters.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub frames: usize,
    pub layout: FrameLayout,
    /// Probability in `[0, 1]` of a junk run before each frame.
    pub junk_ratio: f64,
    /// Fixed seed for reproducible output; random when `None`.
    pub seed: Option<u64>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            frames: 256,
            layout: FrameLayout::extended(),
            junk_ratio: 0.1,
            seed: None,
        }
    }
}

/// Generated bytes plus the frames they encode, in order.
#[derive(Debug, Clone)]
pub struct SynthLog {
    pub bytes: Vec<u8>,
    pub frames: Vec<Frame>,
    pub junk_bytes: usize,
}

/// Serialize one frame in `layout`'s wire format.
#[must_use]
pub fn encode_frame(frame: &Frame, layout: &FrameLayout) -> Vec<u8> {
    let mut out = Vec::with_capacity(layout.frame_length());
    out.extend_from_slice(&layout.header);
    out.extend_from_slice(&frame.image_row);
    if layout.has_status_byte {
        out.push(frame.status_code.raw());
    }
    if layout.has_error_byte {
        out.push(frame.error_value.to_le_bytes()[0]);
    }
    out.extend_from_slice(&layout.trailer);
    out
}

/// Build a synthetic log.
///
/// # Errors
/// `InvalidConfig` for a junk ratio outside `[0, 1]`, `InvalidLayout` for a
/// bad layout.
pub fn generate(config: &SynthConfig) -> Result<SynthLog> {
    if !(0.0..=1.0).contains(&config.junk_ratio) {
        return Err(FwvError::InvalidConfig {
            details: format!("junk_ratio must be in [0,1], got {}", config.junk_ratio),
        });
    }
    config.layout.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
    let forbidden = config.layout.header[0];
    let max_junk = config.layout.frame_length() * 2;

    let mut bytes = Vec::with_capacity(config.frames * config.layout.frame_length());
    let mut frames = Vec::with_capacity(config.frames);
    let mut junk_bytes = 0;
    let mut error: i8 = 0;

    for i in 0..config.frames {
        if rng.random_bool(config.junk_ratio) {
            let run = rng.random_range(1..=max_junk);
            for _ in 0..run {
                bytes.push(junk_byte(&mut rng, forbidden));
            }
            junk_bytes += run;
        }

        error = error.saturating_add(rng.random_range(-3..=3)).clamp(-100, 100);
        let mut frame = Frame::from_image(lane_row(error));
        if config.layout.has_status_byte {
            frame.status_code = cycle_status(i);
        }
        if config.layout.has_error_byte {
            frame.error_value = error;
        }
        bytes.extend(encode_frame(&frame, &config.layout));
        frames.push(frame);
    }

    Ok(SynthLog {
        bytes,
        frames,
        junk_bytes,
    })
}

/// Generate and write to `path`.
///
/// # Errors
/// Anything from [`generate`], or the write failing.
pub fn write_synth(path: &Path, config: &SynthConfig) -> Result<SynthLog> {
    let log = generate(config)?;
    fs::write(path, &log.bytes).map_err(|source| FwvError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(log)
}

fn junk_byte(rng: &mut StdRng, forbidden: u8) -> u8 {
    loop {
        let b: u8 = rng.random();
        if b != forbidden {
            return b;
        }
    }
}

fn cycle_status(index: usize) -> StatusCode {
    let code = (index / STATUS_RUN) % 6;
    StatusCode(u8::try_from(code).unwrap_or(0))
}

/// Two lit lane edges, shifted sideways by the steering error.
fn lane_row(error: i8) -> [u8; IMAGE_ROW_LEN] {
    let center = (7 + i32::from(error) / 20).clamp(3, 12);
    let mut row = [0u8; IMAGE_ROW_LEN];
    for edge in [center - 3, center + 3] {
        if let Ok(at) = usize::try_from(edge)
            && let Some(px) = row.get_mut(at)
        {
            *px = 1;
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::scanner::decode_frames;

    #[test]
    fn generated_frames_decode_back_exactly() {
        for layout in [FrameLayout::extended(), FrameLayout::image_only()] {
            let log = generate(&SynthConfig {
                frames: 300,
                layout: layout.clone(),
                junk_ratio: 0.4,
                seed: Some(7),
            })
            .unwrap();
            let out = decode_frames(&log.bytes, &layout);
            assert_eq!(out.frames, log.frames);
            assert_eq!(out.report.skipped_bytes, log.junk_bytes);
        }
    }

    #[test]
    fn seed_makes_output_reproducible() {
        let cfg = SynthConfig {
            seed: Some(42),
            ..SynthConfig::default()
        };
        assert_eq!(generate(&cfg).unwrap().bytes, generate(&cfg).unwrap().bytes);
    }

    #[test]
    fn zero_junk_ratio_is_back_to_back_frames() {
        let log = generate(&SynthConfig {
            frames: 10,
            junk_ratio: 0.0,
            seed: Some(1),
            ..SynthConfig::default()
        })
        .unwrap();
        assert_eq!(log.bytes.len(), 220);
        assert_eq!(log.junk_bytes, 0);
    }

    #[test]
    fn status_cycles_through_label_table() {
        let log = generate(&SynthConfig {
            frames: 48,
            junk_ratio: 0.0,
            seed: Some(3),
            ..SynthConfig::default()
        })
        .unwrap();
        assert_eq!(log.frames[0].status_code, StatusCode::NORMAL);
        assert_eq!(log.frames[8].status_code, StatusCode::LEFT);
        assert_eq!(log.frames[47].status_code, StatusCode::GO_RIGHT);
    }

    #[test]
    fn bad_junk_ratio_rejected() {
        let err = generate(&SynthConfig {
            junk_ratio: 1.5,
            ..SynthConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.code(), "FWV-1001");
    }

    #[test]
    fn encode_matches_wire_example() {
        let frame = Frame {
            image_row: [1; 16],
            status_code: StatusCode::STRAIGHT,
            error_value: -1,
        };
        let bytes = encode_frame(&frame, &FrameLayout::extended());
        assert_eq!(&bytes[..2], &[0x7F, 0x80]);
        assert_eq!(&bytes[18..], &[0x03, 0xFF, 0x80, 0x7F]);
    }

    #[test]
    fn lane_edges_stay_in_row() {
        for error in [-128i8, -100, 0, 100, 127] {
            assert_eq!(lane_row(error).iter().filter(|&&b| b == 1).count(), 2);
        }
    }
}
