//! Input file loading: one bulk read, then decode.

#![allow(missing_docs)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use super::frame::Frame;
use super::layout::FrameLayout;
use super::scanner::{ScanReport, decode_frames};
use crate::core::errors::{FwvError, Result};

/// Everything known about one decoded input file.
#[derive(Debug, Clone)]
pub struct DecodedLog {
    pub path: PathBuf,
    pub byte_len: usize,
    /// SHA-256 of the raw input, lowercase hex.
    pub sha256: String,
    pub layout: FrameLayout,
    pub frames: Vec<Frame>,
    /// Byte offset of each frame's header, parallel to `frames`.
    pub offsets: Vec<usize>,
    pub report: ScanReport,
    pub elapsed: Duration,
}

impl DecodedLog {
    /// Decode an in-memory buffer as if it had been read from `path`.
    #[must_use]
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8], layout: &FrameLayout) -> Self {
        let started = Instant::now();
        let output = decode_frames(bytes, layout);
        Self {
            path: path.into(),
            byte_len: bytes.len(),
            sha256: sha256_hex(bytes),
            layout: layout.clone(),
            frames: output.frames,
            offsets: output.offsets,
            report: output.report,
            elapsed: started.elapsed(),
        }
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Fail with [`FwvError::NoFrames`] when nothing was decoded.
    ///
    /// # Errors
    /// Returns `NoFrames` for an empty frame list.
    pub fn require_frames(&self) -> Result<()> {
        if self.frames.is_empty() {
            return Err(FwvError::NoFrames {
                path: self.path.clone(),
                bytes: self.byte_len,
            });
        }
        Ok(())
    }
}

/// Read the whole input file into memory.
///
/// # Errors
/// `InputNotFound` when the path does not exist, `Io` for anything else.
pub fn read_log(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| FwvError::io(path, source))
}

/// Read and decode `path` with `layout`.
///
/// A file that yields zero frames is not an error here; callers decide
/// whether that is fatal (see [`DecodedLog::require_frames`]).
///
/// # Errors
/// Invalid layout, or read failures from [`read_log`].
pub fn decode_file(path: &Path, layout: &FrameLayout) -> Result<DecodedLog> {
    layout.validate()?;
    let bytes = read_log(path)?;
    Ok(DecodedLog::from_bytes(path, &bytes, layout))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest
        .iter()
        .fold(String::with_capacity(digest.len() * 2), |mut s, b| {
            let _ = write!(s, "{b:02x}");
            s
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn frame_bytes(status: u8) -> Vec<u8> {
        let mut out = vec![0x7F, 0x80];
        out.extend_from_slice(&[1u8; 16]);
        out.extend_from_slice(&[status, 0xFE]);
        out.extend_from_slice(&[0x80, 0x7F]);
        out
    }

    #[test]
    fn decode_file_reads_and_decodes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("LOG00001.TXT");
        let mut bytes = frame_bytes(1);
        bytes.extend(frame_bytes(2));
        fs::write(&path, &bytes).unwrap();

        let log = decode_file(&path, &FrameLayout::extended()).unwrap();
        assert_eq!(log.frame_count(), 2);
        assert_eq!(log.byte_len, 44);
        assert_eq!(log.frames[1].error_value, -2);
        assert_eq!(log.sha256.len(), 64);
        assert!(log.require_frames().is_ok());
    }

    #[test]
    fn missing_file_is_input_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = decode_file(&tmp.path().join("nope.bin"), &FrameLayout::extended()).unwrap_err();
        assert_eq!(err.code(), "FWV-3001");
    }

    #[test]
    fn zero_frames_is_reported_by_require_frames() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("junk.bin");
        fs::write(&path, [0u8; 100]).unwrap();
        let log = decode_file(&path, &FrameLayout::extended()).unwrap();
        assert_eq!(log.frame_count(), 0);
        let err = log.require_frames().unwrap_err();
        assert_eq!(err.code(), "FWV-2002");
    }

    #[test]
    fn invalid_layout_rejected_before_reading() {
        let layout = FrameLayout {
            payload_length: 3,
            ..FrameLayout::extended()
        };
        let err = decode_file(Path::new("/does/not/matter"), &layout).unwrap_err();
        assert_eq!(err.code(), "FWV-2001");
    }

    #[test]
    fn digest_matches_known_value() {
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
