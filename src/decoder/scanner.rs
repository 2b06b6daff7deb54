//! Resynchronizing frame scanner.
//!
//! The scanner walks the buffer with a cursor. At each position it checks the
//! header marker at the cursor and the trailer marker right after the payload.
//! A match yields the payload and jumps the cursor past the whole frame; a
//! miss advances the cursor by one byte. Corrupted or misaligned regions are
//! therefore skipped byte by byte until the stream lines up again, after
//! which scanning proceeds frame-aligned.
//!
//! Candidate positions are located with `memchr::memmem`, which visits the
//! same positions in the same order as a one-byte-at-a-time walk but skips
//! stretches that cannot start a header.

#![allow(missing_docs)]

use memchr::memmem::Finder;
use serde::{Deserialize, Serialize};

use super::frame::Frame;
use super::layout::FrameLayout;

/// Statistics gathered during one scan.
///
/// `frames * frame_length + skipped_bytes + trailing_bytes` always equals the
/// buffer length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Frames extracted.
    pub frames: usize,
    /// Positions rejected while searching for the next valid frame.
    pub skipped_bytes: usize,
    /// Maximal runs of rejected positions (each run is one resync).
    pub resync_events: usize,
    /// Bytes after the last position where a whole frame could still start.
    pub trailing_bytes: usize,
}

impl ScanReport {
    /// True when every byte of the buffer belonged to an extracted frame.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.skipped_bytes == 0 && self.trailing_bytes == 0
    }
}

/// One matched frame: byte offset of its header plus the payload slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanHit<'a> {
    pub offset: usize,
    pub payload: &'a [u8],
}

/// Iterator over the frames of a byte buffer.
///
/// `'a` is the buffer; `'m` is the marker storage, which may be shorter
/// lived than the payload slices handed out.
pub struct FrameScanner<'a, 'm> {
    bytes: &'a [u8],
    trailer: &'m [u8],
    finder: Finder<'m>,
    header_len: usize,
    payload_length: usize,
    frame_length: usize,
    pos: usize,
    in_resync: bool,
    finished: bool,
    report: ScanReport,
}

impl<'a, 'm> FrameScanner<'a, 'm> {
    /// Scanner over `bytes` with explicit markers and lengths.
    ///
    /// An inconsistent `frame_length` (not `header + payload + trailer`) or an
    /// empty header yields a scanner that reports no frames and treats the
    /// whole buffer as trailing.
    #[must_use]
    pub fn new(
        bytes: &'a [u8],
        header: &'m [u8],
        trailer: &'m [u8],
        frame_length: usize,
        payload_length: usize,
    ) -> Self {
        let consistent = !header.is_empty()
            && frame_length == header.len() + payload_length + trailer.len();
        let mut scanner = Self {
            bytes,
            trailer,
            finder: Finder::new(header),
            header_len: header.len(),
            payload_length,
            frame_length,
            pos: 0,
            in_resync: false,
            finished: false,
            report: ScanReport::default(),
        };
        if !consistent {
            scanner.finish();
        }
        scanner
    }

    /// Scanner configured from a [`FrameLayout`].
    #[must_use]
    pub fn for_layout(bytes: &'a [u8], layout: &'m FrameLayout) -> Self {
        Self::new(
            bytes,
            &layout.header,
            &layout.trailer,
            layout.frame_length(),
            layout.payload_length,
        )
    }

    /// Statistics so far. Complete once the iterator has returned `None`.
    #[must_use]
    pub const fn report(&self) -> ScanReport {
        self.report
    }

    fn skip(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        if !self.in_resync {
            self.report.resync_events += 1;
            self.in_resync = true;
        }
        self.report.skipped_bytes += count;
        self.pos += count;
    }

    fn finish(&mut self) {
        self.report.trailing_bytes = self.bytes.len().saturating_sub(self.pos);
        self.pos = self.bytes.len();
        self.finished = true;
    }

    fn trailer_matches(&self, header_at: usize) -> bool {
        let start = header_at + self.header_len + self.payload_length;
        self.bytes
            .get(start..start + self.trailer.len())
            .is_some_and(|slice| slice == self.trailer)
    }
}

impl<'a> Iterator for FrameScanner<'a, '_> {
    type Item = ScanHit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if self.pos + self.frame_length > self.bytes.len() {
                self.finish();
                return None;
            }

            // Headers may start anywhere up to `len - frame_length`.
            let last_start = self.bytes.len() - self.frame_length;
            let search_end = last_start + self.header_len;
            let Some(rel) = self.finder.find(&self.bytes[self.pos..search_end]) else {
                self.skip(last_start + 1 - self.pos);
                continue;
            };

            self.skip(rel);
            let at = self.pos;
            if self.trailer_matches(at) {
                let payload_start = at + self.header_len;
                let payload = &self.bytes[payload_start..payload_start + self.payload_length];
                self.pos = at + self.frame_length;
                self.in_resync = false;
                self.report.frames += 1;
                return Some(ScanHit {
                    offset: at,
                    payload,
                });
            }
            self.skip(1);
        }
    }
}

/// Extract payload slices from `bytes`.
///
/// This is the raw protocol contract: no field interpretation, no errors.
/// Malformed input simply produces fewer (possibly zero) payloads.
#[must_use]
pub fn scan_frames<'a>(
    bytes: &'a [u8],
    header: &[u8],
    trailer: &[u8],
    frame_length: usize,
    payload_length: usize,
) -> Vec<&'a [u8]> {
    FrameScanner::new(bytes, header, trailer, frame_length, payload_length)
        .map(|hit| hit.payload)
        .collect()
}

/// Decoded frames together with their byte offsets and scan statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOutput {
    pub frames: Vec<Frame>,
    pub offsets: Vec<usize>,
    pub report: ScanReport,
}

/// Scan `bytes` and interpret each payload according to `layout`.
///
/// A layout that fails [`FrameLayout::validate`] decodes nothing; the whole
/// buffer is reported as trailing.
#[must_use]
pub fn decode_frames(bytes: &[u8], layout: &FrameLayout) -> DecodeOutput {
    if layout.validate().is_err() {
        return DecodeOutput {
            report: ScanReport {
                trailing_bytes: bytes.len(),
                ..ScanReport::default()
            },
            ..DecodeOutput::default()
        };
    }
    let mut scanner = FrameScanner::for_layout(bytes, layout);
    let mut out = DecodeOutput::default();
    for hit in scanner.by_ref() {
        if let Some(frame) = Frame::from_payload(hit.payload, layout) {
            out.frames.push(frame);
            out.offsets.push(hit.offset);
        }
    }
    out.report = scanner.report();
    out
}
