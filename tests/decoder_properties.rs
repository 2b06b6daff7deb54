//! Property-based tests for the decoder, the recency window, and navigation.
//!
//! Uses `proptest` to check that resynchronization recovers every embedded
//! frame regardless of the junk around it, that the window slides by exactly
//! one row per step, and that no input sequence moves the cursor out of
//! bounds.

use proptest::prelude::*;

use frame_waterfall::decoder::frame::{Frame, StatusCode};
use frame_waterfall::decoder::layout::FrameLayout;
use frame_waterfall::decoder::scanner::decode_frames;
use frame_waterfall::session::{Direction, Session};
use frame_waterfall::synth::encode_frame;
use frame_waterfall::window::{WINDOW_ROWS, materialize};

// ──────────────────── strategies ────────────────────

fn arb_frame() -> impl Strategy<Value = Frame> {
    (any::<[u8; 16]>(), any::<u8>(), any::<i8>()).prop_map(|(image_row, code, error)| Frame {
        image_row,
        status_code: StatusCode(code),
        error_value: error,
    })
}

/// Junk that can never start a header.
fn arb_junk() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>().prop_filter("header byte", |b| *b != 0x7F), 0..40)
}

#[derive(Debug, Clone)]
enum NavOp {
    Step(Direction),
    Page(Direction),
    First,
    Last,
    Jump(String),
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Forward), Just(Direction::Backward)]
}

fn arb_nav_op() -> impl Strategy<Value = NavOp> {
    prop_oneof![
        arb_direction().prop_map(NavOp::Step),
        arb_direction().prop_map(NavOp::Page),
        Just(NavOp::First),
        Just(NavOp::Last),
        (-5i64..300).prop_map(|n| NavOp::Jump(n.to_string())),
        "[a-z0-9 ]{0,6}".prop_map(NavOp::Jump),
    ]
}

fn image_frames(n: usize) -> Vec<Frame> {
    (0..n)
        .map(|i| Frame {
            image_row: std::array::from_fn(|px| u8::from((i + px) % 3 == 0)),
            status_code: StatusCode(u8::try_from(i % 6).unwrap()),
            error_value: i8::try_from(i % 100).unwrap(),
        })
        .collect()
}

// ──────────────────── decoder ────────────────────

proptest! {
    #[test]
    fn resync_recovers_every_embedded_frame(
        chunks in prop::collection::vec((arb_junk(), arb_frame()), 0..24),
        tail in arb_junk(),
    ) {
        let layout = FrameLayout::extended();
        let mut bytes = Vec::new();
        let mut expected = Vec::new();
        for (junk, frame) in &chunks {
            bytes.extend_from_slice(junk);
            bytes.extend(encode_frame(frame, &layout));
            expected.push(*frame);
        }
        bytes.extend_from_slice(&tail);

        let output = decode_frames(&bytes, &layout);
        prop_assert_eq!(&output.frames, &expected);

        let junk_total: usize = chunks.iter().map(|(j, _)| j.len()).sum::<usize>() + tail.len();
        let report = output.report;
        prop_assert_eq!(report.skipped_bytes + report.trailing_bytes, junk_total);
        prop_assert_eq!(
            report.frames * layout.frame_length() + report.skipped_bytes + report.trailing_bytes,
            bytes.len()
        );
    }

    #[test]
    fn image_only_resync_recovers_every_frame(
        chunks in prop::collection::vec((arb_junk(), any::<[u8; 16]>()), 0..24),
    ) {
        let layout = FrameLayout::image_only();
        let mut bytes = Vec::new();
        for (junk, image) in &chunks {
            bytes.extend_from_slice(junk);
            bytes.extend(encode_frame(&Frame::from_image(*image), &layout));
        }

        let output = decode_frames(&bytes, &layout);
        prop_assert_eq!(output.frames.len(), chunks.len());
        for (frame, (_, image)) in output.frames.iter().zip(&chunks) {
            prop_assert_eq!(&frame.image_row, image);
            prop_assert_eq!(frame.status_code, StatusCode::NORMAL);
            prop_assert_eq!(frame.error_value, 0);
        }
    }

    #[test]
    fn arbitrary_bytes_never_panic_and_account_for_every_byte(
        bytes in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let layout = FrameLayout::extended();
        let output = decode_frames(&bytes, &layout);
        let report = output.report;
        prop_assert_eq!(report.frames, output.frames.len());
        prop_assert_eq!(
            report.frames * layout.frame_length() + report.skipped_bytes + report.trailing_bytes,
            bytes.len()
        );
    }
}

// ──────────────────── window ────────────────────

proptest! {
    #[test]
    fn window_shifts_by_one_row_per_step(n in 1usize..80, seed in any::<usize>()) {
        let frames = image_frames(n);
        let t = seed % n;
        prop_assume!(t >= 1);
        let current = materialize(&frames, t);
        let previous = materialize(&frames, t - 1);
        for d in 0..WINDOW_ROWS - 1 {
            prop_assert_eq!(current.pixels[d], previous.pixels[d + 1]);
            prop_assert_eq!(current.statuses[d], previous.statuses[d + 1]);
            prop_assert_eq!(current.sources[d], previous.sources[d + 1]);
        }
        prop_assert_eq!(current.sources[WINDOW_ROWS - 1], Some(t));
    }

    #[test]
    fn window_is_saturated_once_enough_history_exists(n in 16usize..80, seed in any::<usize>()) {
        let frames = image_frames(n);
        let t = 15 + seed % (n - 15);
        let window = materialize(&frames, t);
        prop_assert_eq!(window.filled_rows(), WINDOW_ROWS);
        for d in 0..WINDOW_ROWS {
            prop_assert_eq!(window.sources[d], Some(t + d - 15));
        }
    }
}

// ──────────────────── navigation ────────────────────

proptest! {
    #[test]
    fn navigation_never_leaves_bounds(
        n in 1usize..200,
        ops in prop::collection::vec(arb_nav_op(), 0..64),
    ) {
        let mut session = Session::new(image_frames(n)).unwrap();
        for op in ops {
            let before = session.cursor();
            match op {
                NavOp::Step(direction) => {
                    session.step(direction);
                }
                NavOp::Page(direction) => {
                    session.page(direction);
                }
                NavOp::First => {
                    session.first();
                }
                NavOp::Last => {
                    session.last();
                }
                NavOp::Jump(input) => {
                    let outcome = session.jump(&input);
                    if !outcome.is_accepted() {
                        prop_assert_eq!(session.cursor(), before);
                    }
                }
            }
            prop_assert!(session.cursor() < n);
            let (row, total) = session.position();
            prop_assert!((1..=total).contains(&row));
            prop_assert_eq!(total, n);
        }
    }
}
