//! Terminal waterfall viewer.
//!
//! Elm-style split: `model` holds state, `update` applies messages, `input`
//! maps keys, `render` produces styled lines, `runtime` owns the terminal and
//! the event loop.

#![allow(missing_docs)]

pub mod input;
pub mod model;
pub mod render;
pub mod runtime;
pub mod terminal_guard;
pub mod theme;
pub mod update;

pub use runtime::{ViewerOptions, ViewerSummary, run_viewer};
