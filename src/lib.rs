#![forbid(unsafe_code)]

//! frame_waterfall (fwv): decoder and terminal waterfall viewer for binary
//! logs written by a 16x16 line-following sensor controller.
//!
//! The pipeline has three stages:
//! 1. **Decoder** finds delimited frames in an arbitrary byte stream and
//!    resynchronizes past corrupt or partial data.
//! 2. **Window** materializes the 16 most recent rows ending at a target row.
//! 3. **Session** owns the cursor and handles stepping, paging, and jumps.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use frame_waterfall::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let log = decode_file(std::path::Path::new("LOG00083.TXT"), &FrameLayout::extended())?;
//! let mut session = Session::from_log(log)?;
//! session.last();
//! let window = session.window();
//! println!("{}", window.row_text(15, "#", "."));
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod core;
pub mod decoder;
pub mod logger;
pub mod session;
pub mod synth;
#[cfg(feature = "tui")]
pub mod viewer;
pub mod window;
