//! Background decode: read and scan the input off the UI thread.

#![allow(missing_docs)]

use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};

use crate::core::errors::{FwvError, Result};
use crate::decoder::layout::FrameLayout;
use crate::decoder::source::{DecodedLog, decode_file};

/// Handle to an in-flight decode.
pub struct PendingDecode {
    rx: Receiver<Result<DecodedLog>>,
    join: Option<JoinHandle<()>>,
}

impl PendingDecode {
    /// Non-blocking poll. `None` while the worker is still running.
    pub fn try_take(&mut self) -> Option<Result<DecodedLog>> {
        match self.rx.try_recv() {
            Ok(result) => {
                self.reap();
                Some(result)
            }
            Err(crossbeam_channel::TryRecvError::Empty) => None,
            Err(crossbeam_channel::TryRecvError::Disconnected) => {
                self.reap();
                Some(Err(FwvError::ChannelClosed {
                    component: "decode-worker",
                }))
            }
        }
    }

    /// Wait up to `timeout` for the result.
    pub fn wait_timeout(&mut self, timeout: std::time::Duration) -> Option<Result<DecodedLog>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => {
                self.reap();
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.reap();
                Some(Err(FwvError::ChannelClosed {
                    component: "decode-worker",
                }))
            }
        }
    }

    /// Block until the worker delivers.
    ///
    /// # Errors
    /// The decode error, or `ChannelClosed` if the worker died without sending.
    pub fn wait(mut self) -> Result<DecodedLog> {
        let result = self.rx.recv().map_err(|_| FwvError::ChannelClosed {
            component: "decode-worker",
        });
        self.reap();
        result?
    }

    fn reap(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Start decoding `path` on a dedicated worker thread.
///
/// # Errors
/// `Runtime` if the thread could not be spawned.
pub fn spawn_decode(path: PathBuf, layout: FrameLayout) -> Result<PendingDecode> {
    let (tx, rx) = bounded(1);
    let join = thread::Builder::new()
        .name("fwv-decode".to_string())
        .spawn(move || {
            let result = decode_file(&path, &layout);
            // Receiver gone means the viewer already quit.
            let _ = tx.send(result);
        })
        .map_err(|source| FwvError::Runtime {
            details: format!("failed to spawn decode thread: {source}"),
        })?;
    Ok(PendingDecode {
        rx,
        join: Some(join),
    })
}
