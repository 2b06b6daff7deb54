//! Event loop: decode in the background, route keys through `update`, paint
//! `render` output with crossterm.

#![allow(missing_docs)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event};
use crossterm::queue;
use crossterm::style::{Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use crate::core::errors::{FwvError, Result};
use crate::decoder::layout::FrameLayout;
use crate::decoder::scanner::ScanReport;
use crate::decoder::source::DecodedLog;
use crate::logger::ActivityLogger;
use crate::session::loader::{PendingDecode, spawn_decode};

use super::model::{Glyphs, LoadState, ViewerCmd, ViewerModel, ViewerMsg};
use super::render::{Line, render_lines};
use super::terminal_guard::TerminalGuard;
use super::theme::{ColorMode, Theme};
use super::update::update;

/// How long to wait for a key before checking the loader again.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Everything the viewer needs to start.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub path: PathBuf,
    pub layout: FrameLayout,
    pub glyphs: Glyphs,
    pub start_at_end: bool,
    pub color: ColorMode,
}

/// Where the user left off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerSummary {
    /// `(row, total)` at exit, row 1-indexed.
    pub position: (usize, usize),
    pub report: Option<ScanReport>,
    pub elapsed: Duration,
}

/// Run the interactive viewer until the user quits.
///
/// # Errors
/// Load failures (missing file, zero frames) after the terminal has been
/// restored, and terminal I/O failures as `Runtime`.
pub fn run_viewer(options: ViewerOptions, logger: &mut ActivityLogger) -> Result<ViewerSummary> {
    let started = Instant::now();
    let pending = spawn_decode(options.path.clone(), options.layout)?;
    let theme = Theme::new(options.color);
    let mut model = ViewerModel::new(options.path, options.glyphs, options.start_at_end);

    let guard = TerminalGuard::new().map_err(terminal_error)?;
    model.terminal_size = TerminalGuard::terminal_size();
    let loop_result = event_loop(&mut io::stdout(), &mut model, Some(pending), &theme, logger);
    drop(guard);
    loop_result.map_err(terminal_error)?;

    let elapsed = started.elapsed();
    match model.state {
        LoadState::Failed(err) => Err(err),
        LoadState::Ready(session) => {
            logger.session_end(session.position(), elapsed);
            Ok(ViewerSummary {
                position: session.position(),
                report: model.report,
                elapsed,
            })
        }
        LoadState::Loading => Ok(ViewerSummary {
            position: (0, 0),
            report: None,
            elapsed,
        }),
    }
}

fn terminal_error(e: io::Error) -> FwvError {
    FwvError::Runtime {
        details: format!("terminal I/O failed: {e}"),
    }
}

fn event_loop(
    out: &mut impl Write,
    model: &mut ViewerModel,
    mut pending: Option<PendingDecode>,
    theme: &Theme,
    logger: &mut ActivityLogger,
) -> io::Result<()> {
    let mut dirty = true;
    loop {
        let loaded = pending.as_mut().and_then(PendingDecode::try_take);
        if let Some(result) = loaded {
            pending = None;
            log_load(logger, &result);
            dirty |= execute_cmd(update(model, ViewerMsg::Loaded(result)), logger);
        }
        if model.quit {
            return Ok(());
        }

        if dirty {
            paint(out, &render_lines(model), theme, model.terminal_size)?;
            dirty = false;
        }

        if event::poll(POLL_INTERVAL)? {
            let msg = match event::read()? {
                Event::Key(key) => ViewerMsg::Key(key),
                Event::Resize(cols, rows) => ViewerMsg::Resize { cols, rows },
                _ => continue,
            };
            dirty |= execute_cmd(update(model, msg), logger);
            if model.quit {
                return Ok(());
            }
        }
    }
}

/// Run a command's side-effects; returns whether a repaint is needed.
fn execute_cmd(cmd: ViewerCmd, logger: &mut ActivityLogger) -> bool {
    match cmd {
        ViewerCmd::None | ViewerCmd::Quit => false,
        ViewerCmd::Redraw => true,
        ViewerCmd::JumpRejected(outcome) => {
            logger.jump_rejected(&outcome);
            true
        }
    }
}

fn log_load(logger: &mut ActivityLogger, result: &Result<DecodedLog>) {
    match result {
        Ok(log) if log.frames.is_empty() => logger.no_frames(&log.path, log.byte_len),
        Ok(log) => logger.decode_complete(log),
        Err(err) => logger.error(err),
    }
}

fn paint(out: &mut impl Write, lines: &[Line], theme: &Theme, size: (u16, u16)) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for (row, line) in lines.iter().enumerate().take(usize::from(size.1)) {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, MoveTo(0, row))?;
        for span in &line.spans {
            if let Some(color) = theme.color(span.token) {
                queue!(out, SetForegroundColor(color))?;
            }
            queue!(out, Print(&span.text))?;
        }
        queue!(out, ResetColor)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::JumpOutcome;
    use crate::viewer::render::Span;
    use crate::viewer::theme::SemanticToken;

    #[test]
    fn commands_map_to_repaint_decisions() {
        let mut logger = ActivityLogger::disabled();
        assert!(!execute_cmd(ViewerCmd::None, &mut logger));
        assert!(!execute_cmd(ViewerCmd::Quit, &mut logger));
        assert!(execute_cmd(ViewerCmd::Redraw, &mut logger));
        assert!(execute_cmd(
            ViewerCmd::JumpRejected(JumpOutcome::NotANumber {
                input: "x".to_string()
            }),
            &mut logger
        ));
    }

    #[test]
    fn paint_without_color_emits_plain_text() {
        let model = ViewerModel::new(PathBuf::from("a.bin"), Glyphs::default(), false);
        let mut buf = Vec::new();
        paint(
            &mut buf,
            &render_lines(&model),
            &Theme::new(ColorMode::Disabled),
            (80, 24),
        )
        .unwrap();
        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("Decoding a.bin"));
        // No SGR foreground sequences when color is off.
        assert!(!text.contains("\x1b[38;"));
    }

    #[test]
    fn paint_clips_to_terminal_height() {
        let lines: Vec<Line> = (0..10)
            .map(|i| Line {
                spans: vec![Span {
                    text: format!("line{i}"),
                    token: SemanticToken::Neutral,
                }],
            })
            .collect();
        let mut buf = Vec::new();
        paint(&mut buf, &lines, &Theme::new(ColorMode::Disabled), (80, 3)).unwrap();
        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("line2"));
        assert!(!text.contains("line3"));
    }
}
