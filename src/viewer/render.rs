//! Pure rendering: model in, styled lines out.
//!
//! The runtime paints these lines with crossterm; tests read them back as
//! plain text.

#![allow(missing_docs)]

use crate::decoder::frame::PIXEL_OFF;
use crate::session::Session;
use crate::window::WINDOW_ROWS;

use super::input::help_bindings;
use super::model::{LoadState, ViewerModel};
use super::theme::{SemanticToken, error_token, status_token};

/// Width of the row-number gutter left of the grid.
const GUTTER: usize = 7;
/// Width of the status label column.
const LABEL_WIDTH: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub token: SemanticToken,
}

impl Span {
    fn new(text: impl Into<String>, token: SemanticToken) -> Self {
        Self {
            text: text.into(),
            token,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    fn push(&mut self, text: impl Into<String>, token: SemanticToken) -> &mut Self {
        self.spans.push(Span::new(text, token));
        self
    }

    fn single(text: impl Into<String>, token: SemanticToken) -> Self {
        let mut line = Self::default();
        line.push(text, token);
        line
    }

    /// Text without styling.
    #[must_use]
    pub fn plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Render the whole screen.
#[must_use]
pub fn render_lines(model: &ViewerModel) -> Vec<Line> {
    match &model.state {
        LoadState::Loading => vec![
            Line::single(" fwv", SemanticToken::Accent),
            Line::single(
                format!(" Decoding {} ...", model.path.display()),
                SemanticToken::Muted,
            ),
        ],
        LoadState::Failed(err) => vec![
            Line::single(" fwv", SemanticToken::Accent),
            Line::single(format!(" {err}"), SemanticToken::Danger),
        ],
        LoadState::Ready(session) => render_session(model, session),
    }
}

/// Plain-text rendering, one line per row.
#[must_use]
pub fn render_plain(model: &ViewerModel) -> String {
    render_lines(model)
        .iter()
        .map(Line::plain)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_session(model: &ViewerModel, session: &Session) -> Vec<Line> {
    let (current, total) = session.position();
    let window = session.window();
    let cell_width = model.glyphs.on.chars().count();
    let grid_width = cell_width * WINDOW_ROWS;
    let mut lines = Vec::with_capacity(WINDOW_ROWS + 6);

    let mut title = Line::default();
    title.push(format!(" Row {current} / {total}"), SemanticToken::Accent);
    title.push(format!("   {}", model.path.display()), SemanticToken::Muted);
    if let Some(report) = model.report
        && report.skipped_bytes > 0
    {
        title.push(
            format!(
                "   skipped {} bytes in {} resyncs",
                report.skipped_bytes, report.resync_events
            ),
            SemanticToken::Warning,
        );
    }
    lines.push(title);

    lines.push(Line::single(
        format!("{:GUTTER$}┌{}┐", "", "─".repeat(grid_width)),
        SemanticToken::Muted,
    ));

    for d in 0..WINDOW_ROWS {
        let mut line = Line::default();
        let gutter = window.sources[d].map_or_else(String::new, |i| (i + 1).to_string());
        let gutter_token = if d == WINDOW_ROWS - 1 {
            SemanticToken::Accent
        } else {
            SemanticToken::Muted
        };
        line.push(format!("{gutter:>w$} ", w = GUTTER - 1), gutter_token);
        line.push("│", SemanticToken::Muted);
        for &px in &window.pixels[d] {
            if px == PIXEL_OFF {
                line.push(model.glyphs.off.as_str(), SemanticToken::Dark);
            } else {
                line.push(model.glyphs.on.as_str(), SemanticToken::Lit);
            }
        }
        line.push("│ ", SemanticToken::Muted);

        let status = window.statuses[d];
        let padding = window.sources[d].is_none();
        let (label_token, error_tok) = if padding {
            (SemanticToken::Muted, SemanticToken::Muted)
        } else {
            (status_token(status.code), error_token(status.error))
        };
        line.push(
            format!("{:<LABEL_WIDTH$}", status.label()),
            label_token,
        );
        line.push(format!("{:>5}", status.error), error_tok);
        lines.push(line);
    }

    lines.push(Line::single(
        format!("{:GUTTER$}└{}┘", "", "─".repeat(grid_width)),
        SemanticToken::Muted,
    ));

    let mut jump = Line::default();
    jump.push(" Jump to row: ", SemanticToken::Neutral);
    jump.push(format!("[{:<12}]", model.jump_input), SemanticToken::Accent);
    if let Some(status) = &model.status {
        let token = if status.is_warning {
            SemanticToken::Warning
        } else {
            SemanticToken::Neutral
        };
        jump.push(format!("  {}", status.text), token);
    }
    lines.push(jump);

    if model.show_help {
        for binding in help_bindings() {
            lines.push(Line::single(
                format!("   {:<12} {}", binding.keys, binding.description),
                SemanticToken::Muted,
            ));
        }
    } else {
        lines.push(Line::single(
            " ←/→ step  PgUp/PgDn page  Enter jump  ? help  q quit",
            SemanticToken::Muted,
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::frame::{Frame, StatusCode};
    use crate::decoder::layout::FrameLayout;
    use crate::decoder::source::DecodedLog;
    use crate::synth::encode_frame;
    use crate::viewer::model::{Glyphs, ViewerMsg};
    use crate::viewer::update::update;
    use std::path::PathBuf;

    fn model_with(frames: &[Frame]) -> ViewerModel {
        let layout = FrameLayout::extended();
        let bytes: Vec<u8> = frames.iter().flat_map(|f| encode_frame(f, &layout)).collect();
        let mut model = ViewerModel::new(
            PathBuf::from("LOG00083.TXT"),
            Glyphs {
                on: "#".to_string(),
                off: ".".to_string(),
            },
            false,
        );
        let log = DecodedLog::from_bytes("LOG00083.TXT", &bytes, &layout);
        update(&mut model, ViewerMsg::Loaded(Ok(log)));
        model
    }

    #[test]
    fn title_shows_one_indexed_position() {
        let frames = vec![Frame::from_image([1; 16]); 3];
        let text = render_plain(&model_with(&frames));
        assert!(text.starts_with(" Row 1 / 3"), "{text}");
    }

    #[test]
    fn newest_row_is_drawn_at_the_bottom_of_the_grid() {
        let frames = vec![Frame {
            image_row: [1; 16],
            status_code: StatusCode::STRAIGHT,
            error_value: -1,
        }];
        let lines: Vec<String> = render_lines(&model_with(&frames))
            .iter()
            .map(Line::plain)
            .collect();
        // title, top border, 16 grid rows, bottom border, jump, hint
        assert_eq!(lines.len(), 21);
        let bottom = &lines[17];
        assert!(bottom.contains(&"#".repeat(16)), "{bottom}");
        assert!(bottom.contains("Straight"));
        assert!(bottom.trim_end().ends_with("-1"));
        assert!(bottom.trim_start().starts_with('1'));

        let padding = &lines[2];
        assert!(padding.contains(&".".repeat(16)));
        assert!(padding.contains("Normal"));
    }

    #[test]
    fn unknown_status_rendered_with_code() {
        let frames = vec![Frame {
            image_row: [0; 16],
            status_code: StatusCode(9),
            error_value: 0,
        }];
        let text = render_plain(&model_with(&frames));
        assert!(text.contains("Unknown(9)"));
    }

    #[test]
    fn loading_and_failed_screens() {
        let mut model = ViewerModel::new(PathBuf::from("big.bin"), Glyphs::default(), false);
        assert!(render_plain(&model).contains("Decoding big.bin"));

        let empty = DecodedLog::from_bytes("big.bin", &[], &FrameLayout::extended());
        update(&mut model, ViewerMsg::Loaded(Ok(empty)));
        assert!(render_plain(&model).contains("FWV-2002"));
    }

    #[test]
    fn help_overlay_lists_bindings() {
        let mut model = model_with(&[Frame::from_image([0; 16])]);
        model.show_help = true;
        let text = render_plain(&model);
        assert!(text.contains("PgUp/PgDn"));
        assert!(text.contains("first/last row"));
    }

    #[test]
    fn warning_status_is_shown_next_to_jump_box() {
        let mut model = model_with(&[Frame::from_image([0; 16])]);
        model.jump_input = "77".to_string();
        model.set_warning("row 77 is out of range (1-1)");
        let text = render_plain(&model);
        assert!(text.contains("[77          ]  row 77 is out of range (1-1)"));
    }
}
