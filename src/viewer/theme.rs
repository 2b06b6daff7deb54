//! Semantic color tokens for the viewer, with `NO_COLOR` support.

#![allow(missing_docs)]

use std::env;

use crossterm::style::Color;

use crate::decoder::frame::StatusCode;

/// Color output mode for compatibility with `NO_COLOR` and `--no-color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Enabled,
    Disabled,
}

impl ColorMode {
    #[must_use]
    pub const fn from_no_color_flag(no_color: bool) -> Self {
        if no_color {
            Self::Disabled
        } else {
            Self::Enabled
        }
    }

    /// Disabled when the flag is set or `NO_COLOR` is present.
    #[must_use]
    pub fn from_environment(no_color_flag: bool) -> Self {
        Self::from_no_color_flag(no_color_flag || env::var_os("NO_COLOR").is_some())
    }
}

/// Token category independent of concrete colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticToken {
    Accent,
    Success,
    Warning,
    Danger,
    Muted,
    Neutral,
    /// Lit pixel.
    Lit,
    /// Dark pixel.
    Dark,
}

/// Concrete colors per token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub muted: Color,
    pub neutral: Color,
    pub lit: Color,
    pub dark: Color,
}

impl ThemePalette {
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            accent: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            muted: Color::DarkGrey,
            neutral: Color::White,
            lit: Color::White,
            dark: Color::DarkGrey,
        }
    }

    #[must_use]
    pub const fn color(&self, token: SemanticToken) -> Color {
        match token {
            SemanticToken::Accent => self.accent,
            SemanticToken::Success => self.success,
            SemanticToken::Warning => self.warning,
            SemanticToken::Danger => self.danger,
            SemanticToken::Muted => self.muted,
            SemanticToken::Neutral => self.neutral,
            SemanticToken::Lit => self.lit,
            SemanticToken::Dark => self.dark,
        }
    }
}

/// Token for a steering status label.
#[must_use]
pub const fn status_token(code: StatusCode) -> SemanticToken {
    match code.raw() {
        0 | 3 => SemanticToken::Success,
        1 | 2 => SemanticToken::Accent,
        4 | 5 => SemanticToken::Warning,
        _ => SemanticToken::Danger,
    }
}

/// Token for a signed error value; larger deviations are louder.
#[must_use]
pub const fn error_token(error: i8) -> SemanticToken {
    match error.unsigned_abs() {
        0..=15 => SemanticToken::Neutral,
        16..=63 => SemanticToken::Warning,
        _ => SemanticToken::Danger,
    }
}

/// Palette plus color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub mode: ColorMode,
    pub palette: ThemePalette,
}

impl Theme {
    #[must_use]
    pub const fn new(mode: ColorMode) -> Self {
        Self {
            mode,
            palette: ThemePalette::standard(),
        }
    }

    /// Concrete color for a token, `None` when color output is disabled.
    #[must_use]
    pub const fn color(&self, token: SemanticToken) -> Option<Color> {
        match self.mode {
            ColorMode::Enabled => Some(self.palette.color(token)),
            ColorMode::Disabled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_color_flag_disables_colors() {
        let theme = Theme::new(ColorMode::from_no_color_flag(true));
        assert_eq!(theme.color(SemanticToken::Accent), None);
        let theme = Theme::new(ColorMode::from_no_color_flag(false));
        assert_eq!(theme.color(SemanticToken::Danger), Some(Color::Red));
    }

    #[test]
    fn status_codes_map_to_tokens() {
        assert_eq!(status_token(StatusCode::NORMAL), SemanticToken::Success);
        assert_eq!(status_token(StatusCode::LEFT), SemanticToken::Accent);
        assert_eq!(status_token(StatusCode::GO_RIGHT), SemanticToken::Warning);
        assert_eq!(status_token(StatusCode(9)), SemanticToken::Danger);
    }

    #[test]
    fn error_magnitude_escalates() {
        assert_eq!(error_token(-3), SemanticToken::Neutral);
        assert_eq!(error_token(20), SemanticToken::Warning);
        assert_eq!(error_token(-128), SemanticToken::Danger);
    }
}
