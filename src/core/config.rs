//! Configuration system: TOML file + env var overrides + defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{FwvError, Result};
use crate::core::paths;
use crate::decoder::layout::{DEFAULT_HEADER, DEFAULT_TRAILER, FrameLayout, LayoutPreset};

/// Full fwv configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub layout: LayoutConfig,
    pub viewer: ViewerConfig,
    pub logging: LoggingConfig,
    /// File the config was loaded from (or would have been).
    #[serde(skip)]
    pub config_file: PathBuf,
}

/// Which log file to open when none is given on the command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputConfig {
    pub log_path: PathBuf,
}

/// Frame layout selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    pub preset: LayoutPreset,
    pub header: Vec<u8>,
    pub trailer: Vec<u8>,
}

/// Terminal viewer presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Open on the last row instead of the first.
    pub start_at_end: bool,
    pub on_glyph: String,
    pub off_glyph: String,
}

/// JSONL activity log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub jsonl_path: PathBuf,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("LOG00083.TXT"),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            preset: LayoutPreset::Extended,
            header: DEFAULT_HEADER.to_vec(),
            trailer: DEFAULT_TRAILER.to_vec(),
        }
    }
}

impl LayoutConfig {
    /// Concrete layout described by this section.
    #[must_use]
    pub fn to_layout(&self) -> FrameLayout {
        FrameLayout::from_preset(self.preset, &self.header, &self.trailer)
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            start_at_end: false,
            on_glyph: "██".to_string(),
            off_glyph: "··".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jsonl_path: paths::default_jsonl_path(),
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        paths::default_config_path()
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from the default
    /// path; defaults are used.
    ///
    /// # Errors
    /// `MissingConfig` for an explicit path that does not exist, parse
    /// failures, bad env values, and validation failures.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| FwvError::Io {
                path: path_buf.clone(),
                source,
            })?;
            Self::from_toml_str(&raw)?
        } else if is_explicit_path {
            return Err(FwvError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.normalize_paths();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML document without touching env or disk.
    ///
    /// # Errors
    /// `ConfigParse` on malformed TOML or unknown value types.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Pretty TOML rendering of the effective config.
    ///
    /// # Errors
    /// `Serialization` if TOML encoding fails.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Deterministic hash of the effective config for activity logs.
    ///
    /// FNV-1a over canonical JSON, stable across processes and toolchains.
    ///
    /// # Errors
    /// `Serialization` if JSON encoding fails.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Frame layout selected by the `[layout]` section.
    #[must_use]
    pub fn frame_layout(&self) -> FrameLayout {
        self.layout.to_layout()
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("FWV_INPUT_LOG_PATH") {
            self.input.log_path = PathBuf::from(raw);
        }

        if let Some(raw) = lookup("FWV_LAYOUT_PRESET") {
            self.layout.preset =
                LayoutPreset::parse(&raw).ok_or_else(|| FwvError::ConfigParse {
                    context: "env",
                    details: format!(
                        "FWV_LAYOUT_PRESET={raw:?}: expected image_only or extended"
                    ),
                })?;
        }

        if let Some(raw) = lookup("FWV_VIEWER_START_AT_END") {
            self.viewer.start_at_end = parse_env_bool("FWV_VIEWER_START_AT_END", &raw)?;
        }

        if let Some(raw) = lookup("FWV_LOGGING_ENABLED") {
            self.logging.enabled = parse_env_bool("FWV_LOGGING_ENABLED", &raw)?;
        }

        if let Some(raw) = lookup("FWV_LOGGING_JSONL_PATH") {
            self.logging.jsonl_path = PathBuf::from(raw);
        }

        Ok(())
    }

    fn normalize_paths(&mut self) {
        self.input.log_path = paths::expand_tilde(&self.input.log_path);
        self.logging.jsonl_path = paths::expand_tilde(&self.logging.jsonl_path);
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    /// `InvalidLayout` for a bad `[layout]` section, `InvalidConfig` otherwise.
    pub fn validate(&self) -> Result<()> {
        self.frame_layout().validate()?;

        for (name, glyph) in [
            ("on_glyph", &self.viewer.on_glyph),
            ("off_glyph", &self.viewer.off_glyph),
        ] {
            if glyph.is_empty() {
                return Err(FwvError::InvalidConfig {
                    details: format!("viewer.{name} must not be empty"),
                });
            }
        }
        let on_width = self.viewer.on_glyph.chars().count();
        let off_width = self.viewer.off_glyph.chars().count();
        if on_width != off_width {
            return Err(FwvError::InvalidConfig {
                details: format!(
                    "viewer.on_glyph and viewer.off_glyph must have the same width, got {on_width} and {off_width}"
                ),
            });
        }

        if self.logging.max_size_bytes == 0 {
            return Err(FwvError::InvalidConfig {
                details: "logging.max_size_bytes must be > 0".to_string(),
            });
        }
        if self.logging.max_rotated_files == 0 {
            return Err(FwvError::InvalidConfig {
                details: "logging.max_rotated_files must be > 0".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.trim()
        .parse::<bool>()
        .map_err(|error| FwvError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
