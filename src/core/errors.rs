//! FWV-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, FwvError>;

/// Top-level error type for the frame waterfall viewer.
#[derive(Debug, Error)]
pub enum FwvError {
    #[error("[FWV-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[FWV-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[FWV-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[FWV-2001] invalid frame layout: {details}")]
    InvalidLayout { details: String },

    #[error("[FWV-2002] no complete frames found in {path} ({bytes} bytes scanned)")]
    NoFrames { path: PathBuf, bytes: usize },

    #[error("[FWV-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[FWV-3001] input log not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("[FWV-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[FWV-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[FWV-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl FwvError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "FWV-1001",
            Self::MissingConfig { .. } => "FWV-1002",
            Self::ConfigParse { .. } => "FWV-1003",
            Self::InvalidLayout { .. } => "FWV-2001",
            Self::NoFrames { .. } => "FWV-2002",
            Self::Serialization { .. } => "FWV-2101",
            Self::InputNotFound { .. } => "FWV-3001",
            Self::Io { .. } => "FWV-3002",
            Self::ChannelClosed { .. } => "FWV-3003",
            Self::Runtime { .. } => "FWV-3900",
        }
    }

    /// Whether the failure stems from what the user supplied (paths, config,
    /// log contents) rather than from the environment.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::MissingConfig { .. }
                | Self::ConfigParse { .. }
                | Self::InvalidLayout { .. }
                | Self::NoFrames { .. }
                | Self::InputNotFound { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    ///
    /// `NotFound` is promoted to [`FwvError::InputNotFound`] so callers get a
    /// dedicated code for the common "wrong path" case.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::InputNotFound {
                path: path.as_ref().to_path_buf(),
            };
        }
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for FwvError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for FwvError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<toml::ser::Error> for FwvError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialization {
            context: "toml",
            details: value.to_string(),
        }
    }
}
