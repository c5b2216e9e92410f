//! Error types for tokenfold
//!
//! Data-shape problems never surface here: construction drops or skips what it cannot use and
//! validation reports a bool. These errors cover setup (bad kind declarations, unreadable
//! configuration) and the I/O and serialization edges around the core.

use std::path::PathBuf;

/// Errors raised while configuring or feeding the folding pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A source file could not be read
    #[error("could not read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration layering or deserialization failed
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A node kind declaration is unusable
    #[error("invalid node kind '{kind}': {reason}")]
    InvalidKind { kind: String, reason: String },

    /// An output format name is not known
    #[error("format '{0}' not found")]
    UnknownFormat(String),

    /// JSON encoding or token stream decoding failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML encoding failed
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn invalid_kind(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidKind {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
