//! The folio error model.
//!
//! Every library crate returns [`FolioError`]. The CLI reports it through
//! `color-eyre`; the server turns it into a JSON body, using
//! [`FolioError::is_client_error`] to pick between 400 and 500.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    /// Missing or invalid setting, including unset secrets.
    #[error("config error: {message}")]
    Config { message: String },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A YAML or JSON document could not be read or written.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Input was well-formed but unusable (no documents, empty conversation).
    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("storage error: {0}")]
    Storage(String),

    /// Transport failure reaching the chat, code-hosting, or alarm service.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A `git` invocation exited non-zero.
    #[error("git error: {0}")]
    Git(String),
}

pub type Result<T> = std::result::Result<T, FolioError>;

impl FolioError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Attach the offending path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the caller's input is at fault rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Validation { .. })
    }
}

impl From<serde_yaml_ng::Error> for FolioError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        Self::parse(e.to_string())
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        Self::parse(e.to_string())
    }
}
