use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EscapeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid content in room '{room}': {reason}")]
    InvalidContent { room: String, reason: String },

    #[error("content directory {0} does not exist")]
    NoContent(PathBuf),

    #[error("path '{0}' has no rooms")]
    EmptyPath(String),

    #[error("bad room file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl EscapeError {
    pub(crate) fn invalid(room: &str, reason: impl Into<String>) -> Self {
        EscapeError::InvalidContent {
            room: room.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EscapeError>;
