use std::path::PathBuf;

use thiserror::Error;

/// Errors returned while discovering or parsing rule files on disk.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rules path does not exist: {0}")]
    MissingPath(String),
    #[error("rules path is not a directory: {0}")]
    NotADirectory(String),
    #[error("failed to read rule from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rule from {path}: {message}")]
    Parse { path: String, message: String },
}

impl RuleError {
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RuleError::Io {
            path: path.into().display().to_string(),
            source,
        }
    }

    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        RuleError::Parse {
            path: path.into().display().to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised by the external rule-conversion capability.
///
/// Conversion failures are rule-authoring defects and are never retried.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("converter rejected the rule: {message}")]
    Backend { message: String },
    #[error("failed to invoke converter command '{command}'")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize rule document for conversion: {0}")]
    Document(String),
}
