//! Shared error types for the compliance engine

use std::path::PathBuf;
use thiserror::Error;

/// A source file that cannot be structurally modeled.
///
/// Fatal for that one file only: the pipeline converts it into a single
/// `parse-error` finding and keeps going with the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error in {file}:{line}:{column}: {message}")]
pub struct ParseError {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(
        file: impl Into<String>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }
}

/// An invalid threshold handed to an analyzer.
///
/// Fatal for the whole run and always raised before any file is analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Configuration error in `{field}`: {message}")]
pub struct ConfigError {
    pub field: String,
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Main error type for pycomply operations outside the pure engine
#[derive(Debug, Error)]
pub enum Error {
    /// Source could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Invalid threshold configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Coverage data could not be read
    #[error("Coverage error: {0}")]
    Coverage(String),

    /// Configuration file is not valid TOML
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a file system error with path context
    pub fn file_system(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
