//! Error types for datodia-codegen.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for datodia-codegen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the generator.
///
/// Extraction itself never fails: declarations that do not qualify are
/// skipped (optionally with a [`Diagnostic`](crate::Diagnostic)).
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to parse a source file.
    #[error("parse error: {0}")]
    Parse(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to walk a source directory.
    #[error("failed to scan {}: {message}", path.display())]
    Scan { path: PathBuf, message: String },

    /// `OUT_DIR` is not set and no output directory was configured.
    #[error("no output directory configured and OUT_DIR is not set")]
    MissingOutDir,

    /// Generation was cancelled before it completed.
    #[error("generation cancelled")]
    Cancelled,
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Self::Scan {
            path: err.path().map(PathBuf::from).unwrap_or_default(),
            message: err.to_string(),
        }
    }
}
