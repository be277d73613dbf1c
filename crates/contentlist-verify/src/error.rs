//! Error types for validation.

use std::path::PathBuf;

use contentlist_codec::CodecError;
use contentlist_core::{Cancelled, StreamError};
use thiserror::Error;

/// Errors that stop a validation run.
///
/// A mismatch between the manifest and the disk is never an error; it is
/// reported as an [`Outcome`](crate::Outcome).
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The run was cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    /// Probing or reading a file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading file content failed part way through.
    #[error("Read failed: {0}")]
    Read(#[source] std::io::Error),

    /// The starting path does not exist in the manifest tree.
    #[error("Path not found in manifest: {path}")]
    PathNotFound { path: String },

    /// The base directory must be absolute.
    #[error("Base directory must be absolute: {path}")]
    RelativePath { path: PathBuf },

    /// The manifest could not be read.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl VerifyError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<Cancelled> for VerifyError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl From<StreamError> for VerifyError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Cancelled(_) => Self::Cancelled,
            StreamError::Io(source) => Self::Read(source),
        }
    }
}
