//! Error types for manifest creation.

use std::path::PathBuf;

use contentlist_codec::CodecError;
use contentlist_core::{Cancelled, StreamError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while walking a tree.
///
/// Only [`Cancelled`](ScanError::Cancelled) and [`Sink`](ScanError::Sink)
/// abort a walk. Every other variant is confined to the node that raised
/// it and reported as a [`Rejection`].
#[derive(Debug, Error)]
pub enum ScanError {
    /// The walk was cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading file content failed part way through.
    #[error("Read failed: {0}")]
    Read(#[source] std::io::Error),

    /// The entry sink failed to accept an entry.
    #[error("Failed to write entry: {0}")]
    Sink(#[from] CodecError),
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether this error aborts the whole walk rather than one node.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Sink(_))
    }
}

impl From<Cancelled> for ScanError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl From<StreamError> for ScanError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Cancelled(_) => Self::Cancelled,
            StreamError::Io(source) => Self::Read(source),
        }
    }
}

/// Why a node was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RejectReason {
    /// The node exists but cannot be read.
    #[error("not readable")]
    Unreadable,

    /// Another input already uses the same final name.
    #[error("duplicate name")]
    Duplicate,

    /// The input is a filesystem root and has no name.
    #[error("filesystem root")]
    Root,

    /// The node disappeared while the walk was running.
    #[error("vanished during the walk")]
    Vanished,

    /// A linked directory leads back to one of its own ancestors.
    #[error("directory loop")]
    Loop,

    /// The name cannot be represented as a manifest path segment.
    #[error("unsupported name")]
    InvalidName,

    /// Any other I/O failure.
    #[error("{0}")]
    Io(String),
}

impl From<&ScanError> for RejectReason {
    fn from(err: &ScanError) -> Self {
        match err {
            ScanError::PermissionDenied { .. } => Self::Unreadable,
            ScanError::NotFound { .. } => Self::Vanished,
            ScanError::Io { source, .. } | ScanError::Read(source) => Self::Io(source.to_string()),
            other => Self::Io(other.to_string()),
        }
    }
}

/// A node skipped during the walk, together with its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{path}: {reason}")]
pub struct Rejection {
    /// Native path of the skipped node.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: RejectReason,
}

impl Rejection {
    pub fn new(path: impl Into<PathBuf>, reason: RejectReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_mapping() {
        assert!(matches!(
            ScanError::io("/x", Error::from(ErrorKind::PermissionDenied)),
            ScanError::PermissionDenied { .. }
        ));
        assert!(matches!(
            ScanError::io("/x", Error::from(ErrorKind::NotFound)),
            ScanError::NotFound { .. }
        ));
        assert!(matches!(
            ScanError::io("/x", Error::other("boom")),
            ScanError::Io { .. }
        ));
    }

    #[test]
    fn test_reject_reason_from_error() {
        let vanished = ScanError::io("/x", Error::from(ErrorKind::NotFound));
        assert_eq!(RejectReason::from(&vanished), RejectReason::Vanished);

        let denied = ScanError::io("/x", Error::from(ErrorKind::PermissionDenied));
        assert_eq!(RejectReason::from(&denied), RejectReason::Unreadable);

        let read = ScanError::Read(Error::other("bad sector"));
        assert_eq!(RejectReason::from(&read), RejectReason::Io("bad sector".into()));
    }

    #[test]
    fn test_stream_error_conversion() {
        let cancelled: ScanError = StreamError::Cancelled(Cancelled).into();
        assert!(cancelled.is_fatal());

        let io: ScanError = StreamError::Io(Error::other("x")).into();
        assert!(!io.is_fatal());
    }

    #[test]
    fn test_rejection_display() {
        let rejection = Rejection::new("/data/a", RejectReason::Duplicate);
        assert_eq!(rejection.to_string(), "/data/a: duplicate name");
    }
}
