//! Error types for malformed paths, entries and content streams.

use thiserror::Error;

use crate::cancel::Cancelled;

/// Errors produced while parsing or building a [`ContentPath`](crate::ContentPath).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The text contains a null character.
    #[error("Path contains a null character at index {index}")]
    NullCharacter { index: usize },

    /// Two separators follow each other, or a segment is otherwise empty.
    #[error("Path contains an empty segment at position {index}")]
    EmptySegment { index: usize },

    /// A segment contains a separator or null character.
    #[error("Path segment {segment:?} contains illegal characters")]
    IllegalCharacter { segment: String },
}

/// Contract violations when building an [`Entry`](crate::Entry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// Entry paths must be absolute.
    #[error("Entry path must be absolute: {path}")]
    RelativePath { path: String },

    /// Entry paths must not contain `.` or `..`.
    #[error("Entry path must not contain special links: {path}")]
    SpecialLinks { path: String },

    /// A SHA-256 digest must be exactly 32 bytes.
    #[error("Invalid sha256 length: {found} bytes found, but 32 are required")]
    InvalidHashLength { found: usize },
}

/// Errors raised while streaming file content through the digest.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The operation was cancelled between reads.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    /// Reading the underlying file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_error_messages() {
        let err = PathError::EmptySegment { index: 2 };
        assert!(err.to_string().contains("empty segment"));

        let err = EntryError::InvalidHashLength { found: 31 };
        assert!(err.to_string().contains("31"));
    }

    #[test]
    fn test_stream_error_from_cancelled() {
        let err: StreamError = Cancelled.into();
        assert!(matches!(err, StreamError::Cancelled(_)));
    }
}
