//! Codec error types.
//!
//! Record ordinals count the header as record 0 and the first entry as
//! record 1.

use contentlist_core::{EntryError, PathError};
use thiserror::Error;

use crate::column::Column;
use crate::hex::HexError;
use crate::meta::MetaError;

/// Errors raised while reading or writing a manifest.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A mandatory column is missing from the header.
    #[error("Header is missing the mandatory {column} column")]
    MissingColumn { column: Column },

    /// A record has a different number of fields than the header.
    #[error("Record {record}: expected {expected} fields, found {found}")]
    RowLength {
        record: u64,
        expected: usize,
        found: usize,
    },

    /// A mandatory field is empty.
    #[error("Record {record}: {column} is empty")]
    EmptyField { record: u64, column: Column },

    /// A numeric column did not hold a decimal integer.
    #[error("Record {record}: invalid number {value:?} in {column}")]
    InvalidNumber {
        record: u64,
        column: Column,
        value: String,
    },

    /// A binary column did not hold valid hex.
    #[error("Record {record}: invalid hex in {column}: {source}")]
    InvalidHex {
        record: u64,
        column: Column,
        #[source]
        source: HexError,
    },

    /// The type column held an unknown tag.
    #[error("Record {record}: unknown entry type {value:?}")]
    InvalidType { record: u64, value: String },

    /// The path column could not be parsed.
    #[error("Record {record}: invalid path: {source}")]
    InvalidPath {
        record: u64,
        #[source]
        source: PathError,
    },

    /// The parsed values violate an entry invariant.
    #[error("Record {record}: invalid entry: {source}")]
    InvalidEntry {
        record: u64,
        #[source]
        source: EntryError,
    },

    /// The meta column could not be parsed.
    #[error("Record {record}: invalid metadata: {source}")]
    InvalidMetadata {
        record: u64,
        #[source]
        source: MetaError,
    },

    /// A quoted field was still open at end of input.
    #[error("Record {record}: quoted field is never closed")]
    UnterminatedQuote { record: u64 },

    /// A quote appeared inside an unquoted field.
    #[error("Record {record}: unexpected quote inside an unquoted field")]
    StrayQuote { record: u64 },

    /// Something other than a separator followed a closing quote.
    #[error("Record {record}: unexpected {found:?} after a closing quote")]
    TrailingCharacters { record: u64, found: char },
}
