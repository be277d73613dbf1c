//! Core types for contentlist.
//!
//! This crate provides the data model shared by every other contentlist
//! crate: the manifest path abstraction, the catalogued [`Entry`] record,
//! SHA-256 digests, cooperative cancellation and the configuration types
//! for manifest creation and serialization.

mod cancel;
mod config;
mod entry;
mod error;
mod path;
mod stream;

pub use cancel::{CancelToken, Cancelled};
pub use config::{
    CreateConfig, CreateConfigBuilder, DEFAULT_SAMPLE_SIZE, WriterConfig, WriterConfigBuilder,
};
pub use entry::{
    Entry, EntryType, METADATA_AUTHOR, METADATA_DESCRIPTION, METADATA_NAME, Metadata,
    Sha256Digest, millis_since_epoch,
};
pub use error::{EntryError, PathError, StreamError};
pub use path::{ContentPath, compare_ignore_case};
pub use stream::{CHUNK_SIZE, ContentStream};
