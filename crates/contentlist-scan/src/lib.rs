//! Directory walker for contentlist.
//!
//! [`Creator`] walks one or more filesystem roots depth-first and produces
//! one [`Entry`](contentlist_core::Entry) per node, children before their
//! parent, followed by a synthetic root entry carrying the grand totals.
//! File content is streamed through a sample buffer and a SHA-256 digest.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! use contentlist_codec::EntryWriter;
//! use contentlist_core::{CancelToken, CreateConfig, WriterConfig};
//! use contentlist_scan::{Creator, WriterSink};
//!
//! let file = std::fs::File::create("list.csv").unwrap();
//! let writer = EntryWriter::new(std::io::BufWriter::new(file), WriterConfig::all());
//! let mut sink = WriterSink::new(writer);
//!
//! let creator = Creator::new(CreateConfig::default(), CancelToken::new());
//! let summary = creator.create(&[PathBuf::from("photos")], &mut sink).unwrap();
//! println!("{} files, {} bytes", summary.files, summary.bytes);
//! ```
//!
//! Nodes that cannot be read are reported through
//! [`CreateEvents::on_rejected`] and skipped with their subtree; the walk
//! carries on with their siblings.

mod creator;
mod error;
mod events;
mod measure;
mod progress;

pub use creator::Creator;
pub use error::{RejectReason, Rejection, ScanError};
pub use events::{CreateEvents, WriterSink};
pub use measure::{ContentMeasurer, Measure};
pub use progress::CreateSummary;

// Re-export core types for convenience
pub use contentlist_core::{CancelToken, CreateConfig, Entry, EntryType};
