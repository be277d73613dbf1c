//! Manifest validation for contentlist.
//!
//! [`EntryValidator`] re-measures the file behind one entry and stops at
//! the first failing check, in this order: existence, type, size, sample,
//! hash. The result is an [`Outcome`]; mismatches are values, not errors.
//!
//! [`TreeValidator`] applies a per-entry strategy to every node of a
//! [`VirtualFileSystem`](contentlist_vfs::VirtualFileSystem) subtree, and
//! [`validate_manifest`] checks a manifest stream entry by entry without
//! building a tree.
//!
//! ```rust,no_run
//! use contentlist_codec::EntryReader;
//! use contentlist_core::{CancelToken, ContentPath};
//! use contentlist_verify::TreeValidator;
//! use contentlist_vfs::VirtualFileSystem;
//!
//! let file = std::fs::File::open("list.csv").unwrap();
//! let reader = EntryReader::new(std::io::BufReader::new(file));
//! let vfs = VirtualFileSystem::from_reader(reader, |_, _| {}).unwrap();
//!
//! let validator = TreeValidator::new(&vfs, "/mnt/backup", CancelToken::new()).unwrap();
//! let summary = validator.validate(&ContentPath::absolute_root(), &mut ()).unwrap();
//! println!("{} of {} entries failed", summary.failed, summary.validated);
//! ```

mod check;
mod entry;
mod error;
mod events;
mod manifest;
mod tree;

pub use check::{Check, Outcome};
pub use entry::{EntryValidator, ValidateEntry};
pub use error::VerifyError;
pub use events::{Failure, ValidateEvents, ValidationSummary};
pub use manifest::validate_manifest;
pub use tree::TreeValidator;
