//! Virtual filesystem for contentlist manifests.
//!
//! A [`VirtualFileSystem`] rebuilds a navigable directory tree from a flat
//! sequence of [`Entry`](contentlist_core::Entry) values in any order.
//! Directories referenced by a deeper path before their own entry arrives
//! exist as placeholders and are filled in place later.
//!
//! ```rust
//! use contentlist_core::{ContentPath, Entry, EntryType};
//! use contentlist_vfs::{SearchOptions, VirtualFileSystem};
//!
//! let path = ContentPath::parse("/music/track.flac").unwrap();
//! let vfs: VirtualFileSystem = [Entry::new(path, EntryType::File).unwrap()]
//!     .into_iter()
//!     .collect();
//!
//! let music = ContentPath::parse("/music").unwrap();
//! assert!(vfs.is_directory(&music));
//! assert!(vfs.get_entry(&music).is_none());
//!
//! let hits = vfs
//!     .search(&ContentPath::absolute_root(), "TRACK", &SearchOptions::default())
//!     .unwrap();
//! assert_eq!(hits.len(), 1);
//! ```

mod node;
mod search;
mod tree;

pub use node::NodeId;
pub use search::SearchOptions;
pub use tree::VirtualFileSystem;
