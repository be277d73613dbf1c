//! Manifest codec for contentlist.
//!
//! A manifest is UTF-8 text with one record per line. The first record is
//! a header naming the columns present; every following record is one
//! [`Entry`](contentlist_core::Entry).
//!
//! ```text
//! path,type,created,modified,size,files,directories,sha256,sample,meta
//! /docs,Directory,0,0,4,1,0,,,
//! /docs/a.txt,File,0,0,4,0,0,88d4...1589,61626364,'default.name'='a'
//! ```
//!
//! Fields containing `"`, `,`, `\r` or `\n` are wrapped in double quotes
//! with inner quotes doubled. Binary columns are lowercase hex and the
//! `meta` column uses a small `'key'='value';...` grammar.
//!
//! # Writing
//!
//! ```rust,no_run
//! use contentlist_codec::EntryWriter;
//! use contentlist_core::{ContentPath, Entry, EntryType, WriterConfig};
//!
//! let file = std::fs::File::create("list.csv").unwrap();
//! let mut writer = EntryWriter::new(std::io::BufWriter::new(file), WriterConfig::all());
//! let entry = Entry::new(ContentPath::parse("/a.txt").unwrap(), EntryType::File).unwrap();
//! writer.write_entry(&entry).unwrap();
//! writer.flush().unwrap();
//! ```
//!
//! # Reading
//!
//! ```rust,no_run
//! use contentlist_codec::EntryReader;
//!
//! let file = std::fs::File::open("list.csv").unwrap();
//! let mut reader = EntryReader::new(std::io::BufReader::new(file));
//! while let Some(entry) = reader.read_entry().unwrap() {
//!     println!("{}", entry.path());
//! }
//! ```

mod column;
mod error;
mod field;
pub mod hex;
pub mod meta;
mod reader;
mod writer;

pub use column::Column;
pub use error::CodecError;
pub use field::{escape_field, needs_quoting};
pub use reader::EntryReader;
pub use writer::EntryWriter;
