//! Catalogued entry types.

use std::fmt;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::EntryError;
use crate::path::ContentPath;

/// Metadata key for a human readable name.
pub const METADATA_NAME: &str = "default.name";
/// Metadata key for the author of a manifest.
pub const METADATA_AUTHOR: &str = "default.author";
/// Metadata key for a free-form description.
pub const METADATA_DESCRIPTION: &str = "default.description";

/// Ordered string metadata attached to an entry. Insertion order is kept.
pub type Metadata = IndexMap<String, String>;

/// Convert a filesystem timestamp to milliseconds since the Unix epoch.
pub fn millis_since_epoch(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp_millis()
}

/// SHA-256 content digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sha256Digest(pub [u8; 32]);

impl Sha256Digest {
    /// Create a digest from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a digest from a slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EntryError> {
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| EntryError::InvalidHashLength { found: bytes.len() })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", self.to_hex())
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Type of a catalogued filesystem object.
///
/// Parsing also accepts the upper-case tags written by older manifests.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum EntryType {
    #[strum(to_string = "File", serialize = "FILE")]
    File,
    #[strum(to_string = "Directory", serialize = "DIRECTORY")]
    Directory,
    #[strum(to_string = "SymbolicLink", serialize = "SYMBOLIC_LINK", serialize = "Link")]
    SymbolicLink,
    #[strum(to_string = "Unknown", serialize = "UNKNOWN")]
    Unknown,
}

impl EntryType {
    /// Probe the type of a native path.
    ///
    /// Links are followed first, so a link to a regular file reports
    /// `File`; only a link whose target cannot be resolved reports
    /// `SymbolicLink`. Anything missing or exotic is `Unknown`.
    pub fn probe(path: &Path) -> Self {
        if let Ok(metadata) = std::fs::metadata(path) {
            if metadata.is_file() {
                return Self::File;
            }
            if metadata.is_dir() {
                return Self::Directory;
            }
        }
        match std::fs::symlink_metadata(path) {
            Ok(metadata) if metadata.file_type().is_symlink() => Self::SymbolicLink,
            _ => Self::Unknown,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// One catalogued filesystem object.
///
/// Identity (path and type) is fixed at construction; measurements are
/// filled in by whichever component owns the current phase. Deserializing
/// applies the same path checks as [`Entry::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEntry")]
pub struct Entry {
    path: ContentPath,
    entry_type: EntryType,

    /// Creation time in epoch milliseconds, 0 if unavailable.
    pub created: i64,

    /// Modification time in epoch milliseconds, 0 if unavailable.
    pub modified: i64,

    /// Size in bytes (aggregate for directories).
    pub size: u64,

    /// Files below this directory, recursively.
    pub files: u64,

    /// Directories below this directory, recursively.
    pub directories: u64,

    sha256: Option<Sha256Digest>,

    sample: Option<Vec<u8>>,

    /// Free-form ordered metadata.
    pub metadata: Metadata,
}

/// Unchecked serialized form of an [`Entry`].
#[derive(Deserialize)]
struct RawEntry {
    path: ContentPath,
    entry_type: EntryType,
    #[serde(default)]
    created: i64,
    #[serde(default)]
    modified: i64,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    files: u64,
    #[serde(default)]
    directories: u64,
    #[serde(default)]
    sha256: Option<Sha256Digest>,
    #[serde(default)]
    sample: Option<Vec<u8>>,
    #[serde(default)]
    metadata: Metadata,
}

impl TryFrom<RawEntry> for Entry {
    type Error = EntryError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let mut entry = Entry::new(raw.path, raw.entry_type)?;
        entry.created = raw.created;
        entry.modified = raw.modified;
        entry.size = raw.size;
        entry.files = raw.files;
        entry.directories = raw.directories;
        entry.sha256 = raw.sha256;
        entry.set_sample(raw.sample);
        entry.metadata = raw.metadata;
        Ok(entry)
    }
}

impl Entry {
    /// Create an entry with zeroed measurements.
    ///
    /// The path must be absolute and free of `.`/`..` segments.
    pub fn new(path: ContentPath, entry_type: EntryType) -> Result<Self, EntryError> {
        if path.is_relative() {
            return Err(EntryError::RelativePath {
                path: path.to_string(),
            });
        }
        if path.has_special_links() {
            return Err(EntryError::SpecialLinks {
                path: path.to_string(),
            });
        }
        Ok(Self {
            path,
            entry_type,
            created: 0,
            modified: 0,
            size: 0,
            files: 0,
            directories: 0,
            sha256: None,
            sample: None,
            metadata: Metadata::new(),
        })
    }

    /// The synthetic root directory entry, `/`.
    pub fn root() -> Self {
        Self {
            path: ContentPath::absolute_root(),
            entry_type: EntryType::Directory,
            created: 0,
            modified: 0,
            size: 0,
            files: 0,
            directories: 0,
            sha256: None,
            sample: None,
            metadata: Metadata::new(),
        }
    }

    pub fn path(&self) -> &ContentPath {
        &self.path
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.entry_type.is_file()
    }

    pub fn sha256(&self) -> Option<&Sha256Digest> {
        self.sha256.as_ref()
    }

    pub fn set_sha256(&mut self, digest: Option<Sha256Digest>) {
        self.sha256 = digest;
    }

    /// Set the digest from raw bytes, rejecting anything but 32 bytes.
    pub fn set_sha256_bytes(&mut self, bytes: Option<&[u8]>) -> Result<(), EntryError> {
        self.sha256 = bytes.map(Sha256Digest::from_slice).transpose()?;
        Ok(())
    }

    /// Leading bytes of the file content.
    pub fn sample(&self) -> Option<&[u8]> {
        self.sample.as_deref()
    }

    /// Set the sample. An empty sample is stored as absent.
    pub fn set_sample(&mut self, sample: Option<Vec<u8>>) {
        self.sample = sample.filter(|bytes| !bytes.is_empty());
    }

    /// Look up a metadata value.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Insert or replace a metadata value, keeping the original key position.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn metadata_name(&self) -> Option<&str> {
        self.metadata_value(METADATA_NAME)
    }

    pub fn set_metadata_name(&mut self, name: impl Into<String>) {
        self.set_metadata(METADATA_NAME, name);
    }

    pub fn metadata_author(&self) -> Option<&str> {
        self.metadata_value(METADATA_AUTHOR)
    }

    pub fn set_metadata_author(&mut self, author: impl Into<String>) {
        self.set_metadata(METADATA_AUTHOR, author);
    }

    pub fn metadata_description(&self) -> Option<&str> {
        self.metadata_value(METADATA_DESCRIPTION)
    }

    pub fn set_metadata_description(&mut self, description: impl Into<String>) {
        self.set_metadata(METADATA_DESCRIPTION, description);
    }
}
