//! Creation and serialization configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Number of leading bytes sampled from each file by default.
pub const DEFAULT_SAMPLE_SIZE: usize = 24;

/// Configuration for walking a tree into manifest entries.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct CreateConfig {
    /// Leading bytes captured per file (0 disables sampling).
    #[builder(default = "DEFAULT_SAMPLE_SIZE")]
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Compute a full SHA-256 digest of each file.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub compute_hash: bool,
}

fn default_true() -> bool {
    true
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

impl CreateConfig {
    /// Create a new config builder.
    pub fn builder() -> CreateConfigBuilder {
        CreateConfigBuilder::default()
    }

    pub fn sampling_enabled(&self) -> bool {
        self.sample_size > 0
    }
}

impl Default for CreateConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            compute_hash: true,
        }
    }
}

/// Which optional column groups a manifest writer emits.
///
/// `path`, `type`, `created`, `modified` and `size` are always written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct WriterConfig {
    /// Write the `files` and `directories` columns.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub files_and_directories: bool,

    /// Write the `sha256` column.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub sha256: bool,

    /// Write the `sample` column.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub sample: bool,

    /// Write the `meta` column.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub metadata: bool,
}

impl WriterConfig {
    pub const NO_FILES_AND_DIRECTORIES: u8 = 0b0001;
    pub const NO_SHA256: u8 = 0b0010;
    pub const NO_SAMPLE: u8 = 0b0100;
    pub const NO_METADATA: u8 = 0b1000;

    /// Create a new config builder.
    pub fn builder() -> WriterConfigBuilder {
        WriterConfigBuilder::default()
    }

    /// Every column enabled.
    pub fn all() -> Self {
        Self {
            files_and_directories: true,
            sha256: true,
            sample: true,
            metadata: true,
        }
    }

    /// Decode the legacy suppression bit flags.
    pub fn from_flags(flags: u8) -> Self {
        Self {
            files_and_directories: flags & Self::NO_FILES_AND_DIRECTORIES == 0,
            sha256: flags & Self::NO_SHA256 == 0,
            sample: flags & Self::NO_SAMPLE == 0,
            metadata: flags & Self::NO_METADATA == 0,
        }
    }

    /// Encode as legacy suppression bit flags.
    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if !self.files_and_directories {
            flags |= Self::NO_FILES_AND_DIRECTORIES;
        }
        if !self.sha256 {
            flags |= Self::NO_SHA256;
        }
        if !self.sample {
            flags |= Self::NO_SAMPLE;
        }
        if !self.metadata {
            flags |= Self::NO_METADATA;
        }
        flags
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self::all()
    }
}
