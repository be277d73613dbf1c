//! Manifest column names.

use contentlist_core::WriterConfig;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A named manifest column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Column {
    Path,
    Type,
    Created,
    Modified,
    Size,
    Files,
    Directories,
    Sha256,
    Sample,
    Meta,
}

impl Column {
    /// Whether a reader must find this column in the header.
    pub fn is_mandatory(&self) -> bool {
        matches!(self, Self::Path | Self::Type)
    }

    /// Columns written for a given configuration, in order.
    pub fn for_config(config: &WriterConfig) -> Vec<Column> {
        let mut columns = vec![
            Self::Path,
            Self::Type,
            Self::Created,
            Self::Modified,
            Self::Size,
        ];
        if config.files_and_directories {
            columns.extend([Self::Files, Self::Directories]);
        }
        if config.sha256 {
            columns.push(Self::Sha256);
        }
        if config.sample {
            columns.push(Self::Sample);
        }
        if config.metadata {
            columns.push(Self::Meta);
        }
        columns
    }
}
