//! Creation summary reporting.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Totals for a finished walk. The synthetic root entry is not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSummary {
    /// Regular files emitted.
    pub files: u64,
    /// Directories emitted.
    pub directories: u64,
    /// Symbolic links and unknown nodes emitted.
    pub others: u64,
    /// Bytes of file content measured.
    pub bytes: u64,
    /// Nodes skipped, each with its subtree.
    pub rejected: u64,
    /// Wall time of the walk.
    pub elapsed: Duration,
}

impl CreateSummary {
    /// Entries emitted, including the root entry.
    pub fn total_entries(&self) -> u64 {
        self.files + self.directories + self.others + 1
    }

    /// Hashing rate in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.bytes as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Whether every input node made it into the manifest.
    pub fn is_complete(&self) -> bool {
        self.rejected == 0
    }
}
