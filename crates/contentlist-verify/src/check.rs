//! Validation checks and their outcomes.

use std::fmt;

use contentlist_codec::hex;
use contentlist_core::{EntryType, Sha256Digest};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// One step of entry validation, in the order they run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Check {
    Existence,
    Type,
    Size,
    Sample,
    Hash,
}

/// Result of validating one entry.
///
/// Every failure carries the recorded (`expected`) and measured (`found`)
/// values of the check that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Existence { expected: bool, found: bool },
    Type { expected: EntryType, found: EntryType },
    Size { expected: u64, found: u64 },
    Sample { expected: Vec<u8>, found: Vec<u8> },
    Hash {
        expected: Sha256Digest,
        found: Sha256Digest,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The failed check, or `None` on success.
    pub fn check(&self) -> Option<Check> {
        match self {
            Self::Success => None,
            Self::Existence { .. } => Some(Check::Existence),
            Self::Type { .. } => Some(Check::Type),
            Self::Size { .. } => Some(Check::Size),
            Self::Sample { .. } => Some(Check::Sample),
            Self::Hash { .. } => Some(Check::Hash),
        }
    }

    /// Whether the entry's children cannot be checked after this outcome.
    pub fn blocks_descent(&self) -> bool {
        matches!(self.check(), Some(Check::Existence | Check::Type))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("ok"),
            Self::Existence { expected, found } => match (expected, found) {
                (true, false) => f.write_str("missing"),
                _ => write!(f, "existence mismatch: expected {expected}, found {found}"),
            },
            Self::Type { expected, found } => {
                write!(f, "type mismatch: expected {expected}, found {found}")
            }
            Self::Size { expected, found } => {
                write!(f, "size mismatch: expected {expected} bytes, found {found}")
            }
            Self::Sample { expected, found } => write!(
                f,
                "sample mismatch: expected {}, found {}",
                hex::encode(expected),
                hex::encode(found)
            ),
            Self::Hash { expected, found } => {
                write!(f, "sha256 mismatch: expected {expected}, found {found}")
            }
        }
    }
}
