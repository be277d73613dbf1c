//! Callbacks and summary for validation runs.

use std::path::Path;
use std::time::Duration;

use contentlist_core::{ContentPath, Entry};
use serde::{Deserialize, Serialize};

use crate::check::{Check, Outcome};
use crate::error::VerifyError;

/// Receives notifications while entries are validated.
///
/// Called synchronously on the validating thread. Returning an error
/// aborts the run; return [`VerifyError::Cancelled`] to stop it cleanly.
pub trait ValidateEvents {
    fn on_start(&mut self) -> Result<(), VerifyError> {
        Ok(())
    }

    /// An entry is about to be checked against `native`.
    fn on_entry_start(&mut self, _entry: &Entry, _native: &Path) -> Result<(), VerifyError> {
        Ok(())
    }

    /// Bytes of the current file read so far, out of its size on disk.
    fn on_progress(&mut self, _current: u64, _total: u64) -> Result<(), VerifyError> {
        Ok(())
    }

    /// A check passed; the next one is about to start.
    fn on_check_passed(&mut self, _check: Check) -> Result<(), VerifyError> {
        Ok(())
    }

    fn on_entry_finish(&mut self, _entry: &Entry, _outcome: &Outcome) -> Result<(), VerifyError> {
        Ok(())
    }

    fn on_finish(&mut self, _summary: &ValidationSummary) -> Result<(), VerifyError> {
        Ok(())
    }
}

impl ValidateEvents for () {}

/// A failed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub path: ContentPath,
    pub outcome: Outcome,
}

/// Totals for a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Entries checked.
    pub validated: u64,
    /// Entries that matched.
    pub passed: u64,
    /// Entries that did not match.
    pub failed: u64,
    /// Tree nodes without an entry of their own.
    pub skipped: u64,
    /// Every failure in the order found.
    pub failures: Vec<Failure>,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl ValidationSummary {
    pub fn record(&mut self, entry: &Entry, outcome: &Outcome) {
        self.validated += 1;
        if outcome.is_success() {
            self.passed += 1;
        } else {
            self.failed += 1;
            self.failures.push(Failure {
                path: entry.path().clone(),
                outcome: outcome.clone(),
            });
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// One-line human readable totals.
    pub fn summary(&self) -> String {
        format!(
            "{} validated, {} passed, {} failed in {:.2}s",
            self.validated,
            self.passed,
            self.failed,
            self.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentlist_core::EntryType;

    #[test]
    fn test_record() {
        let entry = Entry::new(ContentPath::parse("/a").unwrap(), EntryType::File).unwrap();
        let mut summary = ValidationSummary::default();
        summary.record(&entry, &Outcome::Success);
        summary.record(
            &entry,
            &Outcome::Size {
                expected: 1,
                found: 2,
            },
        );

        assert_eq!(summary.validated, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_passed());
        assert_eq!(summary.failures[0].path.to_string(), "/a");
        assert!(summary.summary().starts_with("2 validated, 1 passed, 1 failed"));
    }
}
