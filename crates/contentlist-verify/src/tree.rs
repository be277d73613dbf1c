//! Tree-wide validation over a virtual filesystem.

use std::path::PathBuf;
use std::time::Instant;

use contentlist_core::{CancelToken, ContentPath};
use contentlist_vfs::VirtualFileSystem;
use tracing::info;

use crate::entry::{EntryValidator, ValidateEntry};
use crate::error::VerifyError;
use crate::events::{ValidateEvents, ValidationSummary};

/// Validates every node of a manifest subtree.
///
/// Nodes are visited depth-first, each before its children. Placeholders
/// have no entry to check and are counted as skipped. The children of an
/// entry that fails its existence or type check are not visited.
pub struct TreeValidator<'a, V = EntryValidator> {
    vfs: &'a VirtualFileSystem,
    validator: V,
    cancel: CancelToken,
}

impl<'a> TreeValidator<'a, EntryValidator> {
    /// Validate against files below `root`, which must be absolute.
    pub fn new(
        vfs: &'a VirtualFileSystem,
        root: impl Into<PathBuf>,
        cancel: CancelToken,
    ) -> Result<Self, VerifyError> {
        let validator = EntryValidator::new(root, cancel.clone())?;
        Ok(Self {
            vfs,
            validator,
            cancel,
        })
    }
}

impl<'a, V: ValidateEntry> TreeValidator<'a, V> {
    /// Use a caller-supplied per-entry routine.
    pub fn with_strategy(vfs: &'a VirtualFileSystem, validator: V, cancel: CancelToken) -> Self {
        Self {
            vfs,
            validator,
            cancel,
        }
    }

    /// Validate `path` and everything below it.
    pub fn validate(
        &self,
        path: &ContentPath,
        events: &mut dyn ValidateEvents,
    ) -> Result<ValidationSummary, VerifyError> {
        let started = Instant::now();
        let start = self
            .vfs
            .to_real_path(path)
            .ok_or_else(|| VerifyError::PathNotFound {
                path: path.to_string(),
            })?;

        events.on_start()?;
        let mut summary = ValidationSummary::default();
        self.visit(&start, &mut summary, events)?;
        summary.elapsed = started.elapsed();
        events.on_finish(&summary)?;

        info!(
            validated = summary.validated,
            failed = summary.failed,
            skipped = summary.skipped,
            "Validation finished"
        );
        Ok(summary)
    }

    fn visit(
        &self,
        path: &ContentPath,
        summary: &mut ValidationSummary,
        events: &mut dyn ValidateEvents,
    ) -> Result<(), VerifyError> {
        self.cancel.check()?;

        match self.vfs.get_entry(path) {
            Some(entry) => {
                let outcome = self.validator.validate(entry, events)?;
                summary.record(entry, &outcome);
                if outcome.blocks_descent() {
                    return Ok(());
                }
            }
            None => summary.skipped += 1,
        }

        for child in self.vfs.list_files(path, false).unwrap_or_default() {
            self.visit(&child, summary, events)?;
        }
        Ok(())
    }
}
