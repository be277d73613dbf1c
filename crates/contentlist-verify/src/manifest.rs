//! Streaming validation of a manifest file.

use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use contentlist_codec::EntryReader;
use contentlist_core::CancelToken;
use tracing::info;

use crate::entry::{EntryValidator, ValidateEntry};
use crate::error::VerifyError;
use crate::events::{ValidateEvents, ValidationSummary};

/// Validate every entry of a manifest stream against `base`, in file order.
///
/// No tree is built, so memory use does not grow with the manifest.
pub fn validate_manifest<R: BufRead>(
    reader: EntryReader<R>,
    base: &Path,
    events: &mut dyn ValidateEvents,
    cancel: CancelToken,
) -> Result<ValidationSummary, VerifyError> {
    let started = Instant::now();
    let validator = EntryValidator::new(base, cancel.clone())?;

    events.on_start()?;
    let mut summary = ValidationSummary::default();
    for entry in reader {
        cancel.check()?;
        let entry = entry?;
        let outcome = validator.validate(&entry, events)?;
        summary.record(&entry, &outcome);
    }
    summary.elapsed = started.elapsed();
    events.on_finish(&summary)?;

    info!(
        validated = summary.validated,
        failed = summary.failed,
        "Manifest validated"
    );
    Ok(summary)
}
