//! Single-entry validation.

use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use contentlist_core::{CancelToken, ContentStream, Entry, EntryType};
use tracing::{debug, warn};

use crate::check::{Check, Outcome};
use crate::error::VerifyError;
use crate::events::ValidateEvents;

/// Validates one entry. Implemented for closures so a caller can replace
/// the routine used by [`TreeValidator`](crate::TreeValidator).
pub trait ValidateEntry {
    fn validate(
        &self,
        entry: &Entry,
        events: &mut dyn ValidateEvents,
    ) -> Result<Outcome, VerifyError>;
}

impl<F> ValidateEntry for F
where
    F: Fn(&Entry, &mut dyn ValidateEvents) -> Result<Outcome, VerifyError>,
{
    fn validate(
        &self,
        entry: &Entry,
        events: &mut dyn ValidateEvents,
    ) -> Result<Outcome, VerifyError> {
        self(entry, events)
    }
}

/// Re-measures entries below a base directory.
///
/// Entry `/a/b` is checked against `<root>/a/b`.
#[derive(Debug, Clone)]
pub struct EntryValidator {
    root: PathBuf,
    cancel: CancelToken,
}

impl EntryValidator {
    /// `root` must be absolute.
    pub fn new(root: impl Into<PathBuf>, cancel: CancelToken) -> Result<Self, VerifyError> {
        let root = root.into();
        if root.is_relative() {
            return Err(VerifyError::RelativePath { path: root });
        }
        Ok(Self { root, cancel })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Native location of an entry.
    pub fn native_path(&self, entry: &Entry) -> PathBuf {
        entry.path().to_native(&self.root)
    }

    fn run_checks(
        &self,
        entry: &Entry,
        native: &Path,
        events: &mut dyn ValidateEvents,
    ) -> Result<Outcome, VerifyError> {
        self.cancel.check()?;
        match fs::symlink_metadata(native) {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(Outcome::Existence {
                    expected: true,
                    found: false,
                });
            }
            Err(err) => return Err(VerifyError::io(native, err)),
        }
        events.on_check_passed(Check::Existence)?;

        self.cancel.check()?;
        let found = EntryType::probe(native);
        if found != entry.entry_type() {
            return Ok(Outcome::Type {
                expected: entry.entry_type(),
                found,
            });
        }
        events.on_check_passed(Check::Type)?;

        if !entry.is_file() {
            return Ok(Outcome::Success);
        }

        self.cancel.check()?;
        let size = fs::metadata(native)
            .map_err(|e| VerifyError::io(native, e))?
            .len();
        if size != entry.size {
            return Ok(Outcome::Size {
                expected: entry.size,
                found: size,
            });
        }
        events.on_check_passed(Check::Size)?;

        if entry.sample().is_none() && entry.sha256().is_none() {
            return Ok(Outcome::Success);
        }

        let file = File::open(native).map_err(|e| VerifyError::io(native, e))?;
        let mut stream = ContentStream::new(BufReader::new(file), self.cancel.clone());

        if let Some(expected) = entry.sample() {
            self.cancel.check()?;
            let found = stream.read_sample(expected.len(), |read| events.on_progress(read, size))?;
            if found != expected {
                return Ok(Outcome::Sample {
                    expected: expected.to_vec(),
                    found,
                });
            }
            events.on_check_passed(Check::Sample)?;
        }

        if let Some(expected) = entry.sha256() {
            self.cancel.check()?;
            stream.read_remaining(|read| events.on_progress(read, size))?;
            let found = stream.finish();
            if found != *expected {
                return Ok(Outcome::Hash {
                    expected: *expected,
                    found,
                });
            }
            events.on_check_passed(Check::Hash)?;
        }

        Ok(Outcome::Success)
    }
}

impl ValidateEntry for EntryValidator {
    /// Run the checks in order and stop at the first failure.
    fn validate(
        &self,
        entry: &Entry,
        events: &mut dyn ValidateEvents,
    ) -> Result<Outcome, VerifyError> {
        let native = self.native_path(entry);
        events.on_entry_start(entry, &native)?;

        let outcome = self.run_checks(entry, &native, events)?;
        if outcome.is_success() {
            debug!(path = %entry.path(), "Validated");
        } else {
            warn!(path = %entry.path(), outcome = %outcome, "Validation failed");
        }

        events.on_entry_finish(entry, &outcome)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentlist_core::{ContentPath, Sha256Digest};
    use tempfile::TempDir;

    fn file_entry(path: &str, content: &[u8], sample: usize) -> Entry {
        let mut stream = ContentStream::new(content, CancelToken::new());
        let sampled = stream
            .read_sample(sample, |_| Ok::<(), VerifyError>(()))
            .unwrap();
        stream
            .read_remaining(|_| Ok::<(), VerifyError>(()))
            .unwrap();

        let mut entry = Entry::new(ContentPath::parse(path).unwrap(), EntryType::File).unwrap();
        entry.size = content.len() as u64;
        entry.set_sample(Some(sampled));
        entry.set_sha256(Some(stream.finish()));
        entry
    }

    #[derive(Default)]
    struct Passed(Vec<Check>);

    impl ValidateEvents for Passed {
        fn on_check_passed(&mut self, check: Check) -> Result<(), VerifyError> {
            self.0.push(check);
            Ok(())
        }
    }

    #[test]
    fn test_relative_root_rejected() {
        assert!(matches!(
            EntryValidator::new("relative/dir", CancelToken::new()),
            Err(VerifyError::RelativePath { .. })
        ));
    }

    #[test]
    fn test_success_notifies_every_check() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("f"), b"0123456789").unwrap();
        let entry = file_entry("/f", b"0123456789", 4);

        let validator = EntryValidator::new(temp.path(), CancelToken::new()).unwrap();
        let mut passed = Passed::default();
        let outcome = validator.validate(&entry, &mut passed).unwrap();

        assert_eq!(outcome, Outcome::Success);
        assert_eq!(
            passed.0,
            vec![Check::Existence, Check::Type, Check::Size, Check::Sample, Check::Hash]
        );
    }

    #[test]
    fn test_stops_at_first_failure() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("f"), b"0123456789").unwrap();
        let mut entry = file_entry("/f", b"0123456789", 4);
        entry.set_sha256(Some(Sha256Digest::new([0; 32])));
        entry.set_sample(Some(b"xxxx".to_vec()));

        let validator = EntryValidator::new(temp.path(), CancelToken::new()).unwrap();
        let mut passed = Passed::default();
        let outcome = validator.validate(&entry, &mut passed).unwrap();

        assert_eq!(
            outcome,
            Outcome::Sample {
                expected: b"xxxx".to_vec(),
                found: b"0123".to_vec()
            }
        );
        assert_eq!(passed.0, vec![Check::Existence, Check::Type, Check::Size]);
    }

    #[test]
    fn test_type_mismatch() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("f")).unwrap();
        let entry = file_entry("/f", b"x", 1);

        let validator = EntryValidator::new(temp.path(), CancelToken::new()).unwrap();
        let outcome = validator.validate(&entry, &mut ()).unwrap();
        assert_eq!(
            outcome,
            Outcome::Type {
                expected: EntryType::File,
                found: EntryType::Directory
            }
        );
    }

    #[test]
    fn test_directory_checks_type_only() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("d")).unwrap();
        let mut entry = Entry::new(ContentPath::parse("/d").unwrap(), EntryType::Directory).unwrap();
        entry.size = 12345;

        let validator = EntryValidator::new(temp.path(), CancelToken::new()).unwrap();
        assert_eq!(validator.validate(&entry, &mut ()).unwrap(), Outcome::Success);
        assert_eq!(validator.validate(&Entry::root(), &mut ()).unwrap(), Outcome::Success);
    }

    #[test]
    fn test_cancelled() {
        let temp = TempDir::new().unwrap();
        let token = CancelToken::new();
        token.cancel();
        let validator = EntryValidator::new(temp.path(), token).unwrap();
        let result = validator.validate(&Entry::root(), &mut ());
        assert!(matches!(result, Err(VerifyError::Cancelled)));
    }
}
