//! Per-file content measurement.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use contentlist_core::{CancelToken, ContentStream, CreateConfig, Entry};
use tracing::trace;

use crate::error::ScanError;
use crate::events::CreateEvents;

/// Fills in the content measurements of a regular file entry.
///
/// Implemented for closures, so a caller can swap the routine used by
/// [`Creator::with_measurer`](crate::Creator::with_measurer).
pub trait Measure {
    fn measure(
        &self,
        path: &Path,
        entry: &mut Entry,
        events: &mut dyn CreateEvents,
    ) -> Result<(), ScanError>;
}

impl<F> Measure for F
where
    F: Fn(&Path, &mut Entry, &mut dyn CreateEvents) -> Result<(), ScanError>,
{
    fn measure(
        &self,
        path: &Path,
        entry: &mut Entry,
        events: &mut dyn CreateEvents,
    ) -> Result<(), ScanError> {
        self(path, entry, events)
    }
}

/// Streams a file through the sample buffer and SHA-256 digest.
#[derive(Debug, Clone)]
pub struct ContentMeasurer {
    config: CreateConfig,
    cancel: CancelToken,
}

impl ContentMeasurer {
    pub fn new(config: CreateConfig, cancel: CancelToken) -> Self {
        Self { config, cancel }
    }
}

impl Measure for ContentMeasurer {
    fn measure(
        &self,
        path: &Path,
        entry: &mut Entry,
        events: &mut dyn CreateEvents,
    ) -> Result<(), ScanError> {
        let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
        let total = file.metadata().map_err(|e| ScanError::io(path, e))?.len();

        if !self.config.compute_hash && !self.config.sampling_enabled() {
            entry.size = total;
            return Ok(());
        }

        let mut stream = ContentStream::new(BufReader::new(file), self.cancel.clone());
        let sample =
            stream.read_sample(self.config.sample_size, |read| events.on_progress(read, total))?;

        if self.config.compute_hash {
            let read = stream.read_remaining(|read| events.on_progress(read, total))?;
            entry.size = read;
            entry.set_sha256(Some(stream.finish()));
        } else {
            entry.size = total;
        }
        entry.set_sample(Some(sample));

        trace!(path = %entry.path(), size = entry.size, "Measured file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentlist_core::{ContentPath, EntryType, Sha256Digest};
    use sha2::{Digest, Sha256};
    use tempfile::TempDir;

    fn file_entry() -> Entry {
        Entry::new(ContentPath::parse("/f").unwrap(), EntryType::File).unwrap()
    }

    struct Progress(Vec<(u64, u64)>);

    impl CreateEvents for Progress {
        fn on_progress(&mut self, current: u64, total: u64) -> Result<(), ScanError> {
            self.0.push((current, total));
            Ok(())
        }
    }

    #[test]
    fn test_measures_sample_and_digest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f");
        std::fs::write(&path, b"hello world").unwrap();

        let measurer = ContentMeasurer::new(
            CreateConfig::builder().sample_size(5usize).build().unwrap(),
            CancelToken::new(),
        );
        let mut entry = file_entry();
        let mut progress = Progress(Vec::new());
        measurer.measure(&path, &mut entry, &mut progress).unwrap();

        assert_eq!(entry.size, 11);
        assert_eq!(entry.sample(), Some(&b"hello"[..]));
        assert_eq!(
            entry.sha256(),
            Some(&Sha256Digest::new(Sha256::digest(b"hello world").into()))
        );
        assert_eq!(progress.0.first(), Some(&(1, 11)));
        assert_eq!(progress.0.last(), Some(&(11, 11)));
    }

    #[test]
    fn test_empty_file_has_no_sample() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty");
        std::fs::write(&path, b"").unwrap();

        let measurer = ContentMeasurer::new(CreateConfig::default(), CancelToken::new());
        let mut entry = file_entry();
        measurer.measure(&path, &mut entry, &mut ()).unwrap();

        assert_eq!(entry.size, 0);
        assert!(entry.sample().is_none());
        assert!(entry.sha256().is_some());
    }

    #[test]
    fn test_hash_disabled() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f");
        std::fs::write(&path, b"0123456789").unwrap();

        let config = CreateConfig::builder()
            .sample_size(4usize)
            .compute_hash(false)
            .build()
            .unwrap();
        let mut entry = file_entry();
        ContentMeasurer::new(config, CancelToken::new())
            .measure(&path, &mut entry, &mut ())
            .unwrap();

        assert_eq!(entry.size, 10);
        assert_eq!(entry.sample(), Some(&b"0123"[..]));
        assert!(entry.sha256().is_none());
    }

    #[test]
    fn test_cancelled_from_progress() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f");
        std::fs::write(&path, b"abcdef").unwrap();

        struct CancelAfterFirst;
        impl CreateEvents for CancelAfterFirst {
            fn on_progress(&mut self, _: u64, _: u64) -> Result<(), ScanError> {
                Err(ScanError::Cancelled)
            }
        }

        let measurer = ContentMeasurer::new(CreateConfig::default(), CancelToken::new());
        let mut entry = file_entry();
        let result = measurer.measure(&path, &mut entry, &mut CancelAfterFirst);
        assert!(matches!(result, Err(ScanError::Cancelled)));
        assert!(entry.sha256().is_none());
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let measurer = ContentMeasurer::new(CreateConfig::default(), CancelToken::new());
        let result = measurer.measure(&temp.path().join("nope"), &mut file_entry(), &mut ());
        assert!(matches!(result, Err(ScanError::NotFound { .. })));
    }
}
