//! Callbacks raised while a manifest is created.

use std::io::Write;
use std::path::PathBuf;

use contentlist_codec::EntryWriter;
use contentlist_core::{ContentPath, Entry};

use crate::error::{Rejection, ScanError};
use crate::progress::CreateSummary;

/// Receives notifications from [`Creator`](crate::Creator).
///
/// Every method is called synchronously on the walking thread. Returning
/// an error aborts the walk; return [`ScanError::Cancelled`] to stop it
/// cleanly.
pub trait CreateEvents {
    /// The walk is about to start.
    fn on_start(&mut self, _inputs: &[PathBuf]) -> Result<(), ScanError> {
        Ok(())
    }

    /// A node is about to be measured.
    fn on_entry_start(&mut self, _path: &ContentPath) -> Result<(), ScanError> {
        Ok(())
    }

    /// Bytes of the current file read so far, out of its reported size.
    fn on_progress(&mut self, _current: u64, _total: u64) -> Result<(), ScanError> {
        Ok(())
    }

    /// A finished entry. Children always arrive before their parent.
    fn on_entry(&mut self, _entry: &Entry) -> Result<(), ScanError> {
        Ok(())
    }

    /// A node was skipped with its subtree.
    fn on_rejected(&mut self, _rejection: &Rejection) -> Result<(), ScanError> {
        Ok(())
    }

    /// The walk finished, the root entry included.
    fn on_finish(&mut self, _summary: &CreateSummary) -> Result<(), ScanError> {
        Ok(())
    }
}

/// Ignores everything.
impl CreateEvents for () {}

/// Collects finished entries in emission order.
impl CreateEvents for Vec<Entry> {
    fn on_entry(&mut self, entry: &Entry) -> Result<(), ScanError> {
        self.push(entry.clone());
        Ok(())
    }
}

/// Streams finished entries straight into a manifest writer.
pub struct WriterSink<W: Write> {
    writer: EntryWriter<W>,
    rejections: Vec<Rejection>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: EntryWriter<W>) -> Self {
        Self {
            writer,
            rejections: Vec::new(),
        }
    }

    /// Rejections seen so far.
    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn into_writer(self) -> EntryWriter<W> {
        self.writer
    }
}

impl<W: Write> CreateEvents for WriterSink<W> {
    fn on_start(&mut self, _inputs: &[PathBuf]) -> Result<(), ScanError> {
        self.writer.write_header()?;
        Ok(())
    }

    fn on_entry(&mut self, entry: &Entry) -> Result<(), ScanError> {
        self.writer.write_entry(entry)?;
        Ok(())
    }

    fn on_rejected(&mut self, rejection: &Rejection) -> Result<(), ScanError> {
        self.rejections.push(rejection.clone());
        Ok(())
    }

    fn on_finish(&mut self, _summary: &CreateSummary) -> Result<(), ScanError> {
        self.writer.flush()?;
        Ok(())
    }
}
