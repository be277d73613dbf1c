//! Streaming manifest writer.

use std::io::Write;

use contentlist_core::{Entry, WriterConfig};
use tracing::trace;

use crate::column::Column;
use crate::error::CodecError;
use crate::field::escape_field;
use crate::{hex, meta};

/// Writes entries as manifest records.
///
/// The header is written lazily before the first entry, or explicitly via
/// [`write_header`](Self::write_header). Records end with `\n`.
pub struct EntryWriter<W: Write> {
    out: W,
    config: WriterConfig,
    columns: Vec<Column>,
    header_written: bool,
    records: u64,
}

impl<W: Write> EntryWriter<W> {
    pub fn new(out: W, config: WriterConfig) -> Self {
        Self {
            out,
            columns: Column::for_config(&config),
            config,
            header_written: false,
            records: 0,
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Entries written so far, not counting the header.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Write the header record if it has not been written yet.
    pub fn write_header(&mut self) -> Result<(), CodecError> {
        if self.header_written {
            return Ok(());
        }
        let names: Vec<&str> = self.columns.iter().map(Column::as_ref).collect();
        let mut line = names.join(",");
        line.push('\n');
        self.out.write_all(line.as_bytes())?;
        self.header_written = true;
        Ok(())
    }

    /// Write one entry, emitting the header first if needed.
    pub fn write_entry(&mut self, entry: &Entry) -> Result<(), CodecError> {
        self.write_header()?;

        let mut line = String::new();
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            let value = field_value(entry, *column);
            line.push_str(&escape_field(&value));
        }
        line.push('\n');

        self.out.write_all(line.as_bytes())?;
        self.records += 1;
        trace!(path = %entry.path(), record = self.records, "Wrote entry");
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), CodecError> {
        self.out.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W, CodecError> {
        self.out.flush()?;
        Ok(self.out)
    }
}

fn field_value(entry: &Entry, column: Column) -> String {
    match column {
        Column::Path => entry.path().to_string(),
        Column::Type => entry.entry_type().to_string(),
        Column::Created => entry.created.to_string(),
        Column::Modified => entry.modified.to_string(),
        Column::Size => entry.size.to_string(),
        Column::Files => entry.files.to_string(),
        Column::Directories => entry.directories.to_string(),
        Column::Sha256 => entry
            .sha256()
            .map(|digest| hex::encode(digest.as_bytes()))
            .unwrap_or_default(),
        Column::Sample => entry.sample().map(hex::encode).unwrap_or_default(),
        Column::Meta => meta::format(&entry.metadata),
    }
}
