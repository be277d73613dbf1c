//! Streaming manifest reader.

use std::io::BufRead;
use std::str::FromStr;

use contentlist_core::{ContentPath, Entry, EntryType};
use tracing::{debug, trace};

use crate::column::Column;
use crate::error::CodecError;
use crate::{hex, meta};

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Clone, Copy)]
enum State {
    FieldStart,
    Unquoted,
    InQuotes,
    AfterQuote,
}

/// Column positions taken from the header record.
#[derive(Debug)]
struct Header {
    width: usize,
    positions: Vec<(Column, usize)>,
}

impl Header {
    fn from_fields(fields: &[String]) -> Result<Self, CodecError> {
        let mut positions: Vec<(Column, usize)> = Vec::new();
        for (index, name) in fields.iter().enumerate() {
            let name = name.trim_start_matches(BYTE_ORDER_MARK);
            match Column::from_str(name) {
                Ok(column) if !positions.iter().any(|(c, _)| *c == column) => {
                    positions.push((column, index));
                }
                Ok(_) => {}
                Err(_) => debug!(column = name, "Ignoring unknown manifest column"),
            }
        }

        for column in [Column::Path, Column::Type] {
            if !positions.iter().any(|(c, _)| *c == column) {
                return Err(CodecError::MissingColumn { column });
            }
        }

        Ok(Self {
            width: fields.len(),
            positions,
        })
    }

    fn position(&self, column: Column) -> Option<usize> {
        self.positions
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, index)| *index)
    }
}

/// Reads manifest records as entries.
///
/// Columns are matched by header name, so their order does not matter and
/// unknown columns are skipped. Empty optional fields read as zero or
/// absent. Blank lines between records are ignored.
pub struct EntryReader<R: BufRead> {
    input: R,
    line: String,
    pos: usize,
    header: Option<Header>,
    next_record: u64,
    failed: bool,
}

impl<R: BufRead> EntryReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: String::new(),
            pos: 0,
            header: None,
            next_record: 0,
            failed: false,
        }
    }

    /// Ordinal of the next record to be read. The header is record 0.
    pub fn record(&self) -> u64 {
        self.next_record
    }

    /// Columns recognized in the header, in header order.
    ///
    /// Reads the header if it has not been read yet. An empty input has
    /// no columns.
    pub fn columns(&mut self) -> Result<Vec<Column>, CodecError> {
        self.read_header()?;
        Ok(self
            .header
            .as_ref()
            .map(|header| header.positions.iter().map(|(c, _)| *c).collect())
            .unwrap_or_default())
    }

    fn read_header(&mut self) -> Result<bool, CodecError> {
        if self.header.is_some() {
            return Ok(true);
        }
        let Some(fields) = self.read_record()? else {
            return Ok(false);
        };
        let header = Header::from_fields(&fields)?;
        debug!(width = header.width, "Read manifest header");
        self.header = Some(header);
        Ok(true)
    }

    /// Read the next entry, or `None` at end of input.
    pub fn read_entry(&mut self) -> Result<Option<Entry>, CodecError> {
        if !self.read_header()? {
            return Ok(None);
        }
        let record = self.next_record;
        let Some(fields) = self.read_record()? else {
            return Ok(None);
        };
        let entry = self.parse_entry(record, fields)?;
        trace!(path = %entry.path(), record, "Read entry");
        Ok(Some(entry))
    }

    fn parse_entry(&self, record: u64, fields: Vec<String>) -> Result<Entry, CodecError> {
        let Some(header) = self.header.as_ref() else {
            return Err(CodecError::MissingColumn {
                column: Column::Path,
            });
        };
        if fields.len() != header.width {
            return Err(CodecError::RowLength {
                record,
                expected: header.width,
                found: fields.len(),
            });
        }

        let field = |column: Column| {
            header
                .position(column)
                .map(|index| fields[index].as_str())
                .unwrap_or("")
        };
        let required = |column: Column| {
            match field(column) {
                "" => Err(CodecError::EmptyField { record, column }),
                value => Ok(value),
            }
        };

        let path = ContentPath::parse(required(Column::Path)?)
            .map_err(|source| CodecError::InvalidPath { record, source })?;
        let type_text = required(Column::Type)?;
        let entry_type = EntryType::from_str(type_text).map_err(|_| CodecError::InvalidType {
            record,
            value: type_text.to_string(),
        })?;

        let mut entry = Entry::new(path, entry_type)
            .map_err(|source| CodecError::InvalidEntry { record, source })?;

        entry.created = parse_number(record, Column::Created, field(Column::Created))?;
        entry.modified = parse_number(record, Column::Modified, field(Column::Modified))?;
        entry.size = parse_number(record, Column::Size, field(Column::Size))?;
        entry.files = parse_number(record, Column::Files, field(Column::Files))?;
        entry.directories = parse_number(record, Column::Directories, field(Column::Directories))?;

        let digest = parse_hex(record, Column::Sha256, field(Column::Sha256))?;
        entry
            .set_sha256_bytes(digest.as_deref())
            .map_err(|source| CodecError::InvalidEntry { record, source })?;
        entry.set_sample(parse_hex(record, Column::Sample, field(Column::Sample))?);

        let meta_text = field(Column::Meta);
        if !meta_text.is_empty() {
            entry.metadata = meta::parse(meta_text)
                .map_err(|source| CodecError::InvalidMetadata { record, source })?;
        }

        Ok(entry)
    }

    /// Read one raw record, skipping blank lines. `None` at end of input.
    fn read_record(&mut self) -> Result<Option<Vec<String>>, CodecError> {
        loop {
            let record = self.next_record;
            let fields = self.read_fields(record)?;
            match fields {
                None => return Ok(None),
                Some(fields) if fields.len() == 1 && fields[0].is_empty() => continue,
                Some(fields) => {
                    self.next_record += 1;
                    return Ok(Some(fields));
                }
            }
        }
    }

    fn read_fields(&mut self, record: u64) -> Result<Option<Vec<String>>, CodecError> {
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut state = State::FieldStart;
        let mut started = false;

        loop {
            let Some(c) = self.next_char()? else {
                return match state {
                    State::InQuotes => Err(CodecError::UnterminatedQuote { record }),
                    _ if !started => Ok(None),
                    _ => {
                        fields.push(field);
                        Ok(Some(fields))
                    }
                };
            };
            started = true;

            if matches!(c, '\r' | '\n') && !matches!(state, State::InQuotes) {
                if c == '\r' && self.peek_char()? == Some('\n') {
                    self.next_char()?;
                }
                fields.push(field);
                return Ok(Some(fields));
            }

            state = match (state, c) {
                (State::FieldStart, '"') => State::InQuotes,
                (State::FieldStart | State::Unquoted | State::AfterQuote, ',') => {
                    fields.push(std::mem::take(&mut field));
                    State::FieldStart
                }
                (State::FieldStart | State::Unquoted, c) => {
                    if c == '"' {
                        return Err(CodecError::StrayQuote { record });
                    }
                    field.push(c);
                    State::Unquoted
                }
                (State::InQuotes, '"') => State::AfterQuote,
                (State::InQuotes, c) => {
                    field.push(c);
                    State::InQuotes
                }
                (State::AfterQuote, '"') => {
                    field.push('"');
                    State::InQuotes
                }
                (State::AfterQuote, found) => {
                    return Err(CodecError::TrailingCharacters { record, found });
                }
            };
        }
    }

    fn fill(&mut self) -> Result<bool, CodecError> {
        if self.pos < self.line.len() {
            return Ok(true);
        }
        self.line.clear();
        self.pos = 0;
        Ok(self.input.read_line(&mut self.line)? > 0)
    }

    fn peek_char(&mut self) -> Result<Option<char>, CodecError> {
        if !self.fill()? {
            return Ok(None);
        }
        Ok(self.line[self.pos..].chars().next())
    }

    fn next_char(&mut self) -> Result<Option<char>, CodecError> {
        let c = self.peek_char()?;
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        Ok(c)
    }
}

impl<R: BufRead> Iterator for EntryReader<R> {
    type Item = Result<Entry, CodecError>;

    /// Yields entries until end of input or the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

fn parse_number<T: FromStr + Default>(
    record: u64,
    column: Column,
    value: &str,
) -> Result<T, CodecError> {
    if value.is_empty() {
        return Ok(T::default());
    }
    value.parse().map_err(|_| CodecError::InvalidNumber {
        record,
        column,
        value: value.to_string(),
    })
}

fn parse_hex(record: u64, column: Column, value: &str) -> Result<Option<Vec<u8>>, CodecError> {
    hex::decode(value).map_err(|source| CodecError::InvalidHex {
        record,
        column,
        source,
    })
}
