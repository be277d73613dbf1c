//! The `meta` column mini-grammar.
//!
//! ```text
//! 'key'='value';'other key'='it''s quoted'
//! ```
//!
//! Keys and values are single-quoted with inner quotes doubled. Whitespace
//! between tokens is ignored and a trailing `;` is allowed.

use std::iter::Peekable;
use std::str::CharIndices;

use contentlist_core::Metadata;
use thiserror::Error;

/// Errors parsing a metadata string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetaError {
    #[error("unexpected {found:?} at index {index}, expected {expected}")]
    Unexpected {
        index: usize,
        found: char,
        expected: &'static str,
    },

    #[error("quoted string starting at index {index} is never closed")]
    Unterminated { index: usize },

    #[error("metadata ends before the value of key {key:?}")]
    MissingValue { key: String },
}

/// Quote a single key or value.
fn quote(text: &str, out: &mut String) {
    out.push('\'');
    for c in text.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
}

/// Format metadata into the mini-grammar. Empty metadata formats as `""`.
pub fn format(metadata: &Metadata) -> String {
    let mut out = String::new();
    for (i, (key, value)) in metadata.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        quote(key, &mut out);
        out.push('=');
        quote(value, &mut out);
    }
    out
}

#[derive(Clone, Copy)]
enum Expect {
    Key,
    Equals,
    Value,
    Separator,
}

impl Expect {
    fn describe(self) -> &'static str {
        match self {
            Self::Key => "a quoted key",
            Self::Equals => "'='",
            Self::Value => "a quoted value",
            Self::Separator => "';'",
        }
    }
}

fn read_quoted(chars: &mut Peekable<CharIndices<'_>>, start: usize) -> Result<String, MetaError> {
    let mut text = String::new();
    loop {
        match chars.next() {
            None => return Err(MetaError::Unterminated { index: start }),
            Some((_, '\'')) => {
                if matches!(chars.peek(), Some((_, '\''))) {
                    chars.next();
                    text.push('\'');
                } else {
                    return Ok(text);
                }
            }
            Some((_, c)) => text.push(c),
        }
    }
}

/// Parse the mini-grammar. Later duplicates of a key replace earlier values.
pub fn parse(text: &str) -> Result<Metadata, MetaError> {
    let mut metadata = Metadata::new();
    let mut chars = text.char_indices().peekable();
    let mut expect = Expect::Key;
    let mut key = String::new();

    while let Some((index, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        expect = match (expect, c) {
            (Expect::Key, '\'') => {
                key = read_quoted(&mut chars, index)?;
                Expect::Equals
            }
            (Expect::Equals, '=') => Expect::Value,
            (Expect::Value, '\'') => {
                let value = read_quoted(&mut chars, index)?;
                metadata.insert(std::mem::take(&mut key), value);
                Expect::Separator
            }
            (Expect::Separator, ';') => Expect::Key,
            (expect, found) => {
                return Err(MetaError::Unexpected {
                    index,
                    found,
                    expected: expect.describe(),
                });
            }
        };
    }

    match expect {
        Expect::Key | Expect::Separator => Ok(metadata),
        Expect::Equals | Expect::Value => Err(MetaError::MissingValue { key }),
    }
}
