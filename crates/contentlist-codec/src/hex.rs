//! Lowercase hex encoding for the binary columns.

use thiserror::Error;

/// Errors decoding a hex string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("odd number of hex digits ({len})")]
    OddLength { len: usize },

    #[error("invalid hex digit {found:?} at index {index}")]
    InvalidDigit { index: usize, found: char },
}

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Encode bytes as lowercase hex, two characters per byte.
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(DIGITS[(b >> 4) as usize] as char);
        out.push(DIGITS[(b & 0x0f) as usize] as char);
    }
    out
}

/// Decode a hex string. The empty string decodes to `None`.
///
/// Upper-case digits are accepted.
pub fn decode(text: &str) -> Result<Option<Vec<u8>>, HexError> {
    if text.is_empty() {
        return Ok(None);
    }
    if text.len() % 2 != 0 {
        return Err(HexError::OddLength { len: text.len() });
    }

    let digits = text
        .char_indices()
        .map(|(index, c)| {
            c.to_digit(16)
                .map(|d| d as u8)
                .ok_or(HexError::InvalidDigit { index, found: c })
        })
        .collect::<Result<Vec<u8>, HexError>>()?;

    Ok(Some(
        digits
            .chunks_exact(2)
            .map(|pair| (pair[0] << 4) | pair[1])
            .collect(),
    ))
}
