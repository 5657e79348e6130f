//! Escaped byte-string notation (`b'\x80\x04...'`).
//!
//! Every byte is written as a lowercase `\xNN` escape with no separators.
//! Decoding is deliberately group-oriented: after the wrapper and all `\x`
//! markers are stripped, the remaining characters are read two at a time and
//! a bad group is reported as a whole, with its index and offset.

use std::fmt::Write;

use crate::error::{ConversionError, Result};

const ESCAPE_MARKER: &str = "\\x";

/// Codec for the escaped byte-string notation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteStringCodec;

impl ByteStringCodec {
    /// Render bytes as concatenated `\xNN` escapes.
    pub fn encode(bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len() * 4);
        for byte in bytes {
            // Writing into a String cannot fail.
            let _ = write!(out, "\\x{:02x}", byte);
        }
        out
    }

    /// Render bytes as a `b'...'` literal.
    pub fn encode_literal(bytes: &[u8]) -> String {
        format!("b'{}'", Self::encode(bytes))
    }

    /// Parse escaped notation back into bytes.
    ///
    /// # Errors
    ///
    /// Returns `MalformedByteString` when a `\x` marker dangles at the end of
    /// the input, when an odd number of digits remains, or when a two-character
    /// group is not hexadecimal.
    pub fn decode(input: &str) -> Result<Vec<u8>> {
        let body = strip_literal(input.trim());

        if body.ends_with(ESCAPE_MARKER) {
            return Err(ConversionError::malformed(format!(
                "dangling '\\x' escape at offset {}",
                body.len() - ESCAPE_MARKER.len()
            )));
        }

        let digits: Vec<char> = body.replace(ESCAPE_MARKER, "").chars().collect();
        if digits.len() % 2 != 0 {
            return Err(ConversionError::malformed(format!(
                "odd number of hex digits ({}) after removing escapes",
                digits.len()
            )));
        }

        let mut bytes = Vec::with_capacity(digits.len() / 2);
        for (index, group) in digits.chunks(2).enumerate() {
            match (group[0].to_digit(16), group[1].to_digit(16)) {
                (Some(high), Some(low)) => bytes.push(((high << 4) | low) as u8),
                _ => {
                    return Err(ConversionError::malformed(format!(
                        "invalid hex group '{}{}' at group {} (offset {})",
                        group[0],
                        group[1],
                        index,
                        index * 2
                    )))
                }
            }
        }
        Ok(bytes)
    }

    /// Structural check only; the decoded bytes are discarded.
    pub fn validate(input: &str) -> Result<()> {
        Self::decode(input).map(|_| ())
    }
}

/// Strip an optional `b'`/`b"` prefix and an optional trailing quote.
fn strip_literal(input: &str) -> &str {
    let body = input
        .strip_prefix("b'")
        .or_else(|| input.strip_prefix("b\""))
        .unwrap_or(input);
    body.strip_suffix('\'')
        .or_else(|| body.strip_suffix('"'))
        .unwrap_or(body)
}
