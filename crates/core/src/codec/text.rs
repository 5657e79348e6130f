//! Base64, hex and fixed-width text encodings.
//!
//! `encode` renders bytes as text, `decode` parses text into bytes. Charset
//! conversions are strict in both directions:
//! - bytes that are not a valid sequence for the charset are a `DecodingFailure`
//! - characters the charset cannot represent are an `EncodingFailure`
//!
//! No placeholder substitution ever happens.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{ConversionError, Result};
use crate::types::EncodingKind;

const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Codec for Base64, hex and charset renderings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl TextCodec {
    /// Render `bytes` as text in `kind`.
    pub fn encode(bytes: &[u8], kind: EncodingKind) -> Result<String> {
        match kind {
            EncodingKind::Base64 => Ok(STANDARD.encode(bytes)),
            EncodingKind::Hex => Ok(hex::encode(bytes)),
            EncodingKind::Utf8 => utf8_to_string(bytes),
            EncodingKind::Ascii => ascii_to_string(bytes),
            EncodingKind::Utf16 => utf16_to_string(bytes),
            EncodingKind::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            other => Err(unsupported(other)),
        }
    }

    /// Parse `text` in `kind` into bytes.
    pub fn decode(text: &str, kind: EncodingKind) -> Result<Vec<u8>> {
        match kind {
            EncodingKind::Base64 => STANDARD
                .decode(text)
                .map_err(|e| ConversionError::decoding(format!("invalid Base64: {}", e))),
            EncodingKind::Hex => hex::decode(text)
                .map_err(|e| ConversionError::decoding(format!("invalid hex: {}", e))),
            EncodingKind::Utf8 => Ok(text.as_bytes().to_vec()),
            EncodingKind::Ascii => string_to_ascii(text),
            EncodingKind::Utf16 => Ok(text
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect()),
            EncodingKind::Latin1 => string_to_latin1(text),
            other => Err(unsupported(other)),
        }
    }

    /// Whether `text` is valid standard Base64.
    pub fn is_base64(text: impl AsRef<[u8]>) -> bool {
        STANDARD.decode(text.as_ref()).is_ok()
    }
}

fn unsupported(kind: EncodingKind) -> ConversionError {
    ConversionError::unsupported(format!("{} is not a text codec encoding", kind))
}

fn utf8_to_string(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ConversionError::decoding(format!("invalid UTF-8: {}", e.utf8_error())))
}

fn ascii_to_string(bytes: &[u8]) -> Result<String> {
    match bytes.iter().position(|b| !b.is_ascii()) {
        Some(pos) => Err(ConversionError::decoding(format!(
            "byte 0x{:02x} at offset {} is not ASCII",
            bytes[pos], pos
        ))),
        None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

fn utf16_to_string(bytes: &[u8]) -> Result<String> {
    let (body, big_endian) = if bytes.starts_with(&UTF16_BE_BOM) {
        (&bytes[2..], true)
    } else if bytes.starts_with(&UTF16_LE_BOM) {
        (&bytes[2..], false)
    } else {
        (bytes, false)
    };

    if body.len() % 2 != 0 {
        return Err(ConversionError::decoding(format!(
            "UTF-16 input has odd length {}",
            body.len()
        )));
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if big_endian {
                u16::from_be_bytes(pair)
            } else {
                u16::from_le_bytes(pair)
            }
        })
        .collect();

    String::from_utf16(&units)
        .map_err(|_| ConversionError::decoding("invalid UTF-16: unpaired surrogate"))
}

fn string_to_ascii(text: &str) -> Result<Vec<u8>> {
    match text.char_indices().find(|(_, c)| !c.is_ascii()) {
        Some((pos, c)) => Err(ConversionError::encoding(format!(
            "character '{}' at offset {} is not representable in ASCII",
            c, pos
        ))),
        None => Ok(text.as_bytes().to_vec()),
    }
}

fn string_to_latin1(text: &str) -> Result<Vec<u8>> {
    text.char_indices()
        .map(|(pos, c)| {
            u8::try_from(u32::from(c)).map_err(|_| {
                ConversionError::encoding(format!(
                    "character '{}' at offset {} is not representable in Latin-1",
                    c, pos
                ))
            })
        })
        .collect()
}
