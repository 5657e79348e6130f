//! Encoding auto-detection.
//!
//! Detection is inherently ambiguous: most serialized-looking text is valid
//! Base64, and most text is valid UTF-8. The detector therefore commits to a
//! fixed precedence so outcomes are reproducible:
//!
//! 1. Base64 (non-empty, standard alphabet, canonical padding)
//! 2. UTF-8
//! 3. ASCII
//! 4. UTF-16 (even length, no unpaired surrogates)
//! 5. Hex (even number of hexadecimal characters)
//!
//! Callers that need certainty must let the user choose the encoding.

use crate::codec::TextCodec;
use crate::error::{ConversionError, Result};
use crate::types::EncodingKind;

/// Message shown when nothing matched.
pub const DETECTION_FAILED: &str = "failed to auto-detect encoding, select one manually";

/// Infer the encoding of a raw input blob.
///
/// Returns `None` for empty input or when no rule matches.
pub fn detect(input: impl AsRef<[u8]>) -> Option<EncodingKind> {
    let bytes = input.as_ref();
    if bytes.is_empty() {
        return None;
    }
    if TextCodec::is_base64(bytes) {
        return Some(EncodingKind::Base64);
    }
    if std::str::from_utf8(bytes).is_ok() {
        return Some(EncodingKind::Utf8);
    }
    if bytes.is_ascii() {
        return Some(EncodingKind::Ascii);
    }
    if TextCodec::encode(bytes, EncodingKind::Utf16).is_ok() {
        return Some(EncodingKind::Utf16);
    }
    if bytes.len() % 2 == 0 && bytes.iter().all(u8::is_ascii_hexdigit) {
        return Some(EncodingKind::Hex);
    }
    None
}

/// Resolve `AutoDetect` against the input; concrete kinds pass through.
///
/// # Errors
///
/// Returns `UnsupportedEncoding` when detection finds nothing.
pub fn resolve(kind: EncodingKind, input: impl AsRef<[u8]>) -> Result<EncodingKind> {
    match kind {
        EncodingKind::AutoDetect => {
            detect(input).ok_or_else(|| ConversionError::unsupported(DETECTION_FAILED))
        }
        concrete => Ok(concrete),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_wins_over_utf8() {
        assert_eq!(detect("SGVsbG8="), Some(EncodingKind::Base64));
    }

    #[test]
    fn test_plain_text_is_utf8() {
        assert_eq!(detect("not base64 but valid utf8 !!"), Some(EncodingKind::Utf8));
        assert_eq!(detect("héllo wörld"), Some(EncodingKind::Utf8));
    }

    #[test]
    fn test_hex_looking_text_is_base64_first() {
        // Eight hex digits are also a valid Base64 quantum.
        assert_eq!(detect("deadbeef"), Some(EncodingKind::Base64));
    }

    #[test]
    fn test_utf16_bytes() {
        // "é" in UTF-16LE is E9 00, which is not valid UTF-8.
        assert_eq!(detect([0xE9, 0x00]), Some(EncodingKind::Utf16));
    }

    #[test]
    fn test_empty_and_undetectable() {
        assert_eq!(detect(""), None);
        // Odd length and not UTF-8.
        assert_eq!(detect([0xff, 0xfe, 0xfd]), None);
    }

    #[test]
    fn test_resolve() {
        assert_eq!(
            resolve(EncodingKind::AutoDetect, "SGVsbG8=").unwrap(),
            EncodingKind::Base64
        );
        assert_eq!(resolve(EncodingKind::Hex, "zz").unwrap(), EncodingKind::Hex);
        let err = resolve(EncodingKind::AutoDetect, "").unwrap_err();
        assert_eq!(err, ConversionError::unsupported(DETECTION_FAILED));
    }
}
