//! Mode validation.
//!
//! Runs before any conversion or interpreter launch so a user who picked the
//! wrong mode gets an actionable message instead of a low-level codec error.
//!
//! | Mode | Rule |
//! |------|------|
//! | Serialize | input must be non-blank and must not already decode as Base64 |
//! | Serialize | `AutoDetect` is not selectable (checked after the input rules) |
//! | Deserialize | input must be non-blank |
//! | Deserialize + ByteString | input must parse as escaped byte notation |
//!
//! The Base64 rule is a heuristic, not a proof: short words made only of
//! Base64 alphabet characters (e.g. `"test"`) are also rejected.

use crate::codec::{ByteStringCodec, TextCodec};
use crate::error::{ConversionError, Result};
use crate::types::{EncodingKind, Mode};

/// Check that `input` is consistent with `mode` and `selected`.
pub fn validate(mode: Mode, input: &str, selected: EncodingKind) -> Result<()> {
    match mode {
        Mode::Serialize => validate_serialize(input, selected),
        Mode::Deserialize => validate_deserialize(input, selected),
    }
}

fn validate_serialize(input: &str, selected: EncodingKind) -> Result<()> {
    if input.trim().is_empty() {
        return Err(ConversionError::mode_mismatch(
            "no input data provided, enter data to serialize",
        ));
    }
    if TextCodec::is_base64(input) {
        return Err(ConversionError::mode_mismatch(
            "input looks already serialized, switch to deserialization mode",
        ));
    }
    if !Mode::Serialize.allows(selected) {
        return Err(ConversionError::unsupported(format!(
            "{} is not available in serialization mode",
            selected
        )));
    }
    Ok(())
}

fn validate_deserialize(input: &str, selected: EncodingKind) -> Result<()> {
    if input.trim().is_empty() {
        return Err(ConversionError::mode_mismatch(
            "no input data provided, enter serialized data to deserialize",
        ));
    }
    if selected == EncodingKind::ByteString {
        ByteStringCodec::validate(input).map_err(|e| {
            ConversionError::mode_mismatch(format!("invalid pickle byte string input: {}", e))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_rejects_base64_input() {
        let err = validate(Mode::Serialize, "SGVsbG8=", EncodingKind::Base64).unwrap_err();
        assert!(matches!(err, ConversionError::ModeMismatch { .. }));
        let err = validate(Mode::Serialize, "SGVsbG8=", EncodingKind::ByteString).unwrap_err();
        assert!(matches!(err, ConversionError::ModeMismatch { .. }));
        let err = validate(Mode::Serialize, "SGVsbG8=", EncodingKind::AutoDetect).unwrap_err();
        assert!(matches!(err, ConversionError::ModeMismatch { .. }));
    }

    #[test]
    fn test_serialize_accepts_plain_text() {
        assert!(validate(Mode::Serialize, "hello world", EncodingKind::Base64).is_ok());
        assert!(validate(Mode::Serialize, "hello!", EncodingKind::ByteString).is_ok());
    }

    #[test]
    fn test_serialize_rejects_blank() {
        for blank in ["", "   ", "\n\t"] {
            let err = validate(Mode::Serialize, blank, EncodingKind::Base64).unwrap_err();
            assert!(matches!(err, ConversionError::ModeMismatch { .. }));
            let err = validate(Mode::Serialize, blank, EncodingKind::AutoDetect).unwrap_err();
            assert!(matches!(err, ConversionError::ModeMismatch { .. }));
        }
    }

    #[test]
    fn test_serialize_rejects_autodetect() {
        let err = validate(Mode::Serialize, "hello world", EncodingKind::AutoDetect).unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedEncoding { .. }));
    }

    #[test]
    fn test_deserialize_rejects_whitespace() {
        let err = validate(Mode::Deserialize, "   ", EncodingKind::Base64).unwrap_err();
        assert!(matches!(err, ConversionError::ModeMismatch { .. }));
        let err = validate(Mode::Deserialize, "", EncodingKind::AutoDetect).unwrap_err();
        assert!(matches!(err, ConversionError::ModeMismatch { .. }));
    }

    #[test]
    fn test_deserialize_byte_string_structure() {
        assert!(validate(Mode::Deserialize, "b'\\x80\\x04'", EncodingKind::ByteString).is_ok());
        let err = validate(Mode::Deserialize, "b'\\x8'", EncodingKind::ByteString).unwrap_err();
        match err {
            ConversionError::ModeMismatch { detail } => assert!(detail.contains("odd number")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_other_kinds_skip_structure_check() {
        assert!(validate(Mode::Deserialize, "b'\\x8'", EncodingKind::Utf8).is_ok());
    }
}
