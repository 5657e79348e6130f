//! Error types for payload conversion
//!
//! Every codec, bridge and transfer operation reports failures through
//! [`ConversionError`]. Errors are:
//! - **Typed**: each failure class is its own variant
//! - **Serializable**: they cross the command boundary unchanged
//! - **Descriptive**: each variant carries a human-readable detail string

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Conversion errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Codec | `EncodingFailure`, `DecodingFailure`, `MalformedByteString` | Local conversion failed |
/// | Gate | `ModeMismatch`, `UnsupportedEncoding`, `InputTooLarge` | Input rejected before conversion |
/// | External | `ExternalProcessFailure`, `IntegrityCheckFailure` | Interpreter bridge failed |
/// | System | `Io` | File or thread failures |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ConversionError {
    /// Text could not be represented in the target encoding
    #[error("encoding failure: {detail}")]
    EncodingFailure {
        /// What went wrong
        detail: String,
    },

    /// Input is not a valid byte sequence or rendering for the encoding
    #[error("decoding failure: {detail}")]
    DecodingFailure {
        /// What went wrong
        detail: String,
    },

    /// Input does not match the declared mode
    #[error("mode mismatch: {detail}")]
    ModeMismatch {
        /// What went wrong
        detail: String,
    },

    /// The external interpreter could not be launched or exited abnormally
    #[error("external process failure: {detail}")]
    ExternalProcessFailure {
        /// What went wrong, including any captured stderr
        detail: String,
    },

    /// The interpreter ran but produced output that is not valid text
    #[error("integrity check failure: {detail}")]
    IntegrityCheckFailure {
        /// What went wrong
        detail: String,
    },

    /// Escaped byte-string notation could not be parsed
    #[error("malformed byte string: {detail}")]
    MalformedByteString {
        /// What went wrong
        detail: String,
    },

    /// The encoding is not valid for this operation
    #[error("unsupported encoding: {detail}")]
    UnsupportedEncoding {
        /// What went wrong
        detail: String,
    },

    /// Input exceeds the configured size limit
    #[error("input too large: {size} bytes exceeds limit of {limit} bytes")]
    InputTooLarge {
        /// Input size in bytes
        size: usize,
        /// Configured maximum in bytes
        limit: usize,
    },

    /// File or thread I/O failed
    #[error("I/O error: {detail}")]
    Io {
        /// What went wrong
        detail: String,
    },
}

impl ConversionError {
    /// Build an `EncodingFailure`.
    pub fn encoding(detail: impl Into<String>) -> Self {
        ConversionError::EncodingFailure {
            detail: detail.into(),
        }
    }

    /// Build a `DecodingFailure`.
    pub fn decoding(detail: impl Into<String>) -> Self {
        ConversionError::DecodingFailure {
            detail: detail.into(),
        }
    }

    /// Build a `ModeMismatch`.
    pub fn mode_mismatch(detail: impl Into<String>) -> Self {
        ConversionError::ModeMismatch {
            detail: detail.into(),
        }
    }

    /// Build an `ExternalProcessFailure`.
    pub fn external(detail: impl Into<String>) -> Self {
        ConversionError::ExternalProcessFailure {
            detail: detail.into(),
        }
    }

    /// Build an `IntegrityCheckFailure`.
    pub fn integrity(detail: impl Into<String>) -> Self {
        ConversionError::IntegrityCheckFailure {
            detail: detail.into(),
        }
    }

    /// Build a `MalformedByteString`.
    pub fn malformed(detail: impl Into<String>) -> Self {
        ConversionError::MalformedByteString {
            detail: detail.into(),
        }
    }

    /// Build an `UnsupportedEncoding`.
    pub fn unsupported(detail: impl Into<String>) -> Self {
        ConversionError::UnsupportedEncoding {
            detail: detail.into(),
        }
    }

    /// Build an `Io` error.
    pub fn io(detail: impl Into<String>) -> Self {
        ConversionError::Io {
            detail: detail.into(),
        }
    }

    /// Stable variant name, used as a structured logging field.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConversionError::EncodingFailure { .. } => "EncodingFailure",
            ConversionError::DecodingFailure { .. } => "DecodingFailure",
            ConversionError::ModeMismatch { .. } => "ModeMismatch",
            ConversionError::ExternalProcessFailure { .. } => "ExternalProcessFailure",
            ConversionError::IntegrityCheckFailure { .. } => "IntegrityCheckFailure",
            ConversionError::MalformedByteString { .. } => "MalformedByteString",
            ConversionError::UnsupportedEncoding { .. } => "UnsupportedEncoding",
            ConversionError::InputTooLarge { .. } => "InputTooLarge",
            ConversionError::Io { .. } => "Io",
        }
    }

    /// Whether the failure happened before any conversion ran.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ConversionError::ModeMismatch { .. }
                | ConversionError::UnsupportedEncoding { .. }
                | ConversionError::InputTooLarge { .. }
        )
    }
}

impl From<std::io::Error> for ConversionError {
    fn from(e: std::io::Error) -> Self {
        ConversionError::io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_decoding() {
        let err = ConversionError::decoding("invalid byte 0xff");
        let msg = err.to_string();
        assert!(msg.contains("decoding failure"));
        assert!(msg.contains("invalid byte 0xff"));
    }

    #[test]
    fn test_error_display_input_too_large() {
        let err = ConversionError::InputTooLarge {
            size: 20,
            limit: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("20"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_kind_name_matches_variant() {
        assert_eq!(ConversionError::external("x").kind_name(), "ExternalProcessFailure");
        assert_eq!(ConversionError::malformed("x").kind_name(), "MalformedByteString");
        assert_eq!(ConversionError::io("x").kind_name(), "Io");
    }

    #[test]
    fn test_rejections() {
        assert!(ConversionError::mode_mismatch("x").is_rejection());
        assert!(ConversionError::unsupported("x").is_rejection());
        assert!(!ConversionError::decoding("x").is_rejection());
        assert!(!ConversionError::external("x").is_rejection());
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pkl");
        let err: ConversionError = io.into();
        assert!(matches!(err, ConversionError::Io { ref detail } if detail.contains("missing.pkl")));
    }

    #[test]
    fn test_error_serializes_to_json() {
        let err = ConversionError::integrity("not utf-8");
        let json = serde_json::to_string(&err).unwrap();
        let back: ConversionError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
