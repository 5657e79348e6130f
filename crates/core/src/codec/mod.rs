//! Local payload codecs.
//!
//! Two codecs cover every concrete [`EncodingKind`]:
//!
//! | Codec | Kinds |
//! |-------|-------|
//! | [`TextCodec`] | Base64, Hex, UTF-8, ASCII, UTF-16, Latin-1 |
//! | [`ByteStringCodec`] | Pickle Byte String (`b'\x..'`) |
//!
//! All codec functions are pure and may be called concurrently.
//!
//! # Usage
//!
//! ```
//! use pickles_core::codec::{render, parse};
//! use pickles_core::EncodingKind;
//!
//! let text = render(b"Hello", EncodingKind::Base64).unwrap();
//! assert_eq!(text, "SGVsbG8=");
//! assert_eq!(parse(&text, EncodingKind::Base64).unwrap(), b"Hello".to_vec());
//! ```

mod byte_string;
mod text;

pub use byte_string::ByteStringCodec;
pub use text::TextCodec;

use crate::error::{ConversionError, Result};
use crate::types::EncodingKind;

/// Render bytes in any concrete kind.
///
/// `AutoDetect` must be resolved first and yields `UnsupportedEncoding`.
pub fn render(bytes: &[u8], kind: EncodingKind) -> Result<String> {
    match kind {
        EncodingKind::ByteString => Ok(ByteStringCodec::encode(bytes)),
        EncodingKind::AutoDetect => Err(unresolved()),
        other => TextCodec::encode(bytes, other),
    }
}

/// Parse text in any concrete kind.
///
/// `AutoDetect` must be resolved first and yields `UnsupportedEncoding`.
pub fn parse(text: &str, kind: EncodingKind) -> Result<Vec<u8>> {
    match kind {
        EncodingKind::ByteString => ByteStringCodec::decode(text),
        EncodingKind::AutoDetect => Err(unresolved()),
        other => TextCodec::decode(text, other),
    }
}

fn unresolved() -> ConversionError {
    ConversionError::unsupported("auto-detect must be resolved to a concrete encoding first")
}
