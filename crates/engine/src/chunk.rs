//! Incremental Base64 and hex converters.
//!
//! Converters accept input in arbitrary slices and carry incomplete groups
//! (3 bytes for Base64 encoding, 4 characters for Base64 decoding, 2
//! characters for hex decoding) across calls. Feeding the whole input in one
//! call or in many produces the same output and fails on the same inputs.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use pickles_core::{ConversionError, Result};

/// An incremental conversion.
pub trait ChunkConverter: Send {
    /// Consume the next slice of input.
    fn feed(&mut self, chunk: &[u8]) -> Result<()>;

    /// Flush carried input and return the complete output.
    fn finish(self: Box<Self>) -> Result<Vec<u8>>;
}

// ============================================================================
// Base64
// ============================================================================

/// Bytes to Base64 text.
#[derive(Debug, Default)]
pub struct Base64Encoder {
    carry: Vec<u8>,
    out: String,
}

impl ChunkConverter for Base64Encoder {
    fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        self.carry.extend_from_slice(chunk);
        let whole = self.carry.len() / 3 * 3;
        if whole > 0 {
            STANDARD.encode_string(&self.carry[..whole], &mut self.out);
            self.carry.drain(..whole);
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<Vec<u8>> {
        if !self.carry.is_empty() {
            let tail = std::mem::take(&mut self.carry);
            STANDARD.encode_string(&tail, &mut self.out);
        }
        Ok(self.out.into_bytes())
    }
}

/// Base64 text to bytes.
#[derive(Debug, Default)]
pub struct Base64Decoder {
    carry: Vec<u8>,
    out: Vec<u8>,
    padded: bool,
}

impl Base64Decoder {
    fn after_padding() -> ConversionError {
        ConversionError::decoding("invalid Base64: data after padding")
    }
}

impl ChunkConverter for Base64Decoder {
    fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        if self.padded && !chunk.is_empty() {
            return Err(Self::after_padding());
        }
        self.carry.extend_from_slice(chunk);
        let whole = self.carry.len() / 4 * 4;
        if whole > 0 {
            let quanta = &self.carry[..whole];
            STANDARD
                .decode_vec(quanta, &mut self.out)
                .map_err(|e| ConversionError::decoding(format!("invalid Base64: {}", e)))?;
            self.padded = quanta.ends_with(b"=");
            self.carry.drain(..whole);
        }
        if self.padded && !self.carry.is_empty() {
            return Err(Self::after_padding());
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<Vec<u8>> {
        if !self.carry.is_empty() {
            let tail = std::mem::take(&mut self.carry);
            STANDARD
                .decode_vec(&tail, &mut self.out)
                .map_err(|e| ConversionError::decoding(format!("invalid Base64: {}", e)))?;
        }
        Ok(self.out)
    }
}

// ============================================================================
// Hex
// ============================================================================

/// Bytes to lowercase hex text.
#[derive(Debug, Default)]
pub struct HexEncoder {
    out: Vec<u8>,
}

impl ChunkConverter for HexEncoder {
    fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        self.out.extend_from_slice(hex::encode(chunk).as_bytes());
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        Ok(self.out)
    }
}

/// Hex text to bytes.
#[derive(Debug, Default)]
pub struct HexDecoder {
    carry: Vec<u8>,
    out: Vec<u8>,
    consumed: usize,
}

impl ChunkConverter for HexDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        self.carry.extend_from_slice(chunk);
        let whole = self.carry.len() / 2 * 2;
        if whole > 0 {
            let decoded = hex::decode(&self.carry[..whole]).map_err(|e| {
                ConversionError::decoding(format!(
                    "invalid hex near offset {}: {}",
                    self.consumed, e
                ))
            })?;
            self.out.extend_from_slice(&decoded);
            self.carry.drain(..whole);
            self.consumed += whole;
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        if !self.carry.is_empty() {
            return Err(ConversionError::decoding(format!(
                "invalid hex: odd number of digits ({})",
                self.consumed + self.carry.len()
            )));
        }
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pickles_core::{EncodingKind, TextCodec};
    use proptest::prelude::*;

    fn run_chunked(mut converter: Box<dyn ChunkConverter>, input: &[u8], size: usize) -> Result<Vec<u8>> {
        for chunk in input.chunks(size) {
            converter.feed(chunk)?;
        }
        converter.finish()
    }

    #[test]
    fn test_base64_decode_rejects_padding_mid_stream() {
        // Whole-string decoding rejects this, so chunked decoding must too.
        let input = b"SGVsbG8=SGk=";
        assert!(TextCodec::decode("SGVsbG8=SGk=", EncodingKind::Base64).is_err());
        for size in 1..=input.len() {
            let result = run_chunked(Box::<Base64Decoder>::default(), input, size);
            assert!(
                matches!(result, Err(ConversionError::DecodingFailure { .. })),
                "chunk size {}",
                size
            );
        }
    }

    #[test]
    fn test_base64_decode_group_spanning_boundary() {
        let encoded = TextCodec::encode(b"boundary-spanning", EncodingKind::Base64).unwrap();
        for size in 1..=encoded.len() {
            let decoded =
                run_chunked(Box::<Base64Decoder>::default(), encoded.as_bytes(), size).unwrap();
            assert_eq!(decoded, b"boundary-spanning", "chunk size {}", size);
        }
    }

    #[test]
    fn test_base64_decode_truncated_fails_at_finish() {
        let result = run_chunked(Box::<Base64Decoder>::default(), b"SGVsbG8", 3);
        assert!(matches!(result, Err(ConversionError::DecodingFailure { .. })));
    }

    #[test]
    fn test_hex_decode_odd_length() {
        let result = run_chunked(Box::<HexDecoder>::default(), b"abc", 2);
        assert!(matches!(result, Err(ConversionError::DecodingFailure { .. })));
    }

    #[test]
    fn test_hex_decode_invalid_digit() {
        let result = run_chunked(Box::<HexDecoder>::default(), b"00zz", 1);
        assert!(matches!(result, Err(ConversionError::DecodingFailure { .. })));
    }

    proptest! {
        #[test]
        fn prop_chunked_matches_whole(
            bytes in proptest::collection::vec(any::<u8>(), 0..600),
            size in 1usize..64,
        ) {
            let b64 = TextCodec::encode(&bytes, EncodingKind::Base64).unwrap();
            let hex = TextCodec::encode(&bytes, EncodingKind::Hex).unwrap();

            prop_assert_eq!(run_chunked(Box::<Base64Encoder>::default(), &bytes, size).unwrap(), b64.as_bytes().to_vec());
            prop_assert_eq!(run_chunked(Box::<HexEncoder>::default(), &bytes, size).unwrap(), hex.as_bytes().to_vec());
            prop_assert_eq!(run_chunked(Box::<Base64Decoder>::default(), b64.as_bytes(), size).unwrap(), bytes.clone());
            prop_assert_eq!(run_chunked(Box::<HexDecoder>::default(), hex.as_bytes(), size).unwrap(), bytes);
        }
    }
}
