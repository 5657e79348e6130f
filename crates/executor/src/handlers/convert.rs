//! Convert and Detect handlers.
//!
//! Order of checks for every conversion: size limit, auto-detect resolution
//! (deserialize only), mode validation, then the
//! conversion itself. Nothing reaches the interpreter until all local checks
//! have passed.

use pickles_bridge::SerializationEngine;
use pickles_core::{
    detect, resolve, validate, ByteStringCodec, ConversionError, EncodingKind, Limits, Mode,
    ModuleVariant, Payload, Result, TextCodec,
};
use pickles_engine::TransferJob;
use tracing::debug;

/// Guess the encoding of `payload`'s bytes.
pub fn detect_payload(payload: &Payload) -> Option<EncodingKind> {
    detect(detection_input(payload))
}

/// Bytes auto-detection looks at.
///
/// Text is trimmed the same way Base64 and hex decoding trim it, so piped
/// input with a trailing newline detects like the bare value. Raw bytes are
/// used as they are.
fn detection_input(payload: &Payload) -> &[u8] {
    match std::str::from_utf8(&payload.bytes) {
        Ok(text) => text.trim().as_bytes(),
        Err(_) => &payload.bytes,
    }
}

/// Resolve `AutoDetect` and run mode validation.
///
/// Returns the concrete encoding the conversion will use.
pub fn prepare(
    limits: &Limits,
    mode: Mode,
    encoding: EncodingKind,
    payload: &Payload,
) -> Result<EncodingKind> {
    limits.validate_input_len(payload.len())?;
    let kind = match mode {
        Mode::Serialize => encoding,
        Mode::Deserialize => {
            // Blank input is a mode mismatch, not a detection failure.
            if encoding == EncodingKind::AutoDetect {
                if let Ok(text) = payload.text_or_utf8() {
                    validate(mode, text, encoding)?;
                }
            }
            resolve(encoding, detection_input(payload))?
        }
    };
    match payload.text_or_utf8() {
        Ok(text) => validate(mode, text, kind)?,
        // Raw bytes can still be rendered on the serialize side.
        Err(_) if mode == Mode::Serialize && matches!(kind, EncodingKind::Base64 | EncodingKind::Hex) => {}
        Err(e) => return Err(e),
    }
    Ok(kind)
}

/// Convert `payload` in `mode` using `encoding`.
pub fn convert<E: SerializationEngine + ?Sized>(
    engine: &E,
    limits: &Limits,
    mode: Mode,
    encoding: EncodingKind,
    variant: ModuleVariant,
    payload: &Payload,
) -> Result<Payload> {
    let kind = prepare(limits, mode, encoding, payload)?;
    let result = match mode {
        Mode::Serialize => serialize(engine, kind, variant, payload),
        Mode::Deserialize => deserialize(engine, kind, variant, payload),
    };
    match &result {
        Ok(output) => debug!(
            target: "pickles::session",
            ?mode,
            encoding = %kind,
            input_len = payload.len(),
            output_len = output.len(),
            "Converted payload"
        ),
        Err(e) => debug!(
            target: "pickles::session",
            ?mode,
            encoding = %kind,
            error = e.kind_name(),
            "Conversion failed"
        ),
    }
    result
}

fn serialize<E: SerializationEngine + ?Sized>(
    engine: &E,
    kind: EncodingKind,
    variant: ModuleVariant,
    payload: &Payload,
) -> Result<Payload> {
    match kind {
        EncodingKind::ByteString => {
            let bytes = engine.serialize(payload.text_or_utf8()?, variant)?;
            let text = ByteStringCodec::encode(&bytes);
            Ok(Payload::new(bytes, text))
        }
        EncodingKind::Base64 | EncodingKind::Hex => {
            TransferJob::for_conversion(Mode::Serialize, kind, payload)?.convert()
        }
        EncodingKind::Utf8 | EncodingKind::Ascii | EncodingKind::Utf16 | EncodingKind::Latin1 => {
            let bytes = TextCodec::decode(payload.text_or_utf8()?, kind)?;
            let text = TextCodec::encode(&bytes, EncodingKind::Hex)?;
            Ok(Payload::new(bytes, text))
        }
        EncodingKind::AutoDetect => Err(ConversionError::unsupported(
            "Auto-Detect is not available in serialization mode",
        )),
    }
}

fn deserialize<E: SerializationEngine + ?Sized>(
    engine: &E,
    kind: EncodingKind,
    variant: ModuleVariant,
    payload: &Payload,
) -> Result<Payload> {
    let input = payload.text_or_utf8()?;
    match kind {
        EncodingKind::ByteString => {
            let bytes = ByteStringCodec::decode(input)?;
            let text = engine.deserialize(&bytes, variant)?;
            Ok(Payload::new(bytes, text))
        }
        // Shared with chunked transfers so both produce the same result.
        EncodingKind::Base64 | EncodingKind::Hex => {
            TransferJob::for_conversion(Mode::Deserialize, kind, payload)?.convert()
        }
        EncodingKind::Utf8 | EncodingKind::Ascii | EncodingKind::Utf16 | EncodingKind::Latin1 => {
            let bytes = TextCodec::decode(input, kind)?;
            Ok(Payload::new(bytes, input))
        }
        EncodingKind::AutoDetect => Err(ConversionError::unsupported(
            "Auto-Detect was not resolved to a concrete encoding",
        )),
    }
}
