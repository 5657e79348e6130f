//! Session tests: selections, conversion routing, files and transfers.

use std::sync::Arc;

use pickles_core::{ConversionError, EncodingKind, Limits, Mode, ModuleVariant, Payload};
use pickles_engine::{TransferConfig, TransferEvent, TransferOutcome, TransferState};
use tempfile::TempDir;

use super::fake::FakeEngine;
use crate::Session;

fn create_test_session() -> (Session<FakeEngine>, Arc<FakeEngine>) {
    let engine = Arc::new(FakeEngine::default());
    let session = Session::with_engine(
        Arc::clone(&engine),
        Limits::default(),
        TransferConfig::default(),
    );
    (session, engine)
}

// =============================================================================
// Selections
// =============================================================================

#[test]
fn test_initial_state() {
    let (session, _) = create_test_session();
    assert_eq!(session.mode(), Mode::Deserialize);
    assert_eq!(session.encoding(), EncodingKind::AutoDetect);
    assert_eq!(session.module_variant(), ModuleVariant::Pickle);
}

#[test]
fn test_set_mode_resets_encoding() {
    let (mut session, _) = create_test_session();

    session.set_mode(Mode::Serialize);
    assert_eq!(session.encoding(), EncodingKind::Base64);

    session.set_encoding(EncodingKind::Hex).unwrap();
    session.set_mode(Mode::Deserialize);
    assert_eq!(session.encoding(), EncodingKind::AutoDetect);
}

#[test]
fn test_set_encoding_outside_mode_subset() {
    let (mut session, _) = create_test_session();
    session.set_mode(Mode::Serialize);

    let err = session.set_encoding(EncodingKind::AutoDetect).unwrap_err();
    assert!(matches!(err, ConversionError::UnsupportedEncoding { .. }));
    assert_eq!(session.encoding(), EncodingKind::Base64);
}

// =============================================================================
// Convert
// =============================================================================

#[test]
fn test_autodetect_base64_deserialize() {
    let (session, engine) = create_test_session();
    let out = session.convert(&Payload::from_text("SGVsbG8=")).unwrap();
    assert_eq!(out.text.as_deref(), Some("Hello"));
    assert_eq!(out.bytes, b"Hello");
    assert_eq!(engine.launches(), 0);
}

#[test]
fn test_blank_input_never_reaches_engine() {
    let (mut session, engine) = create_test_session();
    session.set_encoding(EncodingKind::ByteString).unwrap();
    let err = session.convert(&Payload::from_text("   ")).unwrap_err();
    assert!(matches!(err, ConversionError::ModeMismatch { .. }));

    session.set_mode(Mode::Serialize);
    session.set_encoding(EncodingKind::ByteString).unwrap();
    let err = session.convert(&Payload::from_text("SGVsbG8=")).unwrap_err();
    assert!(matches!(err, ConversionError::ModeMismatch { .. }));
    assert_eq!(engine.launches(), 0);
}

#[test]
fn test_malformed_byte_string_never_reaches_engine() {
    let (mut session, engine) = create_test_session();
    session.set_encoding(EncodingKind::ByteString).unwrap();
    let err = session.convert(&Payload::from_text("b'\\x8")).unwrap_err();
    assert!(matches!(err, ConversionError::ModeMismatch { .. }));
    assert_eq!(engine.launches(), 0);
}

#[test]
fn test_byte_string_round_trip_through_engine() {
    let (mut session, engine) = create_test_session();
    session.set_mode(Mode::Serialize);
    session.set_encoding(EncodingKind::ByteString).unwrap();

    let pickled = session.convert(&Payload::from_text("hello world")).unwrap();
    assert_eq!(pickled.bytes, FakeEngine::pickled("hello world"));
    let rendering = pickled.text.clone().unwrap();
    assert!(rendering.starts_with("\\x80"));

    session.set_mode(Mode::Deserialize);
    session.set_encoding(EncodingKind::ByteString).unwrap();
    let restored = session.convert(&Payload::from_text(rendering)).unwrap();
    assert_eq!(restored.text.as_deref(), Some("hello world"));
    assert_eq!(engine.launches(), 2);
}

#[test]
fn test_engine_failure_is_propagated() {
    let (mut session, _) = create_test_session();
    session.set_encoding(EncodingKind::ByteString).unwrap();
    let err = session.convert(&Payload::from_text("\\x00\\x01")).unwrap_err();
    match err {
        ConversionError::ExternalProcessFailure { detail } => {
            assert!(detail.contains("UnpicklingError"))
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_module_variant_reaches_engine() {
    let (mut session, _) = create_test_session();
    session.set_mode(Mode::Serialize);
    session.set_encoding(EncodingKind::ByteString).unwrap();
    session.set_module_variant(ModuleVariant::Pickle5);

    let pickled = session.convert(&Payload::from_text("x")).unwrap();
    assert_eq!(pickled.bytes.last(), Some(&5));
}

#[test]
fn test_serialize_charset_renders_hex() {
    let (mut session, _) = create_test_session();
    session.set_mode(Mode::Serialize);
    session.set_encoding(EncodingKind::Utf16).unwrap();

    let out = session.convert(&Payload::from_text("hi!")).unwrap();
    assert_eq!(out.bytes, vec![0x68, 0x00, 0x69, 0x00, 0x21, 0x00]);
    assert_eq!(out.text.as_deref(), Some("680069002100"));
}

#[test]
fn test_serialize_hex_renders_payload_bytes() {
    let (mut session, _) = create_test_session();
    session.set_mode(Mode::Serialize);
    session.set_encoding(EncodingKind::Hex).unwrap();

    let out = session.convert(&Payload::from_text("hi!")).unwrap();
    assert_eq!(out.text.as_deref(), Some("686921"));
}

#[test]
fn test_latin1_unrepresentable_is_encoding_failure() {
    let (mut session, _) = create_test_session();
    session.set_encoding(EncodingKind::Latin1).unwrap();
    let err = session.convert(&Payload::from_text("snow ☃")).unwrap_err();
    assert!(matches!(err, ConversionError::EncodingFailure { .. }));
}

#[test]
fn test_autodetect_ignores_surrounding_whitespace() {
    let (session, _) = create_test_session();
    let piped = Payload::from_text("SGVsbG8=\n");
    assert_eq!(session.detect(&piped), Some(EncodingKind::Base64));
    assert_eq!(session.convert(&piped).unwrap().text.as_deref(), Some("Hello"));
}

#[test]
fn test_autodetect_blank_input_is_mode_mismatch() {
    let (session, _) = create_test_session();
    let err = session.convert(&Payload::from_text(" \n")).unwrap_err();
    assert!(matches!(err, ConversionError::ModeMismatch { .. }));
}

#[test]
fn test_base64_of_binary_is_decoding_failure() {
    let (mut session, _) = create_test_session();
    session.set_encoding(EncodingKind::Base64).unwrap();
    // "//79" decodes to ff fe fd
    let err = session.convert(&Payload::from_text("//79")).unwrap_err();
    assert!(matches!(err, ConversionError::DecodingFailure { .. }));
}

#[test]
fn test_input_limit_checked_first() {
    let engine = Arc::new(FakeEngine::default());
    let session = Session::with_engine(
        engine,
        Limits::with_small_limits(),
        TransferConfig::default(),
    );
    let err = session
        .convert(&Payload::from_text("a".repeat(1001)))
        .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::InputTooLarge {
            size: 1001,
            limit: 1000
        }
    ));
}

#[test]
fn test_detect() {
    let (session, _) = create_test_session();
    assert_eq!(
        session.detect(&Payload::from_text("SGVsbG8=")),
        Some(EncodingKind::Base64)
    );
    assert_eq!(
        session.detect(&Payload::from_text("not base64 but valid utf8 !!")),
        Some(EncodingKind::Utf8)
    );
    assert_eq!(session.detect(&Payload::default()), None);
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn test_export_then_import() {
    let (session, _) = create_test_session();
    let dir = TempDir::new().unwrap();

    session
        .export_file(dir.path().join("greeting"), &Payload::from_text("hello"))
        .unwrap();
    let written = dir.path().join("greeting.pkl");
    assert_eq!(std::fs::read(&written).unwrap(), FakeEngine::pickled("hello"));

    let imported = session.import_file(&written).unwrap();
    assert_eq!(imported.text.as_deref(), Some("hello"));
    assert_eq!(imported.bytes, FakeEngine::pickled("hello"));
}

#[test]
fn test_export_failure_writes_nothing() {
    let (session, engine) = create_test_session();
    let dir = TempDir::new().unwrap();

    let err = session
        .export_file(dir.path().join("empty"), &Payload::from_text(""))
        .unwrap_err();
    assert!(matches!(err, ConversionError::ModeMismatch { .. }));
    assert!(!dir.path().join("empty.pkl").exists());
    assert_eq!(engine.launches(), 0);
}

#[test]
fn test_import_missing_file_is_io_error() {
    let (session, _) = create_test_session();
    let dir = TempDir::new().unwrap();
    let err = session.import_file(dir.path().join("nope.pkl")).unwrap_err();
    assert!(matches!(err, ConversionError::Io { .. }));
}

#[test]
fn test_import_oversized_file_is_rejected_before_read() {
    let engine = Arc::new(FakeEngine::default());
    let session = Session::with_engine(
        Arc::clone(&engine),
        Limits::with_small_limits(),
        TransferConfig::default(),
    );
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.pkl");
    std::fs::write(&path, vec![0u8; 2000]).unwrap();

    let err = session.import_file(&path).unwrap_err();
    assert!(matches!(err, ConversionError::InputTooLarge { .. }));
    assert_eq!(engine.launches(), 0);
}

// =============================================================================
// Chunked transfers
// =============================================================================

/// Outcome of a chunked conversion in the shape `Session::convert` returns.
fn run_chunked(session: &Session<FakeEngine>, payload: &Payload) -> Result<Payload, ConversionError> {
    let mut handle = session.start_chunked_convert(payload)?;
    let mut last_fraction = 0.0;
    let mut result = None;
    while let Some(event) = handle.next_event() {
        match event {
            TransferEvent::Progress { fraction, .. } => {
                assert!(fraction > last_fraction);
                last_fraction = fraction;
            }
            TransferEvent::Completed(p) => result = Some(Ok(p)),
            TransferEvent::Failed(e) => result = Some(Err(e)),
            TransferEvent::Cancelled => panic!("nothing cancelled this transfer"),
        }
    }
    result.expect("transfer ended without a terminal event")
}

#[test]
fn test_chunked_convert_matches_convert() {
    let (mut session, _) = create_test_session();
    let binary = vec![0xff, 0xfe, 0xfd, 0x00, 0x80];
    let cases = [
        (Mode::Serialize, EncodingKind::Hex, Payload::from_text("chunked ".repeat(400))),
        (Mode::Serialize, EncodingKind::Hex, Payload::from_text("Hi!")),
        (Mode::Serialize, EncodingKind::Base64, Payload::from_bytes(binary)),
        (Mode::Deserialize, EncodingKind::Base64, Payload::from_text("SGVsbG8=\n")),
        (Mode::Deserialize, EncodingKind::Hex, Payload::from_text("  48656c6c6f\r\n")),
        (Mode::Deserialize, EncodingKind::Base64, Payload::from_text("//79")),
        (Mode::Deserialize, EncodingKind::Hex, Payload::from_text("fffe")),
        (Mode::Deserialize, EncodingKind::Base64, Payload::from_text("SGVsbG8=SGk=")),
    ];

    for (mode, encoding, payload) in cases {
        session.set_mode(mode);
        session.set_encoding(encoding).unwrap();
        let atomic = session.convert(&payload);
        let chunked = run_chunked(&session, &payload);
        match (&atomic, &chunked) {
            (Ok(a), Ok(c)) => assert_eq!(a, c, "{} {} {:?}", mode, encoding, payload),
            (Err(a), Err(c)) => assert_eq!(a.kind_name(), c.kind_name(), "{:?}", payload),
            _ => panic!("results differ for {:?}: {:?} vs {:?}", payload, atomic, chunked),
        }
    }
}

#[test]
fn test_serialize_hex_keeps_input_bytes_when_chunked() {
    let (mut session, _) = create_test_session();
    session.set_mode(Mode::Serialize);
    session.set_encoding(EncodingKind::Hex).unwrap();
    let out = run_chunked(&session, &Payload::from_text("Hi!")).unwrap();
    assert_eq!(out, Payload::new(b"Hi!".to_vec(), "486921"));
}

#[test]
fn test_chunked_convert_runs_validation() {
    let (session, _) = create_test_session();
    let err = session
        .start_chunked_convert(&Payload::from_text(" "))
        .unwrap_err();
    assert!(matches!(err, ConversionError::ModeMismatch { .. }));
}

#[test]
fn test_chunked_convert_rejects_engine_encodings() {
    let (mut session, _) = create_test_session();
    session.set_encoding(EncodingKind::ByteString).unwrap();
    let err = session
        .start_chunked_convert(&Payload::from_text("\\x80\\x04"))
        .unwrap_err();
    assert!(matches!(err, ConversionError::UnsupportedEncoding { .. }));
}

#[test]
fn test_session_cancel() {
    let (mut session, _) = create_test_session();
    session.set_mode(Mode::Serialize);
    session.set_encoding(EncodingKind::Base64).unwrap();

    let payload = Payload::from_bytes(vec![0xAB; 8 * 1024 * 1024]);
    let handle = session.start_chunked_convert(&payload).unwrap();
    session.cancel(&handle);
    assert_eq!(handle.wait(), TransferOutcome::Cancelled);
}

#[test]
fn test_new_chunked_convert_supersedes_previous() {
    let (mut session, _) = create_test_session();
    session.set_mode(Mode::Serialize);
    session.set_encoding(EncodingKind::Hex).unwrap();

    let first = session
        .start_chunked_convert(&Payload::from_bytes(vec![1u8; 8 * 1024 * 1024]))
        .unwrap();
    let mut second = session
        .start_chunked_convert(&Payload::from_text("ok"))
        .unwrap();

    assert_eq!(first.wait(), TransferOutcome::Cancelled);
    while second.next_event().is_some() {}
    assert_eq!(second.state(), TransferState::Completed);
}

// =============================================================================
// Scripts
// =============================================================================

#[test]
fn test_execute_script() {
    let (session, engine) = create_test_session();
    let result = session.execute_script("print('ran')").unwrap();
    assert_eq!(result.stdout_lossy(), "ran\n");
    assert_eq!(engine.scripts.lock().as_slice(), ["print('ran')".to_string()]);

    let err = session.execute_script("raise ValueError()").unwrap_err();
    assert!(matches!(err, ConversionError::ExternalProcessFailure { .. }));
}
