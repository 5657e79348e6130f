//! Background transfer tests
//!
//! These drive transfers through worker threads and handles, the way a
//! session does.

use pickles_core::{ConversionError, EncodingKind, Mode, Payload, TextCodec};
use pickles_engine::{
    TransferConfig, TransferEvent, TransferJob, TransferOutcome, TransferState, TransferSupervisor,
};

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 256) as u8).collect()
}

#[test]
fn test_chunked_output_matches_atomic_conversion() {
    let supervisor = TransferSupervisor::default();
    let bytes = sample(5000);

    for kind in [EncodingKind::Base64, EncodingKind::Hex] {
        let payload = Payload::from_bytes(bytes.clone());
        let job = TransferJob::for_conversion(Mode::Serialize, kind, &payload).unwrap();
        let mut handle = supervisor.start(job).unwrap();

        let mut fractions = Vec::new();
        let mut result = None;
        while let Some(event) = handle.next_event() {
            match event {
                TransferEvent::Progress { fraction, .. } => fractions.push(fraction),
                TransferEvent::Completed(p) => result = Some(p),
                other => panic!("unexpected event: {:?}", other),
            }
        }

        assert_eq!(handle.state(), TransferState::Completed);
        assert_eq!(fractions.len(), 5, "5000 units at 1024 per chunk");
        assert!(fractions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(fractions.last().copied(), Some(1.0));

        let expected = TextCodec::encode(&bytes, kind).unwrap();
        assert_eq!(result.unwrap().text.as_deref(), Some(expected.as_str()));
    }
}

#[test]
fn test_chunked_decode_roundtrip() {
    let supervisor = TransferSupervisor::new(TransferConfig { chunk_size: 7 });
    let bytes = "round trip text ".repeat(20).into_bytes();
    let encoded = TextCodec::encode(&bytes, EncodingKind::Base64).unwrap();

    let job = TransferJob::for_conversion(
        Mode::Deserialize,
        EncodingKind::Base64,
        &Payload::from_text(encoded),
    )
    .unwrap();
    match supervisor.start(job).unwrap().wait() {
        TransferOutcome::Completed(payload) => assert_eq!(payload.bytes, bytes),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_cancel_from_caller() {
    let supervisor = TransferSupervisor::default();
    let handle = supervisor
        .start(TransferJob::HexEncode(sample(8 * 1024 * 1024)))
        .unwrap();
    supervisor.cancel(&handle);
    assert_eq!(supervisor.active_id(), None);

    // Cancellation lands between two chunks; nothing follows it.
    let mut handle = handle;
    let mut last = None;
    while let Some(event) = handle.next_event() {
        if last.is_none() {
            assert_eq!(event.state(), TransferState::Running);
        }
        assert!(!matches!(last, Some(TransferEvent::Cancelled)));
        last = Some(event);
    }
    assert_eq!(last, Some(TransferEvent::Cancelled));
    assert_eq!(handle.next_event(), None);
}

#[test]
fn test_new_transfer_supersedes_active_one() {
    let supervisor = TransferSupervisor::default();
    let first = supervisor
        .start(TransferJob::HexEncode(sample(16 * 1024 * 1024)))
        .unwrap();
    let second = supervisor.start(TransferJob::HexEncode(b"ok".to_vec())).unwrap();

    assert_eq!(supervisor.active_id(), Some(second.id()));
    assert_ne!(first.id(), second.id());
    assert_eq!(first.wait(), TransferOutcome::Cancelled);
    assert_eq!(
        second.wait(),
        TransferOutcome::Completed(Payload::new(b"ok".to_vec(), "6f6b"))
    );
}

#[test]
fn test_failure_is_terminal() {
    let supervisor = TransferSupervisor::new(TransferConfig { chunk_size: 3 });
    let outcome = supervisor
        .start(TransferJob::HexDecode("0011zz22".into()))
        .unwrap()
        .wait();
    assert!(matches!(
        outcome,
        TransferOutcome::Failed(ConversionError::DecodingFailure { .. })
    ));
}

#[test]
fn test_unsupported_kind_is_rejected_before_start() {
    let err = TransferJob::for_conversion(
        Mode::Deserialize,
        EncodingKind::Utf16,
        &Payload::from_text("x"),
    )
    .unwrap_err();
    assert!(matches!(err, ConversionError::UnsupportedEncoding { .. }));
}
