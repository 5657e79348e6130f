//! Chunked transfer jobs and the synchronous transfer loop.
//!
//! `run_transfer` drives a [`TransferJob`] chunk by chunk and reports through
//! a callback. The background worker wraps it; tests call it directly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pickles_core::{ConversionError, EncodingKind, Mode, Payload, Result};
use tracing::debug;

use crate::chunk::{Base64Decoder, Base64Encoder, ChunkConverter, HexDecoder, HexEncoder};

/// Default number of units per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// A conversion that can run in chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferJob {
    /// Bytes to Base64 text.
    Base64Encode(Vec<u8>),
    /// Base64 text to bytes.
    Base64Decode(String),
    /// Bytes to hex text.
    HexEncode(Vec<u8>),
    /// Hex text to bytes.
    HexDecode(String),
}

impl TransferJob {
    /// The job a session conversion maps to.
    ///
    /// Serialize renders the payload bytes; deserialize decodes the payload
    /// text with surrounding whitespace removed. Only Base64 and hex can be
    /// chunked.
    pub fn for_conversion(mode: Mode, kind: EncodingKind, payload: &Payload) -> Result<Self> {
        match (mode, kind) {
            (Mode::Serialize, EncodingKind::Base64) => {
                Ok(TransferJob::Base64Encode(payload.bytes.clone()))
            }
            (Mode::Serialize, EncodingKind::Hex) => Ok(TransferJob::HexEncode(payload.bytes.clone())),
            (Mode::Deserialize, EncodingKind::Base64) => Ok(TransferJob::Base64Decode(
                payload.text_or_utf8()?.trim().to_string(),
            )),
            (Mode::Deserialize, EncodingKind::Hex) => Ok(TransferJob::HexDecode(
                payload.text_or_utf8()?.trim().to_string(),
            )),
            (mode, kind) => Err(ConversionError::unsupported(format!(
                "{} cannot be chunked in {} mode",
                kind, mode
            ))),
        }
    }

    /// Run the whole job in one step.
    ///
    /// Same converter and same output rules as [`run_transfer`], so the
    /// result never depends on whether a conversion was chunked.
    pub fn convert(&self) -> Result<Payload> {
        self.check_input()?;
        let mut converter = self.converter();
        converter.feed(self.input())?;
        self.output_payload(converter.finish()?)
    }

    /// Total units of work: input bytes for encodes, characters for decodes.
    pub fn total_units(&self) -> usize {
        self.input().len()
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            TransferJob::Base64Encode(_) => "base64-encode",
            TransferJob::Base64Decode(_) => "base64-decode",
            TransferJob::HexEncode(_) => "hex-encode",
            TransferJob::HexDecode(_) => "hex-decode",
        }
    }

    fn input(&self) -> &[u8] {
        match self {
            TransferJob::Base64Encode(bytes) | TransferJob::HexEncode(bytes) => bytes,
            TransferJob::Base64Decode(text) | TransferJob::HexDecode(text) => text.as_bytes(),
        }
    }

    fn is_decode(&self) -> bool {
        matches!(self, TransferJob::Base64Decode(_) | TransferJob::HexDecode(_))
    }

    fn encoding(&self) -> EncodingKind {
        match self {
            TransferJob::Base64Encode(_) | TransferJob::Base64Decode(_) => EncodingKind::Base64,
            TransferJob::HexEncode(_) | TransferJob::HexDecode(_) => EncodingKind::Hex,
        }
    }

    fn check_input(&self) -> Result<()> {
        if self.is_decode() && !self.input().is_ascii() {
            return Err(ConversionError::decoding(format!(
                "{} input contains non-ASCII characters",
                self.name()
            )));
        }
        Ok(())
    }

    /// Payload for the converter output.
    ///
    /// Encodes keep the input bytes with the rendering as text. Decodes must
    /// yield UTF-8 text, otherwise they fail with `DecodingFailure`.
    fn output_payload(&self, output: Vec<u8>) -> Result<Payload> {
        match self {
            TransferJob::Base64Encode(input) | TransferJob::HexEncode(input) => {
                let text = String::from_utf8(output).map_err(|e| {
                    ConversionError::encoding(format!(
                        "{} rendering is not text: {}",
                        self.encoding(),
                        e.utf8_error()
                    ))
                })?;
                Ok(Payload::new(input.clone(), text))
            }
            TransferJob::Base64Decode(_) | TransferJob::HexDecode(_) => {
                let text = String::from_utf8(output).map_err(|e| {
                    ConversionError::decoding(format!(
                        "decoded {} data is not valid UTF-8 text: {}",
                        self.encoding(),
                        e.utf8_error()
                    ))
                })?;
                Ok(Payload::from_text(text))
            }
        }
    }

    fn converter(&self) -> Box<dyn ChunkConverter> {
        match self {
            TransferJob::Base64Encode(_) => Box::<Base64Encoder>::default(),
            TransferJob::Base64Decode(_) => Box::<Base64Decoder>::default(),
            TransferJob::HexEncode(_) => Box::<HexEncoder>::default(),
            TransferJob::HexDecode(_) => Box::<HexDecoder>::default(),
        }
    }
}

/// Lifecycle of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// Created, no chunk processed yet. Only `Running` or a failure on the
    /// input check can follow.
    Idle,
    /// Processing chunks.
    Running,
    /// Finished with a result.
    Completed,
    /// Stopped by a cancel request.
    Cancelled,
    /// Stopped by a conversion error.
    Failed,
}

impl TransferState {
    /// Whether no further events can follow.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferState::Completed | TransferState::Cancelled | TransferState::Failed
        )
    }
}

/// Event reported by a running transfer.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    /// A chunk was processed.
    Progress {
        /// `processed_units / total_units`, in `(0, 1]`.
        fraction: f64,
        /// Units processed so far.
        processed_units: usize,
        /// Units in the whole job.
        total_units: usize,
    },
    /// The job finished.
    Completed(Payload),
    /// The job was cancelled; partial output was discarded.
    Cancelled,
    /// The job failed.
    Failed(ConversionError),
}

impl TransferEvent {
    /// The state this event moves the transfer into.
    pub fn state(&self) -> TransferState {
        match self {
            TransferEvent::Progress { .. } => TransferState::Running,
            TransferEvent::Completed(_) => TransferState::Completed,
            TransferEvent::Cancelled => TransferState::Cancelled,
            TransferEvent::Failed(_) => TransferState::Failed,
        }
    }

    /// Whether this is the last event of the transfer.
    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }
}

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Run `job` to a terminal state, reporting every event through `emit`.
///
/// The cancel token is checked between chunks, after the progress event of
/// the chunk just processed, so `Cancelled` always follows at least one
/// `Progress`. The last event emitted is always the terminal one, and its
/// state is returned.
pub fn run_transfer<F>(
    job: &TransferJob,
    chunk_size: usize,
    cancel: &CancelToken,
    mut emit: F,
) -> TransferState
where
    F: FnMut(TransferEvent),
{
    let input = job.input();
    let total = input.len();
    let chunk_size = chunk_size.max(1);

    if let Err(e) = job.check_input() {
        emit(TransferEvent::Failed(e));
        return TransferState::Failed;
    }

    let mut converter = job.converter();
    let mut processed = 0;

    if total == 0 {
        emit(TransferEvent::Progress {
            fraction: 1.0,
            processed_units: 0,
            total_units: 0,
        });
    }

    for chunk in input.chunks(chunk_size) {
        if let Err(e) = converter.feed(chunk) {
            emit(TransferEvent::Failed(e));
            return TransferState::Failed;
        }
        processed += chunk.len();
        let fraction = if processed == total {
            1.0
        } else {
            processed as f64 / total as f64
        };
        emit(TransferEvent::Progress {
            fraction,
            processed_units: processed,
            total_units: total,
        });
        if processed < total && cancel.is_cancelled() {
            debug!(target: "pickles::transfer", job = job.name(), processed, total, "Transfer cancelled");
            emit(TransferEvent::Cancelled);
            return TransferState::Cancelled;
        }
    }

    match converter.finish().and_then(|output| job.output_payload(output)) {
        Ok(payload) => {
            emit(TransferEvent::Completed(payload));
            TransferState::Completed
        }
        Err(e) => {
            emit(TransferEvent::Failed(e));
            TransferState::Failed
        }
    }
}
