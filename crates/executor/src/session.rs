//! Stateful session holding the caller's selections.
//!
//! The [`Session`] wraps an [`Executor`] and remembers the current mode,
//! encoding and module variant, so callers convert payloads without
//! repeating them. It also owns the [`TransferSupervisor`] that keeps
//! chunked transfers single-flight.
//!
//! # Usage
//!
//! ```ignore
//! use pickles_executor::{EncodingKind, Mode, Payload, PicklesConfig, Session};
//!
//! let mut session = Session::from_config(&PicklesConfig::default())?;
//! session.set_mode(Mode::Serialize);
//! session.set_encoding(EncodingKind::ByteString)?;
//! let pickled = session.convert(&Payload::from_text("hello"))?;
//! ```

use std::path::Path;
use std::sync::Arc;

use pickles_bridge::{ProcessBridge, SerializationEngine};
use pickles_core::{
    ConversionError, EncodingKind, ExternalInvocationResult, Limits, Mode, ModuleVariant, Payload,
};
use pickles_engine::{TransferConfig, TransferHandle, TransferJob, TransferSupervisor};
use tracing::{debug, info};

use crate::config::PicklesConfig;
use crate::handlers;
use crate::{Command, Executor, Output, Result};

/// A stateful session over an [`Executor`].
///
/// Starts in deserialize mode with `AutoDetect` selected. Switching mode
/// resets the encoding to the new mode's default.
pub struct Session<E: SerializationEngine + ?Sized = ProcessBridge> {
    executor: Executor<E>,
    mode: Mode,
    encoding: EncodingKind,
    module: ModuleVariant,
    transfers: TransferSupervisor,
}

impl Session<ProcessBridge> {
    /// Session backed by the interpreter bridge described by `config`.
    pub fn from_config(config: &PicklesConfig) -> Result<Self> {
        Ok(Self::new(
            Executor::from_config(config)?,
            config.transfer_config(),
        ))
    }
}

impl<E: SerializationEngine + ?Sized> Session<E> {
    /// Create a session over an executor.
    pub fn new(executor: Executor<E>, transfer: TransferConfig) -> Self {
        let mode = Mode::default();
        Self {
            executor,
            mode,
            encoding: mode.default_encoding(),
            module: ModuleVariant::default(),
            transfers: TransferSupervisor::new(transfer),
        }
    }

    /// Create a session directly around an engine.
    pub fn with_engine(engine: Arc<E>, limits: Limits, transfer: TransferConfig) -> Self {
        Self::new(Executor::new(engine, limits), transfer)
    }

    /// Get a reference to the underlying executor.
    pub fn executor(&self) -> &Executor<E> {
        &self.executor
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current encoding selection.
    pub fn encoding(&self) -> EncodingKind {
        self.encoding
    }

    /// Current module variant.
    pub fn module_variant(&self) -> ModuleVariant {
        self.module
    }

    /// Switch mode; the encoding resets to the mode's default.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            self.mode = mode;
            self.encoding = mode.default_encoding();
            info!(target: "pickles::session", ?mode, encoding = %self.encoding, "Mode changed");
        }
    }

    /// Select an encoding from the current mode's subset.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedEncoding` if the mode does not offer `kind`; the
    /// previous selection is kept.
    pub fn set_encoding(&mut self, kind: EncodingKind) -> Result<()> {
        if !self.mode.allows(kind) {
            return Err(ConversionError::unsupported(format!(
                "{} is not available in {}",
                kind, self.mode
            )));
        }
        self.encoding = kind;
        debug!(target: "pickles::session", encoding = %kind, "Encoding selected");
        Ok(())
    }

    /// Select the pickle module the engine imports.
    pub fn set_module_variant(&mut self, module: ModuleVariant) {
        self.module = module;
        debug!(target: "pickles::session", %module, "Module variant selected");
    }

    /// Convert `payload` with the current selections.
    pub fn convert(&self, payload: &Payload) -> Result<Payload> {
        handlers::convert::convert(
            self.executor.engine().as_ref(),
            self.executor.limits(),
            self.mode,
            self.encoding,
            self.module,
            payload,
        )
    }

    /// Guess the encoding of `payload`'s bytes.
    pub fn detect(&self, payload: &Payload) -> Option<EncodingKind> {
        handlers::convert::detect_payload(payload)
    }

    /// Read a pickle file and deserialize it with the current module variant.
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<Payload> {
        handlers::file::import_file(
            self.executor.engine().as_ref(),
            self.executor.limits(),
            path.as_ref(),
            self.module,
        )
    }

    /// Serialize `payload`'s text and write it to `path`.
    ///
    /// `.pkl` is appended when `path` has no extension.
    pub fn export_file(&self, path: impl AsRef<Path>, payload: &Payload) -> Result<()> {
        handlers::file::export_file(
            self.executor.engine().as_ref(),
            self.executor.limits(),
            path.as_ref(),
            payload,
            self.module,
        )
        .map(|_| ())
    }

    /// Start a chunked Base64/hex conversion on a background worker.
    ///
    /// Runs the same checks as [`convert`](Self::convert) first. Any transfer
    /// already running is cancelled.
    pub fn start_chunked_convert(&self, payload: &Payload) -> Result<TransferHandle> {
        let kind =
            handlers::convert::prepare(self.executor.limits(), self.mode, self.encoding, payload)?;
        let job = TransferJob::for_conversion(self.mode, kind, payload)?;
        let handle = self.transfers.start(job)?;
        info!(
            target: "pickles::session",
            id = %handle.id(),
            mode = ?self.mode,
            encoding = %kind,
            input_len = payload.len(),
            "Chunked conversion started"
        );
        Ok(handle)
    }

    /// Cancel a chunked conversion started by this session.
    pub fn cancel(&self, handle: &TransferHandle) {
        self.transfers.cancel(handle);
        debug!(target: "pickles::session", id = %handle.id(), "Chunked conversion cancel requested");
    }

    /// Run interpreter code and return its transcript.
    pub fn execute_script(&self, code: &str) -> Result<ExternalInvocationResult> {
        handlers::script::execute_script(self.executor.engine().as_ref(), code)
    }

    /// Execute a self-contained command.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        self.executor.execute(cmd)
    }
}
