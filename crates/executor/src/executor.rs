//! The Executor - single entry point for Pickles commands.
//!
//! The Executor is a stateless dispatcher: it routes each [`Command`] to its
//! handler and wraps the result in an [`Output`].

use std::sync::Arc;

use pickles_bridge::{ProcessBridge, SerializationEngine};
use pickles_core::Limits;
use tracing::debug;

use crate::config::PicklesConfig;
use crate::handlers;
use crate::{Command, Output, Result};

/// The command executor.
///
/// Holds the serialization engine and input limits and nothing else; every
/// command carries its own mode, encoding and module variant.
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across threads.
///
/// # Example
///
/// ```ignore
/// use pickles_executor::{Command, EncodingKind, Executor, Mode, ModuleVariant, Payload};
///
/// let executor = Executor::from_config(&PicklesConfig::default())?;
/// let output = executor.execute(Command::Convert {
///     mode: Mode::Deserialize,
///     encoding: EncodingKind::AutoDetect,
///     module: ModuleVariant::Pickle,
///     payload: Payload::from_text("SGVsbG8="),
/// })?;
/// ```
pub struct Executor<E: SerializationEngine + ?Sized = ProcessBridge> {
    engine: Arc<E>,
    limits: Limits,
}

impl Executor<ProcessBridge> {
    /// Executor backed by the interpreter bridge described by `config`.
    pub fn from_config(config: &PicklesConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            Arc::new(ProcessBridge::new(config.bridge_config())),
            config.limits(),
        ))
    }
}

impl<E: SerializationEngine + ?Sized> Executor<E> {
    /// Create an executor around an engine.
    pub fn new(engine: Arc<E>, limits: Limits) -> Self {
        Self { engine, limits }
    }

    /// The serialization engine.
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Input limits applied to every command.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Execute a single command.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        debug!(target: "pickles::session", command = cmd.name(), "Executing command");
        match cmd {
            Command::Ping => Ok(Output::Pong {
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),
            Command::Convert {
                mode,
                encoding,
                module,
                payload,
            } => handlers::convert::convert(
                self.engine.as_ref(),
                &self.limits,
                mode,
                encoding,
                module,
                &payload,
            )
            .map(Output::Payload),
            Command::Detect { payload } => {
                Ok(Output::Detected(handlers::convert::detect_payload(&payload)))
            }
            Command::ImportFile { path, module } => {
                handlers::file::import_file(self.engine.as_ref(), &self.limits, &path, module)
                    .map(Output::Payload)
            }
            Command::ExportFile {
                path,
                payload,
                module,
            } => handlers::file::export_file(
                self.engine.as_ref(),
                &self.limits,
                &path,
                &payload,
                module,
            )
            .map(|(path, bytes)| Output::Written { path, bytes }),
            Command::ExecuteScript { code } => {
                handlers::script::execute_script(self.engine.as_ref(), &code).map(Output::Transcript)
            }
        }
    }

    /// Execute commands in order; one failure does not stop the rest.
    pub fn execute_many(&self, cmds: Vec<Command>) -> Vec<Result<Output>> {
        cmds.into_iter().map(|cmd| self.execute(cmd)).collect()
    }
}

impl<E: SerializationEngine + ?Sized> Clone for Executor<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            limits: self.limits,
        }
    }
}
