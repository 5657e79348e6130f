//! Command enum defining all Pickles operations.
//!
//! Commands are the "instruction set" of Pickles. Each variant is
//! self-contained: mode, encoding and module variant travel with the command
//! instead of living in a session, so a command can be serialized, logged or
//! replayed on its own.

use std::path::PathBuf;

use pickles_core::{EncodingKind, Mode, ModuleVariant, Payload};
use serde::{Deserialize, Serialize};

/// A self-contained, serializable operation.
///
/// | Command | Output |
/// |---------|--------|
/// | `Ping` | `Pong` |
/// | `Convert` | `Payload` |
/// | `Detect` | `Detected` |
/// | `ImportFile` | `Payload` |
/// | `ExportFile` | `Written` |
/// | `ExecuteScript` | `Transcript` |
///
/// # Example
///
/// ```ignore
/// use pickles_executor::{Command, EncodingKind, Mode, ModuleVariant, Payload};
///
/// let cmd = Command::Convert {
///     mode: Mode::Serialize,
///     encoding: EncodingKind::Hex,
///     module: ModuleVariant::Pickle,
///     payload: Payload::from_text("hello"),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    /// Liveness check.
    /// Returns: `Output::Pong`
    Ping,

    /// Convert a payload.
    /// Returns: `Output::Payload`
    Convert {
        /// Conversion direction
        mode: Mode,
        /// Encoding to use; `AutoDetect` only when deserializing
        encoding: EncodingKind,
        /// Pickle module used by byte-string conversions
        #[serde(default)]
        module: ModuleVariant,
        /// Input
        payload: Payload,
    },

    /// Guess the encoding of a payload's bytes.
    /// Returns: `Output::Detected`
    Detect {
        /// Input to inspect
        payload: Payload,
    },

    /// Read a pickle file and deserialize it.
    /// Returns: `Output::Payload`
    ImportFile {
        /// Pickle file to read
        path: PathBuf,
        /// Pickle module to load with
        #[serde(default)]
        module: ModuleVariant,
    },

    /// Serialize a payload's text and write the pickle bytes to a file.
    /// Returns: `Output::Written`
    ExportFile {
        /// Destination; `.pkl` is appended when it has no extension
        path: PathBuf,
        /// Text to pickle
        payload: Payload,
        /// Pickle module to dump with
        #[serde(default)]
        module: ModuleVariant,
    },

    /// Run caller-supplied interpreter code.
    /// Returns: `Output::Transcript`
    ExecuteScript {
        /// Interpreter code
        code: String,
    },
}

impl Command {
    /// Variant name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "Ping",
            Command::Convert { .. } => "Convert",
            Command::Detect { .. } => "Detect",
            Command::ImportFile { .. } => "ImportFile",
            Command::ExportFile { .. } => "ExportFile",
            Command::ExecuteScript { .. } => "ExecuteScript",
        }
    }
}
