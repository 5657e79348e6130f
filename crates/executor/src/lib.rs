//! # Pickles Executor
//!
//! The public API for Pickles - conversion between text and Python pickle
//! data in several textual encodings.
//!
//! This is the only crate users need to import. It provides:
//! - [`Session`] - the stateful, caller-facing surface
//! - [`Command`]/[`Output`] - the serializable instruction set
//! - [`Executor`] - stateless command dispatch
//! - [`PicklesConfig`] - `pickles.toml` configuration
//!
//! ## Quick Start
//!
//! ```text
//! use pickles_executor::{Mode, EncodingKind, Payload, PicklesConfig, Session};
//!
//! let mut session = Session::from_config(&PicklesConfig::default())?;
//!
//! // Deserialize with auto-detection (the initial mode)
//! let text = session.convert(&Payload::from_text("SGVsbG8="))?;
//!
//! // Pickle text through the interpreter
//! session.set_mode(Mode::Serialize);
//! session.set_encoding(EncodingKind::ByteString)?;
//! let pickled = session.convert(&Payload::from_text("hello"))?;
//! ```

#![warn(missing_docs)]

mod command;
mod config;
mod executor;
mod output;
mod session;

// Handler modules
mod handlers;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use command::Command;
pub use config::{PicklesConfig, CONFIG_FILE_NAME};
pub use executor::Executor;
pub use handlers::file::with_pickle_extension;
pub use output::Output;
pub use session::Session;

pub use pickles_bridge::{BridgeConfig, ProcessBridge, SerializationEngine};
pub use pickles_core::{
    ConversionError, EncodingKind, ExternalInvocationResult, Limits, Mode, ModuleVariant, Payload,
    TextCodec,
};
pub use pickles_engine::{
    TransferConfig, TransferEvent, TransferHandle, TransferOutcome, TransferState,
};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, ConversionError>;
