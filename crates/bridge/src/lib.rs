//! External serialization bridge for Pickles
//!
//! Pickle `dumps`/`loads` are not implemented in-process. This crate launches
//! an interpreter (`python3` by default) with a generated `-c` script and
//! enforces the rules around it:
//!
//! - the working directory is created before any launch
//! - each request gets its own scratch file name
//! - stdout and stderr are captured separately; stderr is the error detail
//! - a non-zero exit is always an error, whatever stdout contains
//! - deserialized output must be UTF-8, otherwise it is an integrity failure
//! - every run is bounded by a timeout
//!
//! ```text
//! use pickles_bridge::{BridgeConfig, ProcessBridge, SerializationEngine};
//!
//! let bridge = ProcessBridge::new(BridgeConfig::default());
//! let bytes = bridge.serialize("hello", ModuleVariant::Pickle)?;
//! assert_eq!(bridge.deserialize(&bytes, ModuleVariant::Pickle)?, "hello");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod process;
pub mod script;
pub mod workdir;

pub use config::{default_working_dir, BridgeConfig, DEFAULT_INTERPRETER, DEFAULT_TIMEOUT};
pub use engine::{ProcessBridge, SerializationEngine};
pub use process::{require_success, ScriptRunner};
pub use workdir::{ensure_working_dir, ScratchFile, PICKLE_EXTENSION};
