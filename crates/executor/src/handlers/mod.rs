//! Command handlers organized by concern.
//!
//! | Module | Commands |
//! |--------|----------|
//! | `convert` | Convert, Detect |
//! | `file` | ImportFile, ExportFile |
//! | `script` | ExecuteScript |
//!
//! Handlers are free functions over a [`SerializationEngine`] so the
//! stateless executor and the stateful session share them.
//!
//! [`SerializationEngine`]: pickles_bridge::SerializationEngine

pub mod convert;
pub mod file;
pub mod script;
