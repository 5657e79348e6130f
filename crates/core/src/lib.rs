//! Core types and codecs for Pickles
//!
//! This crate defines the foundational pieces used throughout the system:
//! - Payload: canonical bytes plus an optional text rendering
//! - EncodingKind, Mode, ModuleVariant: the conversion vocabulary
//! - ConversionError: the error taxonomy shared by every layer
//! - Codecs: Base64, hex, charsets and the escaped byte-string notation
//! - Detection: fixed-precedence encoding auto-detection
//! - Validation: mode gate that runs before any conversion
//! - Limits: input size ceiling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod detect;
pub mod error;
pub mod limits;
pub mod types;
pub mod validation;

pub use codec::{ByteStringCodec, TextCodec};
pub use detect::{detect, resolve, DETECTION_FAILED};
pub use error::{ConversionError, Result};
pub use limits::{Limits, DEFAULT_MAX_INPUT_BYTES};
pub use types::{EncodingKind, ExternalInvocationResult, Mode, ModuleVariant, Payload};
pub use validation::validate;
