//! Output enum for command execution results.
//!
//! Every command produces exactly one output variant; see the table on
//! [`Command`](crate::Command).

use std::path::PathBuf;

use pickles_core::{EncodingKind, ExternalInvocationResult, Payload};
use serde::{Deserialize, Serialize};

/// Successful command execution results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Output {
    /// Version string
    Pong {
        /// Crate version
        version: String,
    },

    /// Converted or imported payload
    Payload(Payload),

    /// Detected encoding, `None` when nothing matched
    Detected(Option<EncodingKind>),

    /// File written, with the final path (extension applied)
    Written {
        /// Path written
        path: PathBuf,
        /// Pickle bytes written
        bytes: usize,
    },

    /// Exit status and captured streams of a script run
    Transcript(ExternalInvocationResult),
}
