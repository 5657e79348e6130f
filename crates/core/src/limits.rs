//! Size limits for conversion input
//!
//! Inputs above the limit are rejected with `InputTooLarge` before any
//! validation, conversion or interpreter launch happens.

use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, Result};

/// Default input ceiling: 10 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Size limits for conversion input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum input length in bytes (default: 10MB)
    pub max_input_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_input_bytes: 1000,
        }
    }

    /// Validate an input length
    pub fn validate_input_len(&self, len: usize) -> Result<()> {
        if len > self.max_input_bytes {
            return Err(ConversionError::InputTooLarge {
                size: len,
                limit: self.max_input_bytes,
            });
        }
        Ok(())
    }
}
