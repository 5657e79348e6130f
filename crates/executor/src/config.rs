//! Configuration via `pickles.toml`
//!
//! A single flat file. Missing keys fall back to defaults; values are checked
//! eagerly when the file is read so a bad setting fails at startup rather
//! than on the first conversion.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pickles_bridge::{default_working_dir, BridgeConfig, DEFAULT_INTERPRETER};
use pickles_core::{ConversionError, Limits, Result, DEFAULT_MAX_INPUT_BYTES};
use pickles_engine::{TransferConfig, DEFAULT_CHUNK_SIZE};
use serde::{Deserialize, Serialize};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "pickles.toml";

/// Configuration loaded from `pickles.toml`.
///
/// # Example
///
/// ```toml
/// interpreter = "python3"
/// timeout_ms = 30000
/// chunk_size = 1024
/// max_input_bytes = 10485760
/// # working_dir = "/home/me/Documents/Pickles"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PicklesConfig {
    /// Interpreter executable, resolved via `PATH`.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    /// Upper bound for one interpreter run, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Units per chunk for chunked transfers.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Largest accepted input, in bytes.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
    /// Scratch directory; `~/Documents/Pickles` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

fn default_interpreter() -> String {
    DEFAULT_INTERPRETER.to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_max_input_bytes() -> usize {
    DEFAULT_MAX_INPUT_BYTES
}

impl Default for PicklesConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            timeout_ms: default_timeout_ms(),
            chunk_size: default_chunk_size(),
            max_input_bytes: default_max_input_bytes(),
            working_dir: None,
        }
    }
}

impl PicklesConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `Io` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if self.interpreter.trim().is_empty() {
            return Err(ConversionError::io("invalid config: interpreter must not be empty"));
        }
        if self.timeout_ms == 0 {
            return Err(ConversionError::io("invalid config: timeout_ms must be greater than 0"));
        }
        if self.chunk_size == 0 {
            return Err(ConversionError::io("invalid config: chunk_size must be greater than 0"));
        }
        Ok(())
    }

    /// Bridge settings derived from this config.
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            interpreter: self.interpreter.clone(),
            interpreter_args: Vec::new(),
            working_dir: self.working_dir.clone().unwrap_or_else(default_working_dir),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    /// Chunked transfer settings derived from this config.
    pub fn transfer_config(&self) -> TransferConfig {
        TransferConfig {
            chunk_size: self.chunk_size,
        }
    }

    /// Input limits derived from this config.
    pub fn limits(&self) -> Limits {
        Limits {
            max_input_bytes: self.max_input_bytes,
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Pickles configuration
#
# Interpreter that performs pickle dumps/loads, resolved via PATH.
interpreter = "python3"

# Upper bound for one interpreter run, in milliseconds.
timeout_ms = 30000

# Units per chunk for chunked Base64/hex transfers.
chunk_size = 1024

# Largest accepted input in bytes (default 10 MiB).
max_input_bytes = 10485760

# Scratch directory for transient files (default: ~/Documents/Pickles).
# working_dir = "/home/me/Documents/Pickles"
"#
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConversionError::io(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: PicklesConfig = toml::from_str(&content).map_err(|e| {
            ConversionError::io(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate().map_err(|e| {
            ConversionError::io(format!("config file '{}': {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                ConversionError::io(format!(
                    "failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConversionError::io(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            ConversionError::io(format!(
                "failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
