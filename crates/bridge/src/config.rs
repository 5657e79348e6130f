//! Bridge configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default interpreter, resolved through `PATH`.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Default bound on a single interpreter run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Directory name created under the user's documents folder.
pub const WORKING_DIR_NAME: &str = "Pickles";

/// How the bridge launches the external interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Interpreter program (`python3` by default)
    pub interpreter: String,
    /// Arguments placed before `-c <script>`
    pub interpreter_args: Vec<String>,
    /// Scratch directory for files handed to the interpreter
    pub working_dir: PathBuf,
    /// Maximum time a single run may take before it is killed
    pub timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            interpreter_args: Vec::new(),
            working_dir: default_working_dir(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl BridgeConfig {
    /// Default configuration rooted at `working_dir`.
    pub fn with_working_dir(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            ..Self::default()
        }
    }
}

/// `~/Documents/Pickles`, or `<tmp>/Pickles` when no home directory is set.
pub fn default_working_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join("Documents"))
        .unwrap_or_else(std::env::temp_dir)
        .join(WORKING_DIR_NAME)
}
