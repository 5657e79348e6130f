//! The serialization engine seam and its process-backed implementation.

use std::path::Path;

use pickles_core::{ConversionError, ExternalInvocationResult, ModuleVariant, Result};
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::process::{require_success, ScriptRunner};
use crate::script::{deserialize_script, serialize_script};
use crate::workdir::{ensure_working_dir, ScratchFile};

/// Pickle `dumps`/`loads` performed outside this process.
///
/// Implementations must never panic when the engine is unavailable; every
/// failure is a recoverable [`ConversionError`].
pub trait SerializationEngine: Send + Sync {
    /// Pickle `text` as a string value and return the raw pickle bytes.
    fn serialize(&self, text: &str, variant: ModuleVariant) -> Result<Vec<u8>>;

    /// Unpickle `bytes` and return the printed value.
    fn deserialize(&self, bytes: &[u8], variant: ModuleVariant) -> Result<String>;

    /// Run caller-supplied code and return the captured transcript.
    fn execute(&self, script: &str) -> Result<ExternalInvocationResult>;
}

/// Engine that launches an interpreter process per request.
#[derive(Debug, Clone)]
pub struct ProcessBridge {
    config: BridgeConfig,
}

impl ProcessBridge {
    /// Create a bridge; nothing is launched or created yet.
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// The bridge configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The scratch directory.
    pub fn working_dir(&self) -> &Path {
        &self.config.working_dir
    }

    /// Create the scratch directory and return a runner rooted in it.
    fn prepare(&self) -> Result<ScriptRunner> {
        ensure_working_dir(&self.config.working_dir)?;
        Ok(ScriptRunner::new(
            self.config.interpreter.clone(),
            self.config.interpreter_args.clone(),
            self.config.working_dir.clone(),
            self.config.timeout,
        ))
    }

    fn run_checked(&self, runner: &ScriptRunner, script: &str) -> Result<ExternalInvocationResult> {
        let result = runner.run(script)?;
        require_success(result, runner.interpreter())
    }
}

impl SerializationEngine for ProcessBridge {
    fn serialize(&self, text: &str, variant: ModuleVariant) -> Result<Vec<u8>> {
        let runner = self.prepare()?;
        let result = self.run_checked(&runner, &serialize_script(text, variant))?;
        debug!(
            target: "pickles::bridge",
            %variant,
            input_len = text.len(),
            output_len = result.stdout.len(),
            "Serialized via engine"
        );
        Ok(result.stdout)
    }

    fn deserialize(&self, bytes: &[u8], variant: ModuleVariant) -> Result<String> {
        let runner = self.prepare()?;
        let scratch = ScratchFile::create(runner.cwd(), bytes)?;
        let path = scratch.path().to_str().ok_or_else(|| {
            ConversionError::external(format!(
                "scratch path '{}' is not valid UTF-8",
                scratch.path().display()
            ))
        })?;

        let result = self.run_checked(&runner, &deserialize_script(path, variant))?;
        let request_id = scratch.request_id();
        drop(scratch);

        let mut text = String::from_utf8(result.stdout).map_err(|e| {
            warn!(target: "pickles::bridge", %request_id, "Engine output is not UTF-8");
            ConversionError::integrity(format!(
                "deserialized output is not valid UTF-8: {}",
                e.utf8_error()
            ))
        })?;
        strip_print_newline(&mut text);

        debug!(
            target: "pickles::bridge",
            %request_id,
            %variant,
            input_len = bytes.len(),
            output_len = text.len(),
            "Deserialized via engine"
        );
        Ok(text)
    }

    fn execute(&self, script: &str) -> Result<ExternalInvocationResult> {
        let runner = self.prepare()?;
        self.run_checked(&runner, script)
    }
}

/// Remove the single line terminator `print` appends.
fn strip_print_newline(text: &mut String) {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
}
