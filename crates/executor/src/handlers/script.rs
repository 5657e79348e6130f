//! ExecuteScript handler.

use pickles_bridge::SerializationEngine;
use pickles_core::{ExternalInvocationResult, Result};
use tracing::debug;

/// Run `code` with the engine's interpreter.
///
/// A non-zero exit is an `ExternalProcessFailure` carrying stderr.
pub fn execute_script<E: SerializationEngine + ?Sized>(
    engine: &E,
    code: &str,
) -> Result<ExternalInvocationResult> {
    let result = engine.execute(code)?;
    debug!(
        target: "pickles::session",
        code_len = code.len(),
        exit_status = result.exit_status,
        stdout_len = result.stdout.len(),
        stderr_len = result.stderr.len(),
        "Script executed"
    );
    Ok(result)
}
