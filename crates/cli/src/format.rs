//! Output → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): the converted text, `(nil)` when there is none,
//!   `(error) ...` for failures
//! - **JSON** (`--json`): `serde_json::to_string_pretty`

use pickles_executor::{ConversionError, EncodingKind, Output, Payload, TextCodec};
use serde_json::json;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    /// Mode selected by the global `--json` flag.
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        if matches.get_flag("json") {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

/// Format a successful output.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => format_json(output),
        OutputMode::Human => format_human(output),
    }
}

/// Format an error.
pub fn format_error(err: &ConversionError, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => pretty(&json!({
            "error": err.to_string(),
            "kind": err.kind_name(),
        })),
        OutputMode::Human => format!("(error) {}", err),
    }
}

/// Format a CLI-level failure that is not a conversion error.
pub fn format_message_error(message: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => pretty(&json!({ "error": message })),
        OutputMode::Human => format!("(error) {}", message),
    }
}

/// One progress line for stderr.
pub fn format_progress(fraction: f64, processed: usize, total: usize) -> String {
    format!("progress {:>5.1}% ({}/{})", fraction * 100.0, processed, total)
}

fn format_human(output: &Output) -> String {
    match output {
        Output::Pong { version } => format!("PONG {}", version),
        Output::Payload(payload) => payload_human(payload),
        Output::Detected(Some(kind)) => kind.label().to_string(),
        Output::Detected(None) => "(nil)".to_string(),
        Output::Written { path, bytes } => {
            format!("Wrote {} bytes to {}", bytes, path.display())
        }
        Output::Transcript(result) => result.transcript().trim_end_matches('\n').to_string(),
    }
}

fn payload_human(payload: &Payload) -> String {
    match &payload.text {
        Some(text) => text.clone(),
        // No rendering: fall back to hex so binary never hits the terminal.
        None => format!("(bytes) {}", hex_of(&payload.bytes)),
    }
}

fn format_json(output: &Output) -> String {
    let value = match output {
        Output::Pong { version } => json!({ "version": version }),
        Output::Payload(payload) => payload_json(payload),
        Output::Detected(kind) => json!({ "encoding": kind.map(|k| k.label()) }),
        Output::Written { path, bytes } => json!({
            "path": path.display().to_string(),
            "bytes": bytes,
        }),
        Output::Transcript(result) => json!({
            "exit_status": result.exit_status,
            "stdout": result.stdout_lossy(),
            "stderr": result.stderr_lossy(),
        }),
    };
    pretty(&value)
}

/// JSON form of a payload: the text plus the bytes in hex.
pub fn payload_json(payload: &Payload) -> serde_json::Value {
    json!({
        "text": payload.text,
        "bytes_hex": hex_of(&payload.bytes),
        "len": payload.len(),
    })
}

fn hex_of(bytes: &[u8]) -> String {
    TextCodec::encode(bytes, EncodingKind::Hex).unwrap_or_default()
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
