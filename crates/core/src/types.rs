//! Core data model: payloads, encodings, modes and module variants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, Result};

// ============================================================================
// EncodingKind
// ============================================================================

/// Textual formats a payload can be rendered in.
///
/// `AutoDetect` is a meta-value: it is only legal on the deserialize path and
/// is resolved to a concrete kind before any codec runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingKind {
    /// Standard Base64 alphabet with padding
    Base64,
    /// UTF-8 text
    Utf8,
    /// 7-bit ASCII text
    Ascii,
    /// UTF-16 text (little-endian on output)
    Utf16,
    /// ISO-8859-1 text
    Latin1,
    /// Lowercase hexadecimal digits
    Hex,
    /// Escaped `\xNN` byte notation, optionally wrapped as `b'...'`
    ByteString,
    /// Resolve from the input itself
    AutoDetect,
}

impl EncodingKind {
    /// Every kind, in display order.
    pub const ALL: [EncodingKind; 8] = [
        EncodingKind::AutoDetect,
        EncodingKind::Base64,
        EncodingKind::Utf8,
        EncodingKind::Ascii,
        EncodingKind::Utf16,
        EncodingKind::Latin1,
        EncodingKind::Hex,
        EncodingKind::ByteString,
    ];

    /// Human-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            EncodingKind::Base64 => "Base64",
            EncodingKind::Utf8 => "UTF-8",
            EncodingKind::Ascii => "ASCII",
            EncodingKind::Utf16 => "UTF-16",
            EncodingKind::Latin1 => "Latin-1",
            EncodingKind::Hex => "Hex",
            EncodingKind::ByteString => "Pickle Byte String",
            EncodingKind::AutoDetect => "Auto-Detect",
        }
    }

    /// Whether this kind is a fixed-width character encoding rather than a
    /// byte rendering.
    pub fn is_charset(&self) -> bool {
        matches!(
            self,
            EncodingKind::Utf8 | EncodingKind::Ascii | EncodingKind::Utf16 | EncodingKind::Latin1
        )
    }

    /// Whether the textual rendering round-trips the bytes without loss.
    pub fn is_lossless(&self) -> bool {
        matches!(
            self,
            EncodingKind::Base64 | EncodingKind::Hex | EncodingKind::ByteString
        )
    }
}

impl fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EncodingKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "base64" | "b64" => Ok(EncodingKind::Base64),
            "utf8" => Ok(EncodingKind::Utf8),
            "ascii" => Ok(EncodingKind::Ascii),
            "utf16" => Ok(EncodingKind::Utf16),
            "latin1" | "iso88591" => Ok(EncodingKind::Latin1),
            "hex" => Ok(EncodingKind::Hex),
            "bytestring" | "picklebytestring" | "bytes" => Ok(EncodingKind::ByteString),
            "auto" | "autodetect" => Ok(EncodingKind::AutoDetect),
            _ => Err(ConversionError::unsupported(format!(
                "unknown encoding '{}'",
                s
            ))),
        }
    }
}

// ============================================================================
// Mode
// ============================================================================

/// The user's declared intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Text to serialized bytes
    Serialize,
    /// Serialized bytes to text
    #[default]
    Deserialize,
}

const SERIALIZE_OPTIONS: &[EncodingKind] = &[
    EncodingKind::Base64,
    EncodingKind::Utf8,
    EncodingKind::Ascii,
    EncodingKind::Utf16,
    EncodingKind::Latin1,
    EncodingKind::Hex,
    EncodingKind::ByteString,
];

const DESERIALIZE_OPTIONS: &[EncodingKind] = &[
    EncodingKind::AutoDetect,
    EncodingKind::Base64,
    EncodingKind::Utf8,
    EncodingKind::Ascii,
    EncodingKind::Utf16,
    EncodingKind::Latin1,
    EncodingKind::Hex,
    EncodingKind::ByteString,
];

impl Mode {
    /// Encodings selectable in this mode, in display order.
    pub fn encoding_options(&self) -> &'static [EncodingKind] {
        match self {
            Mode::Serialize => SERIALIZE_OPTIONS,
            Mode::Deserialize => DESERIALIZE_OPTIONS,
        }
    }

    /// Whether `kind` may be selected in this mode.
    pub fn allows(&self, kind: EncodingKind) -> bool {
        self.encoding_options().contains(&kind)
    }

    /// Encoding selected after switching into this mode.
    pub fn default_encoding(&self) -> EncodingKind {
        match self {
            Mode::Serialize => EncodingKind::Base64,
            Mode::Deserialize => EncodingKind::AutoDetect,
        }
    }

    /// Human-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Serialize => "Serialization Mode",
            Mode::Deserialize => "Deserialization Mode",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "serialize" | "ser" => Ok(Mode::Serialize),
            "deserialize" | "de" => Ok(Mode::Deserialize),
            _ => Err(ConversionError::mode_mismatch(format!("unknown mode '{}'", s))),
        }
    }
}

// ============================================================================
// ModuleVariant
// ============================================================================

/// Which pickle module the external engine imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModuleVariant {
    /// Standard library `pickle`, default protocol
    #[default]
    Pickle,
    /// `pickle5` backport, protocol 5
    Pickle5,
}

impl ModuleVariant {
    /// Module name as imported by the interpreter.
    pub fn module_name(&self) -> &'static str {
        match self {
            ModuleVariant::Pickle => "pickle",
            ModuleVariant::Pickle5 => "pickle5",
        }
    }
}

impl fmt::Display for ModuleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module_name())
    }
}

impl FromStr for ModuleVariant {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pickle" => Ok(ModuleVariant::Pickle),
            "pickle5" => Ok(ModuleVariant::Pickle5),
            _ => Err(ConversionError::unsupported(format!(
                "unknown module variant '{}'",
                s
            ))),
        }
    }
}

// ============================================================================
// Payload
// ============================================================================

/// A byte sequence with an optional textual rendering.
///
/// Bytes are canonical; the text is a view that may be lossy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Payload {
    /// Canonical bytes
    pub bytes: Vec<u8>,
    /// Textual rendering, if one exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Payload {
    /// Payload from caller text; bytes are its UTF-8 encoding.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            bytes: text.as_bytes().to_vec(),
            text: Some(text),
        }
    }

    /// Payload from raw bytes with no rendering.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            text: None,
        }
    }

    /// Payload with an explicit rendering.
    pub fn new(bytes: Vec<u8>, text: impl Into<String>) -> Self {
        Self {
            bytes,
            text: Some(text.into()),
        }
    }

    /// Number of canonical bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether there are no canonical bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The rendering, or the bytes read as strict UTF-8.
    pub fn text_or_utf8(&self) -> Result<&str> {
        match &self.text {
            Some(text) => Ok(text.as_str()),
            None => std::str::from_utf8(&self.bytes).map_err(|e| {
                ConversionError::decoding(format!("payload is not valid UTF-8: {}", e))
            }),
        }
    }
}

// ============================================================================
// ExternalInvocationResult
// ============================================================================

/// Exit status and captured streams of one interpreter run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExternalInvocationResult {
    /// Process exit code; non-zero is always a failure
    pub exit_status: i32,
    /// Captured standard output
    pub stdout: Vec<u8>,
    /// Captured standard error
    pub stderr: Vec<u8>,
}

impl ExternalInvocationResult {
    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }

    /// Standard output, lossily decoded for display.
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Standard error, lossily decoded for display.
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Combined stdout and stderr, as shown in a shell transcript.
    pub fn transcript(&self) -> String {
        let mut out = self.stdout_lossy();
        let err = self.stderr_lossy();
        if !err.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&err);
        }
        out
    }
}
