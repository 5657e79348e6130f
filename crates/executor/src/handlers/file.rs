//! ImportFile and ExportFile handlers.

use std::fs;
use std::path::{Path, PathBuf};

use pickles_bridge::{SerializationEngine, PICKLE_EXTENSION};
use pickles_core::{ConversionError, Limits, ModuleVariant, Payload, Result};
use tracing::{debug, warn};

/// `path` with `.pkl` appended when it has no extension.
pub fn with_pickle_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(PICKLE_EXTENSION)
    }
}

/// Read raw pickle bytes from `path` and deserialize them.
///
/// The size limit is checked against file metadata before reading.
pub fn import_file<E: SerializationEngine + ?Sized>(
    engine: &E,
    limits: &Limits,
    path: &Path,
    variant: ModuleVariant,
) -> Result<Payload> {
    let metadata = fs::metadata(path).map_err(|e| read_error(path, e))?;
    if !metadata.is_file() {
        return Err(ConversionError::io(format!(
            "'{}' is not a regular file",
            path.display()
        )));
    }
    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    limits.validate_input_len(size)?;

    let bytes = fs::read(path).map_err(|e| read_error(path, e))?;
    // The file may have grown since the metadata check.
    limits.validate_input_len(bytes.len())?;

    let text = engine.deserialize(&bytes, variant).map_err(|e| {
        warn!(target: "pickles::session", path = %path.display(), error = e.kind_name(), "Import failed");
        e
    })?;
    debug!(target: "pickles::session", path = %path.display(), bytes = bytes.len(), "Imported pickle file");
    Ok(Payload::new(bytes, text))
}

/// Serialize `payload`'s text and write the pickle bytes.
///
/// Returns the path actually written (with `.pkl` applied) and the byte
/// count. Nothing is written when serialization fails.
pub fn export_file<E: SerializationEngine + ?Sized>(
    engine: &E,
    limits: &Limits,
    path: &Path,
    payload: &Payload,
    variant: ModuleVariant,
) -> Result<(PathBuf, usize)> {
    limits.validate_input_len(payload.len())?;
    let text = payload.text_or_utf8()?;
    if text.trim().is_empty() {
        return Err(ConversionError::mode_mismatch(
            "no input data provided, enter data to export",
        ));
    }

    let target = with_pickle_extension(path);
    let bytes = engine.serialize(text, variant)?;
    fs::write(&target, &bytes).map_err(|e| {
        ConversionError::io(format!("failed to write '{}': {}", target.display(), e))
    })?;
    debug!(target: "pickles::session", path = %target.display(), bytes = bytes.len(), "Exported pickle file");
    Ok((target, bytes.len()))
}

fn read_error(path: &Path, e: std::io::Error) -> ConversionError {
    ConversionError::io(format!("failed to read '{}': {}", path.display(), e))
}
