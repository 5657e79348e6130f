//! Scratch directory and per-request scratch files.
//!
//! Every request writes to `<working_dir>/<request-id>.pkl`, so concurrent
//! imports and exports never share a path. The file is removed when its
//! [`ScratchFile`] guard drops.

use std::fs;
use std::path::{Path, PathBuf};

use pickles_core::{ConversionError, Result};
use tracing::{debug, warn};
use uuid::Uuid;

/// Extension used for scratch and exported files.
pub const PICKLE_EXTENSION: &str = "pkl";

/// Create `dir` (and parents) if it does not exist.
///
/// # Errors
///
/// `ExternalProcessFailure`, since no interpreter may be launched without it.
pub fn ensure_working_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        ConversionError::external(format!(
            "failed to create working directory '{}': {}",
            dir.display(),
            e
        ))
    })
}

/// A uniquely named file handed to the interpreter, deleted on drop.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    request_id: Uuid,
}

impl ScratchFile {
    /// Write `bytes` to a fresh file in `dir`.
    pub fn create(dir: &Path, bytes: &[u8]) -> Result<Self> {
        let request_id = Uuid::new_v4();
        let path = dir.join(format!("{}.{}", request_id, PICKLE_EXTENSION));
        fs::write(&path, bytes).map_err(|e| {
            ConversionError::external(format!(
                "failed to write scratch file '{}': {}",
                path.display(),
                e
            ))
        })?;
        debug!(target: "pickles::bridge", %request_id, len = bytes.len(), "Scratch file written");
        Ok(Self { path, request_id })
    }

    /// Location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Identifier the file name is derived from.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(
                target: "pickles::bridge",
                path = ?self.path,
                error = %e,
                "Failed to remove scratch file"
            );
        }
    }
}
