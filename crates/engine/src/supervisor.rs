//! Single-flight transfer supervision.
//!
//! At most one transfer is active per supervisor. Starting another cancels
//! the previous one, which then reports `Cancelled` unless it had already
//! finished.

use parking_lot::Mutex;
use pickles_core::Result;
use tracing::debug;
use uuid::Uuid;

use crate::background::spawn_transfer;
use crate::handle::TransferHandle;
use crate::transfer::{CancelToken, TransferJob, DEFAULT_CHUNK_SIZE};

/// Chunked transfer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConfig {
    /// Units per chunk.
    pub chunk_size: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

struct ActiveTransfer {
    id: Uuid,
    cancel: CancelToken,
}

/// Tracks the active transfer and enforces single-flight.
pub struct TransferSupervisor {
    config: TransferConfig,
    active: Mutex<Option<ActiveTransfer>>,
}

impl TransferSupervisor {
    /// Create a supervisor with no active transfer.
    pub fn new(config: TransferConfig) -> Self {
        Self {
            config,
            active: Mutex::new(None),
        }
    }

    /// The configured chunk settings.
    pub fn config(&self) -> TransferConfig {
        self.config
    }

    /// Start `job`, superseding any active transfer.
    pub fn start(&self, job: TransferJob) -> Result<TransferHandle> {
        let mut active = self.active.lock();
        if let Some(previous) = active.take() {
            debug!(target: "pickles::transfer", superseded = %previous.id, "Cancelling previous transfer");
            previous.cancel.cancel();
        }
        let handle = spawn_transfer(job, self.config.chunk_size)?;
        *active = Some(ActiveTransfer {
            id: handle.id(),
            cancel: handle.cancel_token().clone(),
        });
        Ok(handle)
    }

    /// Cancel `handle`'s transfer and stop tracking it if it is the active one.
    pub fn cancel(&self, handle: &TransferHandle) {
        handle.cancel();
        let mut active = self.active.lock();
        if active.as_ref().map_or(false, |a| a.id == handle.id()) {
            *active = None;
        }
    }

    /// Id of the active transfer, if any.
    pub fn active_id(&self) -> Option<Uuid> {
        self.active.lock().as_ref().map(|a| a.id)
    }
}

impl Default for TransferSupervisor {
    fn default() -> Self {
        Self::new(TransferConfig::default())
    }
}

impl std::fmt::Debug for TransferSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferSupervisor")
            .field("config", &self.config)
            .field("active", &self.active_id())
            .finish()
    }
}
