//! Background transfer workers.
//!
//! Each chunked transfer runs on its own named thread (`pickles-transfer-N`)
//! and reports over an `mpsc` channel. The worker never touches caller state;
//! the terminal event is always the last message and the sender is dropped
//! right after it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;

use pickles_core::{ConversionError, Result};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::handle::TransferHandle;
use crate::transfer::{run_transfer, CancelToken, TransferEvent, TransferJob, TransferState};

static WORKER_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Body of a worker: drives a job and reports through `emit`.
type RunFn = fn(&TransferJob, usize, &CancelToken, &mut dyn FnMut(TransferEvent)) -> TransferState;

/// Start `job` on a new worker thread.
///
/// Fails only when the thread cannot be spawned.
pub fn spawn_transfer(job: TransferJob, chunk_size: usize) -> Result<TransferHandle> {
    spawn_worker(job, chunk_size, run_chunked)
}

fn run_chunked(
    job: &TransferJob,
    chunk_size: usize,
    cancel: &CancelToken,
    emit: &mut dyn FnMut(TransferEvent),
) -> TransferState {
    run_transfer(job, chunk_size, cancel, emit)
}

fn spawn_worker(job: TransferJob, chunk_size: usize, run: RunFn) -> Result<TransferHandle> {
    let id = Uuid::new_v4();
    let cancel = CancelToken::new();
    let (tx, rx) = mpsc::channel();
    let worker_cancel = cancel.clone();
    let n = WORKER_SEQUENCE.fetch_add(1, Ordering::Relaxed);

    let total_units = job.total_units();
    std::thread::Builder::new()
        .name(format!("pickles-transfer-{}", n))
        .spawn(move || worker_main(id, job, chunk_size, worker_cancel, tx, run))
        .map_err(|e| ConversionError::io(format!("failed to spawn transfer worker: {}", e)))?;

    debug!(target: "pickles::transfer", %id, total_units, chunk_size, "Transfer started");
    Ok(TransferHandle::new(id, cancel, rx))
}

fn worker_main(
    id: Uuid,
    job: TransferJob,
    chunk_size: usize,
    cancel: CancelToken,
    tx: mpsc::Sender<TransferEvent>,
    run: RunFn,
) {
    // A panic inside the conversion must still produce a terminal event,
    // otherwise the handle would wait forever.
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        // A dropped receiver only means nobody is listening any more.
        let mut emit = |event: TransferEvent| {
            let _ = tx.send(event);
        };
        run(&job, chunk_size, &cancel, &mut emit)
    }));

    match outcome {
        Ok(TransferState::Completed) => {
            info!(target: "pickles::transfer", %id, job = job.name(), "Transfer completed")
        }
        Ok(state) => debug!(target: "pickles::transfer", %id, ?state, "Transfer finished"),
        Err(e) => {
            let message = e
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| e.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("(non-string panic)")
                .to_string();
            error!(target: "pickles::transfer", %id, panic = %message, "Transfer worker panicked");
            let _ = tx.send(TransferEvent::Failed(ConversionError::io(format!(
                "transfer worker panicked: {}",
                message
            ))));
        }
    }
    drop(tx);
}
