//! Caller side of a running transfer.

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use pickles_core::{ConversionError, Payload};
use uuid::Uuid;

use crate::transfer::{CancelToken, TransferEvent, TransferState};

/// How a transfer ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    /// Finished with this payload.
    Completed(Payload),
    /// Cancelled before finishing.
    Cancelled,
    /// Failed with this error.
    Failed(ConversionError),
}

/// Owner of a running transfer's event stream.
///
/// The handle's state is derived from the events it has received, so it only
/// advances as the caller consumes events. Dropping the handle cancels the
/// transfer.
#[derive(Debug)]
pub struct TransferHandle {
    id: Uuid,
    cancel: CancelToken,
    events: Receiver<TransferEvent>,
    state: TransferState,
}

impl TransferHandle {
    pub(crate) fn new(id: Uuid, cancel: CancelToken, events: Receiver<TransferEvent>) -> Self {
        Self {
            id,
            cancel,
            events,
            state: TransferState::Idle,
        }
    }

    /// Unique id of this transfer.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// State as of the last received event.
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Request cooperative cancellation.
    ///
    /// Takes effect before the next chunk; a transfer that already finished
    /// keeps its result.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub(crate) fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Next event if one is ready.
    pub fn try_next(&mut self) -> Option<TransferEvent> {
        if self.state.is_terminal() {
            return None;
        }
        match self.events.try_recv() {
            Ok(event) => Some(self.observe(event)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.observe(lost_worker())),
        }
    }

    /// Block for the next event. `None` once the terminal event was seen.
    pub fn next_event(&mut self) -> Option<TransferEvent> {
        if self.state.is_terminal() {
            return None;
        }
        let event = self.events.recv().unwrap_or_else(|_| lost_worker());
        Some(self.observe(event))
    }

    /// Block up to `timeout` for the next event.
    pub fn next_event_timeout(&mut self, timeout: Duration) -> Option<TransferEvent> {
        if self.state.is_terminal() {
            return None;
        }
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(self.observe(event)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(self.observe(lost_worker())),
        }
    }

    /// Consume events until the transfer ends.
    pub fn wait(mut self) -> TransferOutcome {
        let mut last = None;
        while let Some(event) = self.next_event() {
            last = Some(event);
        }
        match last {
            Some(TransferEvent::Completed(payload)) => TransferOutcome::Completed(payload),
            Some(TransferEvent::Failed(e)) => TransferOutcome::Failed(e),
            Some(TransferEvent::Cancelled) => TransferOutcome::Cancelled,
            // Already terminal before wait was called.
            _ => match self.state {
                TransferState::Cancelled => TransferOutcome::Cancelled,
                _ => TransferOutcome::Failed(ConversionError::io("transfer outcome already consumed")),
            },
        }
    }

    fn observe(&mut self, event: TransferEvent) -> TransferEvent {
        self.state = event.state();
        event
    }
}

impl Drop for TransferHandle {
    fn drop(&mut self) {
        if !self.state.is_terminal() {
            self.cancel.cancel();
        }
    }
}

fn lost_worker() -> TransferEvent {
    TransferEvent::Failed(ConversionError::io(
        "transfer worker exited without a result",
    ))
}
