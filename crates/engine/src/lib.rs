//! Chunked, cancellable conversion engine for Pickles
//!
//! Large Base64/hex conversions run in fixed-size chunks on a background
//! worker, reporting progress after every chunk. Cancellation is checked
//! between chunks. Chunking never changes the result: converters carry
//! incomplete groups across chunk boundaries.
//!
//! ```text
//! Idle -> Running -> Completed | Cancelled | Failed
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod background;
pub mod chunk;
pub mod handle;
pub mod supervisor;
pub mod transfer;

pub use background::spawn_transfer;
pub use chunk::{Base64Decoder, Base64Encoder, ChunkConverter, HexDecoder, HexEncoder};
pub use handle::{TransferHandle, TransferOutcome};
pub use supervisor::{TransferConfig, TransferSupervisor};
pub use transfer::{
    run_transfer, CancelToken, TransferEvent, TransferJob, TransferState, DEFAULT_CHUNK_SIZE,
};
