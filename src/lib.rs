//! Pickles - convert text to and from Python pickle data
//!
//! Payloads move between Base64, hex, UTF-8/16, ASCII, Latin-1 and the
//! escaped `\xNN` byte-string notation. Pickling itself is delegated to an
//! external interpreter; everything else runs in-process.
//!
//! # Quick Start
//!
//! ```ignore
//! use pickles::{EncodingKind, Mode, Payload, PicklesConfig, Session};
//!
//! let mut session = Session::from_config(&PicklesConfig::default())?;
//!
//! // Deserialize mode with auto-detection is the starting state
//! let hello = session.convert(&Payload::from_text("SGVsbG8="))?;
//! assert_eq!(hello.text.as_deref(), Some("Hello"));
//!
//! // Pickle through the interpreter, rendered as escaped bytes
//! session.set_mode(Mode::Serialize);
//! session.set_encoding(EncodingKind::ByteString)?;
//! let pickled = session.convert(&Payload::from_text("hello"))?;
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Session`] or the stateless [`Executor`].
//! Codecs, the interpreter bridge and the chunked transfer engine live in
//! internal crates; only the executor API is re-exported here.

// Re-export the public API from pickles-executor
pub use pickles_executor::*;
