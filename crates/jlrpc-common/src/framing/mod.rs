//! jlrpc Line Framing
//!
//! The framing layer sits between raw byte streams and the protocol object
//! model. Frames are JSON Lines records: one JSON document terminated by one
//! LF byte. CR is never a frame delimiter (a CR inside a JSON string escape
//! is the JSON layer's business).
//!
//! # Components
//!
//! - **[`LineReader`]**: a fixed-capacity buffered extractor of complete
//!   lines from a (possibly non-blocking) reader. Supports *single mode*
//!   (one frame per call, used by the blocking client) and *drain mode*
//!   (every frame available before the next would-block, used by the server
//!   reactor).
//! - **[`WriteQueue`]**: pre-serialized outgoing frames flushed with
//!   vectored writes, resumable across readiness events after partial
//!   writes.
//!
//! Would-block never surfaces as an error from this layer: readers report
//! "no frame yet" and the write queue reports "pending" instead.

pub mod line_reader;
pub mod write_queue;

pub use line_reader::{Drained, LineReader, DEFAULT_READ_BUFFER_SIZE};
pub use write_queue::WriteQueue;
