//! Per-file redo log: framing, streaming parse, and the commit protocol.
//!
//! Every durable write travels through a redo log that sits next to its data
//! file. The log is an append-only sequence of records:
//!
//! ```text
//! | offset (i32) | length (i32) | committed (i32) | payload (length bytes) |
//! ```
//!
//! All header fields are little-endian, fixed for the lifetime of a store so
//! a later process can parse records written by an earlier one.
//!
//! ## Commit discipline
//!
//! A record is appended with `committed = 0`, forced to stable storage, then
//! its header is rewritten in place with `committed = 1` and forced again.
//! The commit bit is the only in-place mutation the format allows. A crash
//! at any point leaves either no trace, a tentative record, or a committed
//! record, never a half-committed one that replays partial data.
//!
//! ## Recovery policy
//!
//! The parser treats the following as a clean end of log and stops at the
//! last complete record:
//!
//! - fewer than 12 bytes remaining (torn header)
//! - a header whose payload extends past the end of the log (torn payload)
//! - a header with a negative offset or length (torn or scribbled header)
//!
//! None of these are errors: they are exactly what a crash mid-append leaves
//! behind, and the records before them are intact by construction. A
//! `committed` value other than 1, including a torn commit bit, marks the
//! record tentative, and tentative payloads are never replayed.

mod iterator;
mod record;
mod writer;

pub use iterator::{LogRecord, RecordIterator};
pub use record::{RecordHeader, COMMITTED, HEADER_SIZE, TENTATIVE};
pub use writer::RedoLog;
