//! # txfs storage
//!
//! Byte-store backends for the txfs redo log.
//!
//! A backend is an opaque, flat byte store. It knows nothing about record
//! framing or commit bits; txfs_core owns all format interpretation. Two
//! implementations are provided:
//!
//! - [`FileBackend`]: persistent storage over an OS file
//! - [`InMemoryBackend`]: `Vec`-backed double for tests and crash injection
//!
//! Backends support appending (how records enter the log), positional reads
//! (how recovery walks it), and a single positional write (how the commit bit
//! is flipped in place). `flush` pushes buffered data to the OS; `sync`
//! additionally forces it onto stable storage.

#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
