//! Error types for the transactional file store.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Storage backend error inside the log layer.
    #[error("storage error: {0}")]
    Storage(#[from] txfs_storage::StorageError),

    /// Filename exceeds the 255-byte limit.
    #[error("filename too long: {name:?} is {len} bytes, limit is {limit}")]
    NameTooLong {
        /// The offending name.
        name: String,
        /// Its length in bytes.
        len: usize,
        /// The enforced limit.
        limit: usize,
    },

    /// Filename is structurally unusable.
    #[error("invalid filename {name:?}: {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Open requested a length smaller than the on-disk size.
    #[error("cannot shrink file: requested {requested} bytes, on disk {on_disk}")]
    ShrinkRejected {
        /// The length passed to open.
        requested: u64,
        /// The existing file size.
        on_disk: u64,
    },

    /// A read, write, or partial sync fell outside the valid range.
    #[error("range out of bounds: offset {offset}, len {len}, file length {file_len}")]
    RangeInvalid {
        /// Requested offset.
        offset: usize,
        /// Requested length.
        len: usize,
        /// The file's length.
        file_len: usize,
    },

    /// Remove was called while the handle's mapping is still live.
    #[error("cannot remove a file that is still open")]
    RemoveOpenRejected,

    /// An intent was used after reaching a terminal state, or a synced
    /// intent was aborted.
    #[error("state violation: {message}")]
    StateViolation {
        /// What was attempted.
        message: String,
    },

    /// A non-blocking lock acquisition found the file held elsewhere.
    #[error("file is locked by another handle: {path}")]
    FileLocked {
        /// The contended data file.
        path: PathBuf,
    },

    /// I/O was attempted through a handle that has been closed.
    #[error("handle is closed")]
    HandleClosed,
}

impl StoreError {
    /// Creates a state-violation error.
    pub fn state_violation(message: impl Into<String>) -> Self {
        Self::StateViolation {
            message: message.into(),
        }
    }

    /// Creates an invalid-name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
