//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A positional access fell outside the store's current extent.
    #[error("access beyond end of store: offset {offset}, len {len}, size {size}")]
    OutOfBounds {
        /// The requested offset.
        offset: u64,
        /// The requested length.
        len: usize,
        /// The current store size.
        size: u64,
    },

    /// A write was cut short by injected failure (testkit only).
    #[error("write truncated after {written} of {requested} bytes")]
    ShortWrite {
        /// Bytes actually written.
        written: usize,
        /// Bytes requested.
        requested: usize,
    },
}
