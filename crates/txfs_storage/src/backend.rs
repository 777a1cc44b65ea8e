//! Storage backend trait definition.

use crate::error::StorageResult;

/// A flat byte store underneath a redo log.
///
/// Backends are **opaque byte stores**: they never interpret record framing,
/// payloads, or commit bits. The log layer owns the format; a backend only
/// guarantees that bytes written at an offset read back identically.
///
/// # Invariants
///
/// - `append` returns the offset the data landed at, which equals `len()`
///   before the call
/// - `read_at` returns exactly the bytes previously written at that offset
/// - `write_at` may only touch the existing extent; it never grows the store
/// - after `sync` returns, all prior writes survive process termination
/// - backends are `Send` so a log can move across threads; interior
///   synchronization is the caller's concern (the log serializes access)
pub trait StorageBackend: Send {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`](crate::StorageError::OutOfBounds) if the range
    /// extends past the current size, or an I/O error.
    fn read_at(&mut self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Appends data at the end of the store and returns the offset it
    /// was written at.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Overwrites bytes inside the existing extent.
    ///
    /// The log uses this for exactly one purpose: rewriting a record header
    /// to flip its commit bit. The range must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`](crate::StorageError::OutOfBounds) if the range
    /// extends past the current size, or an I/O error.
    fn write_at(&mut self, offset: u64, data: &[u8]) -> StorageResult<()>;

    /// Pushes buffered writes to the operating system.
    fn flush(&mut self) -> StorageResult<()>;

    /// Forces all data onto stable storage.
    ///
    /// Stronger than `flush`: after this returns, prior writes survive a
    /// crash or power loss.
    fn sync(&mut self) -> StorageResult<()>;

    /// Returns the current size of the store in bytes.
    ///
    /// This is the offset the next `append` will write at.
    fn len(&self) -> StorageResult<u64>;

    /// Returns whether the store is empty.
    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Truncates the store to `new_size` bytes.
    ///
    /// Used by coarse log maintenance to drop record bytes from the tail.
    /// `new_size` must not exceed the current size.
    fn truncate(&mut self, new_size: u64) -> StorageResult<()>;
}
