//! Pending writes and their sync / abort lifecycle.

use crate::error::{StoreError, StoreResult};
use crate::handle::FileHandle;

/// One pending mutation of a handle's view.
///
/// Created by [`FileHandle::write`], which has already applied the new
/// bytes to the view. The intent holds everything needed to finish the
/// write in either direction: the payload for [`sync`], and the pre-write
/// bytes for [`abort`].
///
/// `sync` and `abort` are terminal and mutually exclusive; any call after
/// either returns [`StateViolation`]. The borrow of the handle means the
/// compiler refuses to close the handle while intents are outstanding;
/// resolve them first.
///
/// Dropping an unresolved intent leaks nothing but durability: the view
/// keeps the new bytes, the log never hears about them, and the next
/// recovery makes the file look as if the write never happened.
///
/// [`sync`]: WriteIntent::sync
/// [`abort`]: WriteIntent::abort
/// [`StateViolation`]: StoreError::StateViolation
#[derive(Debug)]
pub struct WriteIntent<'h> {
    handle: &'h FileHandle,
    offset: usize,
    new_bytes: Vec<u8>,
    old_bytes: Vec<u8>,
    synced: bool,
    aborted: bool,
}

impl<'h> WriteIntent<'h> {
    pub(crate) fn new(
        handle: &'h FileHandle,
        offset: usize,
        new_bytes: Vec<u8>,
        old_bytes: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(new_bytes.len(), old_bytes.len());
        Self {
            handle,
            offset,
            new_bytes,
            old_bytes,
            synced: false,
            aborted: false,
        }
    }

    /// Target offset of the write.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.new_bytes.len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_bytes.is_empty()
    }

    /// Whether the intent has been durably logged.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Whether the intent has been rolled back.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    fn check_live(&self) -> StoreResult<()> {
        if self.synced {
            return Err(StoreError::state_violation("write is already synced"));
        }
        if self.aborted {
            return Err(StoreError::state_violation("write is already aborted"));
        }
        Ok(())
    }

    /// Durably persists the write into the redo log.
    ///
    /// On return the write will survive any crash: the next apply replays
    /// it into the data file. Returns the number of payload bytes
    /// persisted.
    pub fn sync(&mut self) -> StoreResult<usize> {
        self.check_live()?;
        let written = self
            .handle
            .log()
            .commit_write(self.offset as i32, &self.new_bytes)?;
        self.synced = true;
        Ok(written)
    }

    /// Logs only the first `n` payload bytes, without ever committing.
    ///
    /// This produces a deliberately torn record (the header claims the
    /// full length) which the next recovery discards. The intent stays
    /// live: it can still be aborted or fully synced.
    pub fn sync_n_bytes(&mut self, n: usize) -> StoreResult<()> {
        self.check_live()?;
        if n > self.new_bytes.len() {
            return Err(StoreError::RangeInvalid {
                offset: self.offset,
                len: n,
                file_len: self.new_bytes.len(),
            });
        }
        self.handle.log().append_torn(
            self.offset as i32,
            self.new_bytes.len() as i32,
            &self.new_bytes[..n],
        )
    }

    /// Rolls the view back to its pre-write bytes.
    ///
    /// Aborting a synced write is a contract violation: the bytes are
    /// already durable and cannot be recalled.
    pub fn abort(&mut self) -> StoreResult<()> {
        if self.synced {
            return Err(StoreError::state_violation(
                "cannot abort a write that has been synced",
            ));
        }
        if self.aborted {
            return Err(StoreError::state_violation("write is already aborted"));
        }
        self.handle.restore(self.offset, &self.old_bytes)?;
        self.aborted = true;
        Ok(())
    }
}
