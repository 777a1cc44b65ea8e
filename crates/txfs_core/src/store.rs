//! The store session: entry point bound to one managed directory.

use crate::apply;
use crate::config::Config;
use crate::dir::StoreDir;
use crate::error::{StoreError, StoreResult};
use crate::handle::FileHandle;
use std::fs;
use std::path::Path;
use tracing::debug;

/// A store session over a managed directory.
///
/// The session itself is stateless beyond its paths and configuration: it
/// keeps no registry of open handles, and several sessions over the same
/// directory (in the same or different processes) coexist safely; the
/// per-file exclusive locks do the arbitration.
///
/// # Example
///
/// ```no_run
/// use txfs_core::Store;
///
/// # fn main() -> txfs_core::StoreResult<()> {
/// let store = Store::open("data")?;
/// let file = store.open_file("t1", 100)?;
///
/// let mut write = file.write(10, b"hello")?;
/// write.sync()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Store {
    dir: StoreDir,
    config: Config,
}

impl Store {
    /// Opens a store with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a store with an explicit configuration.
    pub fn open_with_config(path: impl AsRef<Path>, config: Config) -> StoreResult<Self> {
        let dir = StoreDir::open(path.as_ref(), config.create_if_missing)?;
        debug!(root = %dir.root().display(), "store session opened");
        Ok(Self { dir, config })
    }

    /// Returns the managed directory's path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.root()
    }

    /// Opens or creates a data file of `length` bytes.
    ///
    /// Acquires the file's exclusive lock (blocking unless configured
    /// otherwise), recovers any pending log, and maps the result. A
    /// `length` of zero adopts the existing on-disk size.
    pub fn open_file(&self, name: &str, length: u64) -> StoreResult<FileHandle> {
        FileHandle::open(&self.dir, name, length, &self.config)
    }

    /// Gracefully closes a handle: applies its pending log, then releases
    /// the mapping and the lock.
    pub fn close_file(&self, handle: &mut FileHandle) -> StoreResult<()> {
        handle.close()
    }

    /// Removes a file's on-disk state.
    ///
    /// The handle must have been closed first; a live mapping rejects the
    /// removal. The data file is removed and the log best-effort removed;
    /// a log without its data file is unrecoverable noise.
    pub fn remove_file(&self, handle: &FileHandle) -> StoreResult<()> {
        if handle.is_open() {
            return Err(StoreError::RemoveOpenRejected);
        }
        fs::remove_file(handle.data_path())?;
        let _ = fs::remove_file(handle.log().path());
        debug!(file = %handle.data_path().display(), "file removed");
        Ok(())
    }

    /// Applies every pending log in the directory.
    ///
    /// Equivalent to the recovery that open performs per file, run for the
    /// whole store. Stops at the first failure, leaving the remaining logs
    /// for a later attempt.
    pub fn clean(&self) -> StoreResult<()> {
        debug!(root = %self.path().display(), "clean started");
        apply::clean(&self.dir)
    }

    /// Trims `n` bytes off the tail of every pending log.
    ///
    /// Records that straddle the cut lose their durability; see
    /// [`apply::clean_n_bytes`].
    pub fn clean_n_bytes(&self, n: u64) -> StoreResult<()> {
        apply::clean_n_bytes(&self.dir, n)
    }
}
