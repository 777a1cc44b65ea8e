//! Redo-log writer: the append / flush / commit-bit / flush protocol.

use crate::error::StoreResult;
use crate::log::record::RecordHeader;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::debug;
use txfs_storage::{FileBackend, StorageBackend};

/// The redo log of one data file.
///
/// The log file is created lazily on the first append, so a handle that
/// never syncs never leaves a log behind. All protocol steps for one record
/// run under a single mutex hold: interleaving two appends, or an append
/// with a commit-bit flip, would corrupt the framing that recovery depends
/// on.
pub struct RedoLog {
    path: PathBuf,
    backend: Mutex<Option<Box<dyn StorageBackend>>>,
}

impl RedoLog {
    /// Creates a writer for the log at `path` without touching the disk.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            backend: Mutex::new(None),
        }
    }

    /// Creates a writer over a caller-supplied backend.
    ///
    /// Tests and the crash harness use this to interpose failure injection;
    /// the path is only reported, never opened.
    #[must_use]
    pub fn with_backend(path: PathBuf, backend: Box<dyn StorageBackend>) -> Self {
        Self {
            path,
            backend: Mutex::new(Some(backend)),
        }
    }

    /// Returns the log file's path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durably appends one write as a committed record.
    ///
    /// Ordering is the crash-safety contract:
    ///
    /// 1. append the header with the commit bit clear, then the payload
    /// 2. force both to stable storage
    /// 3. rewrite the header in place with the commit bit set
    /// 4. force again
    ///
    /// A crash before step 4 completes leaves at worst a tentative record,
    /// which recovery discards; after it, the record replays. Returns the
    /// number of payload bytes persisted.
    pub fn commit_write(&self, offset: i32, payload: &[u8]) -> StoreResult<usize> {
        let mut guard = self.backend.lock();
        let backend = Self::open_backend(&self.path, &mut guard)?;

        let header = RecordHeader::tentative(offset, payload.len() as i32);
        let position = backend.append(&header.encode())?;
        backend.append(payload)?;
        backend.sync()?;

        backend.write_at(position, &header.as_committed().encode())?;
        backend.sync()?;

        debug!(
            log = %self.path.display(),
            offset,
            len = payload.len(),
            "committed record"
        );
        Ok(payload.len())
    }

    /// Appends a deliberately torn record: a header claiming `full_length`
    /// payload bytes followed by only `prefix`, synced but never committed.
    ///
    /// Recovery treats the result as a torn tail and discards it. This is a
    /// maintenance/testing primitive, not a durability operation.
    pub fn append_torn(&self, offset: i32, full_length: i32, prefix: &[u8]) -> StoreResult<()> {
        let mut guard = self.backend.lock();
        let backend = Self::open_backend(&self.path, &mut guard)?;

        let header = RecordHeader::tentative(offset, full_length);
        backend.append(&header.encode())?;
        backend.append(prefix)?;
        backend.sync()?;
        Ok(())
    }

    fn open_backend<'a>(
        path: &Path,
        guard: &'a mut Option<Box<dyn StorageBackend>>,
    ) -> StoreResult<&'a mut Box<dyn StorageBackend>> {
        let backend: Box<dyn StorageBackend> = match guard.take() {
            Some(backend) => backend,
            None => Box::new(FileBackend::open(path)?),
        };
        Ok(guard.insert(backend))
    }
}

impl std::fmt::Debug for RedoLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedoLog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
