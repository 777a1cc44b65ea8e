//! Open-file handles: lock, mapping, and the in-memory view.

use crate::apply;
use crate::config::Config;
use crate::dir::StoreDir;
use crate::error::{StoreError, StoreResult};
use crate::intent::WriteIntent;
use crate::log::RedoLog;
use fs2::FileExt;
use memmap2::{MmapMut, MmapOptions};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use tracing::debug;

/// An opened data file.
///
/// The handle owns three resources with identical lifetimes:
///
/// - the data file's descriptor, which carries the advisory exclusive lock
///   (at most one handle per file across all processes);
/// - a copy-on-write memory map of the file, the handle's in-memory view;
/// - the file's redo log writer.
///
/// The view is process-private: mutating it never writes the data file. The
/// data file on disk changes only when the apply engine replays committed
/// log records: on open, on close, and on [`Store::clean`]. Because of
/// that, dropping a handle without calling [`close`] is indistinguishable
/// from a crash: unsynced view mutations evaporate, synced records wait in
/// the log for the next open.
///
/// Concurrent use from several threads is safe; the view sits behind a
/// mutex, so overlapping writes serialize in an unspecified order.
///
/// [`Store::clean`]: crate::Store::clean
/// [`close`]: FileHandle::close
#[derive(Debug)]
pub struct FileHandle {
    name: String,
    data_path: PathBuf,
    length: usize,
    /// Kept open for the handle's lifetime; dropping it releases the lock.
    file: Option<File>,
    map: Mutex<Option<MmapMut>>,
    log: RedoLog,
}

impl FileHandle {
    /// Opens or creates `name` inside the managed directory.
    ///
    /// Steps, in contract order: validate the name, open-or-create, lock,
    /// size, recover any pending log through stream I/O, then map. The
    /// mapping is created last so it only ever observes fully recovered
    /// bytes.
    pub(crate) fn open(
        dir: &StoreDir,
        name: &str,
        length: u64,
        config: &Config,
    ) -> StoreResult<Self> {
        let data_path = dir.data_path(name)?;
        let log_path = dir.log_path(name)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&data_path)?;

        if config.blocking_open {
            file.lock_exclusive()?;
        } else if file.try_lock_exclusive().is_err() {
            return Err(StoreError::FileLocked { path: data_path });
        }

        let on_disk = file.metadata()?.len();
        let resolved = Self::resolve_length(length, on_disk)?;
        if resolved > on_disk {
            file.set_len(resolved)?;
        }

        if log_path.exists() {
            debug!(file = %data_path.display(), "pending log found, recovering before map");
            apply::apply_file(&data_path, &log_path, true)?;
        }

        // Copy-on-write mapping: the view is private to this process and
        // page write-back can never push unsynced bytes into the data file.
        let map = unsafe { MmapOptions::new().len(resolved as usize).map_copy(&file)? };

        Ok(Self {
            name: name.to_string(),
            data_path,
            length: resolved as usize,
            file: Some(file),
            map: Mutex::new(Some(map)),
            log: RedoLog::new(log_path),
        })
    }

    /// Applies the open-time sizing rules.
    ///
    /// Zero requested length adopts the existing size; shrinking is
    /// rejected; the result must fit the log's signed 32-bit addressing.
    fn resolve_length(requested: u64, on_disk: u64) -> StoreResult<u64> {
        let resolved = if requested == 0 { on_disk } else { requested };
        if resolved == 0 {
            return Err(StoreError::RangeInvalid {
                offset: 0,
                len: 0,
                file_len: 0,
            });
        }
        if requested != 0 && requested < on_disk {
            return Err(StoreError::ShrinkRejected {
                requested,
                on_disk,
            });
        }
        if resolved > i32::MAX as u64 {
            return Err(StoreError::RangeInvalid {
                offset: 0,
                len: resolved as usize,
                file_len: i32::MAX as usize,
            });
        }
        Ok(resolved)
    }

    /// Returns the caller-supplied file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the file length fixed at open.
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Whether the handle still holds its mapping (i.e. has not been
    /// closed).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.map.lock().is_some()
    }

    fn check_range(&self, offset: usize, len: usize) -> StoreResult<()> {
        let end = offset.checked_add(len);
        if end.is_none() || end.is_some_and(|e| e > self.length) {
            return Err(StoreError::RangeInvalid {
                offset,
                len,
                file_len: self.length,
            });
        }
        Ok(())
    }

    /// Copies `len` bytes starting at `offset` out of the view.
    ///
    /// Reads never block on pending intents; they see the view as it is,
    /// including unsynced mutations made through this handle.
    pub fn read(&self, offset: usize, len: usize) -> StoreResult<Vec<u8>> {
        self.check_range(offset, len)?;
        let guard = self.map.lock();
        let map = guard.as_ref().ok_or(StoreError::HandleClosed)?;
        Ok(map[offset..offset + len].to_vec())
    }

    /// Stages a write of `bytes` at `offset`.
    ///
    /// The view is mutated immediately; durability requires syncing the
    /// returned intent. The pre-write bytes are captured first so the
    /// intent can roll the view back on abort.
    pub fn write(&self, offset: usize, bytes: &[u8]) -> StoreResult<WriteIntent<'_>> {
        self.check_range(offset, bytes.len())?;
        let mut guard = self.map.lock();
        let map = guard.as_mut().ok_or(StoreError::HandleClosed)?;

        let old_bytes = map[offset..offset + bytes.len()].to_vec();
        map[offset..offset + bytes.len()].copy_from_slice(bytes);

        Ok(WriteIntent::new(self, offset, bytes.to_vec(), old_bytes))
    }

    /// Restores pre-write bytes into the view (abort path).
    pub(crate) fn restore(&self, offset: usize, bytes: &[u8]) -> StoreResult<()> {
        let mut guard = self.map.lock();
        let map = guard.as_mut().ok_or(StoreError::HandleClosed)?;
        map[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Returns the handle's redo log.
    pub(crate) fn log(&self) -> &RedoLog {
        &self.log
    }

    pub(crate) fn data_path(&self) -> &PathBuf {
        &self.data_path
    }

    /// Gracefully closes the handle.
    ///
    /// Applies any pending log while the lock is still held, then drops the
    /// mapping and finally the descriptor (which releases the lock). After
    /// close, the on-disk file equals what a fresh open would observe.
    pub fn close(&mut self) -> StoreResult<()> {
        if self.file.is_none() {
            return Err(StoreError::HandleClosed);
        }

        if self.log.path().exists() {
            apply::apply_file(&self.data_path, self.log.path(), true)?;
        }

        // Unmap before releasing the lock.
        *self.map.lock() = None;
        self.file = None;
        debug!(file = %self.data_path.display(), "handle closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_dir(path: &std::path::Path) -> StoreDir {
        StoreDir::open(path, true).unwrap()
    }

    #[test]
    fn open_creates_and_zero_fills() {
        let temp = tempdir().unwrap();
        let dir = open_dir(temp.path());

        let handle = FileHandle::open(&dir, "t1", 64, &Config::default()).unwrap();
        assert_eq!(handle.length(), 64);
        assert_eq!(handle.read(0, 64).unwrap(), vec![0u8; 64]);
        assert_eq!(std::fs::metadata(temp.path().join("t1")).unwrap().len(), 64);
    }

    #[test]
    fn shrink_rejected() {
        let temp = tempdir().unwrap();
        let dir = open_dir(temp.path());

        let mut handle = FileHandle::open(&dir, "t1", 100, &Config::default()).unwrap();
        handle.close().unwrap();

        let result = FileHandle::open(&dir, "t1", 50, &Config::default());
        assert!(matches!(result, Err(StoreError::ShrinkRejected { .. })));
    }

    #[test]
    fn grow_on_reopen() {
        let temp = tempdir().unwrap();
        let dir = open_dir(temp.path());

        let mut handle = FileHandle::open(&dir, "t1", 50, &Config::default()).unwrap();
        handle.close().unwrap();

        let handle = FileHandle::open(&dir, "t1", 80, &Config::default()).unwrap();
        assert_eq!(handle.length(), 80);
    }

    #[test]
    fn zero_length_adopts_existing_size() {
        let temp = tempdir().unwrap();
        let dir = open_dir(temp.path());

        let mut handle = FileHandle::open(&dir, "t1", 70, &Config::default()).unwrap();
        handle.close().unwrap();

        let handle = FileHandle::open(&dir, "t1", 0, &Config::default()).unwrap();
        assert_eq!(handle.length(), 70);
    }

    #[test]
    fn zero_length_new_file_rejected() {
        let temp = tempdir().unwrap();
        let dir = open_dir(temp.path());

        let result = FileHandle::open(&dir, "t1", 0, &Config::default());
        assert!(matches!(result, Err(StoreError::RangeInvalid { .. })));
    }

    #[test]
    fn out_of_range_io_rejected() {
        let temp = tempdir().unwrap();
        let dir = open_dir(temp.path());
        let handle = FileHandle::open(&dir, "t1", 50, &Config::default()).unwrap();

        assert!(matches!(
            handle.read(40, 20),
            Err(StoreError::RangeInvalid { .. })
        ));
        assert!(matches!(
            handle.write(40, &[0u8; 20]),
            Err(StoreError::RangeInvalid { .. })
        ));
        assert!(handle.read(40, 10).is_ok());
    }

    #[test]
    fn write_mutates_view_not_disk() {
        let temp = tempdir().unwrap();
        let dir = open_dir(temp.path());
        let handle = FileHandle::open(&dir, "t1", 32, &Config::default()).unwrap();

        let intent = handle.write(4, b"abcd").unwrap();
        drop(intent);
        assert_eq!(handle.read(4, 4).unwrap(), b"abcd");

        // The data file itself is untouched until apply runs.
        let on_disk = std::fs::read(temp.path().join("t1")).unwrap();
        assert_eq!(&on_disk[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn second_open_blocked_while_held() {
        let temp = tempdir().unwrap();
        let dir = open_dir(temp.path());
        let config = Config::default().blocking_open(false);

        let handle = FileHandle::open(&dir, "t1", 50, &config).unwrap();
        let result = FileHandle::open(&dir, "t1", 50, &config);
        assert!(matches!(result, Err(StoreError::FileLocked { .. })));
        drop(handle);

        // Released on drop.
        assert!(FileHandle::open(&dir, "t1", 50, &config).is_ok());
    }

    #[test]
    fn close_is_terminal() {
        let temp = tempdir().unwrap();
        let dir = open_dir(temp.path());
        let mut handle = FileHandle::open(&dir, "t1", 50, &Config::default()).unwrap();

        handle.close().unwrap();
        assert!(!handle.is_open());
        assert!(matches!(handle.read(0, 1), Err(StoreError::HandleClosed)));
        assert!(matches!(handle.close(), Err(StoreError::HandleClosed)));
    }
}
