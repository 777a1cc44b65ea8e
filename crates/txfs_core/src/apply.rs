//! The apply engine: replaying redo logs into data files.
//!
//! Apply is the only writer of data files. Every durable byte travels
//! write → log → apply; the handle's view never touches the disk image.
//! Removing the log file is the signal that a replay has been made durable:
//! if anything fails before that point the log survives intact, and because
//! replay overwrites the same offsets with the same bytes, retrying is
//! idempotent.

use crate::dir::StoreDir;
use crate::error::{StoreError, StoreResult};
use crate::log::RecordIterator;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;
use txfs_storage::FileBackend;

/// Replays the log at `log_path` into the data file at `data_path`.
///
/// With `lock_already_held = false` (standalone apply, as [`clean`] runs
/// it) the data file's exclusive lock is taken non-blocking; a live handle
/// elsewhere yields [`FileLocked`] and the log is left untouched. Open and
/// close pass `true`: they already hold the lock on their own descriptor.
///
/// Committed records are written at their target offsets in append order;
/// tentative records are skipped. After a full replay the data file is
/// fsynced and the log removed. A missing log is not an error; there is
/// simply nothing to recover.
///
/// [`FileLocked`]: StoreError::FileLocked
pub fn apply_file(data_path: &Path, log_path: &Path, lock_already_held: bool) -> StoreResult<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let mut data_file = OpenOptions::new().read(true).write(true).open(data_path)?;

    if !lock_already_held && data_file.try_lock_exclusive().is_err() {
        return Err(StoreError::FileLocked {
            path: data_path.to_path_buf(),
        });
    }

    let mut log = FileBackend::open(log_path)?;
    let mut replayed = 0usize;
    let mut skipped = 0usize;

    for record in RecordIterator::new(&mut log)? {
        let record = record?;
        if !record.header.is_committed() {
            skipped += 1;
            continue;
        }
        data_file.seek(SeekFrom::Start(record.header.offset as u64))?;
        data_file.write_all(&record.payload)?;
        replayed += 1;
    }

    data_file.sync_all()?;
    drop(data_file);
    drop(log);

    // The durable-replay signal. Everything up to here can be retried.
    fs::remove_file(log_path)?;

    debug!(
        file = %data_path.display(),
        replayed,
        skipped,
        "log applied and removed"
    );
    Ok(())
}

/// Applies every pending log in the managed directory.
///
/// Stops at the first failure; the failing log and all later ones stay in
/// place so a subsequent call can make progress.
pub fn clean(dir: &StoreDir) -> StoreResult<()> {
    for name in dir.log_entries()? {
        apply_file(&dir.data_path(&name)?, &dir.log_path(&name)?, false)?;
    }
    Ok(())
}

/// Shrinks every pending log by `n` bytes from the tail.
///
/// A log shorter than `n` bytes is removed outright. This is coarse
/// maintenance for bounded-log deployments: the truncated records lose any
/// durability they had, exactly as if their syncs had never finished.
pub fn clean_n_bytes(dir: &StoreDir, n: u64) -> StoreResult<()> {
    for name in dir.log_entries()? {
        let log_path = dir.log_path(&name)?;
        let len = fs::metadata(&log_path)?.len();
        if len < n {
            fs::remove_file(&log_path)?;
            debug!(log = %log_path.display(), "log shorter than trim size, removed");
        } else {
            let file = OpenOptions::new().write(true).open(&log_path)?;
            file.set_len(len - n)?;
            file.sync_all()?;
        }
    }
    Ok(())
}
