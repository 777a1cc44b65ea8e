//! Crash injection for the sync protocol.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use txfs_storage::{StorageBackend, StorageError, StorageResult};

/// Shared control surface for a [`CrashableBackend`].
///
/// The backend is boxed away inside a `RedoLog`, so tests keep this handle
/// to pull the plug from outside.
#[derive(Debug)]
pub struct CrashControl {
    /// Bytes of write the backend will still accept. `usize::MAX` means
    /// unlimited.
    budget: AtomicUsize,
    /// When set, `sync` fails instead of reaching stable storage.
    fail_on_sync: AtomicBool,
}

impl CrashControl {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            budget: AtomicUsize::new(usize::MAX),
            fail_on_sync: AtomicBool::new(false),
        })
    }

    /// Lets `bytes` more bytes through, then cuts every later write short.
    pub fn crash_after(&self, bytes: usize) {
        self.budget.store(bytes, Ordering::SeqCst);
    }

    /// Makes subsequent `sync` calls fail.
    pub fn fail_on_sync(&self, fail: bool) {
        self.fail_on_sync.store(fail, Ordering::SeqCst);
    }

    /// Lifts all injected failures.
    pub fn heal(&self) {
        self.budget.store(usize::MAX, Ordering::SeqCst);
        self.fail_on_sync.store(false, Ordering::SeqCst);
    }
}

/// A storage backend that dies mid-write on command.
///
/// Writes consume a byte budget; once it runs out, the write lands only as
/// a prefix and errors; the on-"disk" state is exactly what a kernel that
/// lost power mid-`write(2)` would leave. Combined with a real
/// `FileBackend` underneath, this manufactures torn headers, torn
/// payloads, and torn commit bits for the recovery tests.
pub struct CrashableBackend {
    inner: Box<dyn StorageBackend>,
    control: Arc<CrashControl>,
}

impl CrashableBackend {
    /// Wraps `inner`, returning the backend and its control handle.
    pub fn new(inner: Box<dyn StorageBackend>) -> (Self, Arc<CrashControl>) {
        let control = CrashControl::new();
        (
            Self {
                inner,
                control: Arc::clone(&control),
            },
            control,
        )
    }

    /// Takes `len` bytes from the budget, returning how many may be
    /// written.
    fn admit(&self, len: usize) -> usize {
        let budget = self.control.budget.load(Ordering::SeqCst);
        if budget == usize::MAX {
            return len;
        }
        let admitted = len.min(budget);
        self.control.budget.store(budget - admitted, Ordering::SeqCst);
        admitted
    }
}

impl StorageBackend for CrashableBackend {
    fn read_at(&mut self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        self.inner.read_at(offset, len)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let admitted = self.admit(data.len());
        if admitted < data.len() {
            self.inner.append(&data[..admitted])?;
            return Err(StorageError::ShortWrite {
                written: admitted,
                requested: data.len(),
            });
        }
        self.inner.append(data)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> StorageResult<()> {
        let admitted = self.admit(data.len());
        if admitted < data.len() {
            self.inner.write_at(offset, &data[..admitted])?;
            return Err(StorageError::ShortWrite {
                written: admitted,
                requested: data.len(),
            });
        }
        self.inner.write_at(offset, data)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.inner.flush()
    }

    fn sync(&mut self) -> StorageResult<()> {
        if self.control.fail_on_sync.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected sync failure",
            )));
        }
        self.inner.sync()
    }

    fn len(&self) -> StorageResult<u64> {
        self.inner.len()
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        self.inner.truncate(new_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txfs_storage::InMemoryBackend;

    #[test]
    fn unlimited_budget_passes_through() {
        let (mut backend, _control) = CrashableBackend::new(Box::new(InMemoryBackend::new()));
        backend.append(b"hello").unwrap();
        assert_eq!(backend.read_at(0, 5).unwrap(), b"hello");
    }

    #[test]
    fn exhausted_budget_cuts_writes_short() {
        let (mut backend, control) = CrashableBackend::new(Box::new(InMemoryBackend::new()));
        control.crash_after(3);

        let result = backend.append(b"hello");
        assert!(matches!(
            result,
            Err(StorageError::ShortWrite {
                written: 3,
                requested: 5
            })
        ));
        // The prefix landed, like a real torn write.
        assert_eq!(backend.read_at(0, 3).unwrap(), b"hel");
        assert_eq!(backend.len().unwrap(), 3);
    }

    #[test]
    fn budget_spans_multiple_writes() {
        let (mut backend, control) = CrashableBackend::new(Box::new(InMemoryBackend::new()));
        control.crash_after(6);

        backend.append(b"four").unwrap();
        assert!(backend.append(b"more").is_err());
        assert_eq!(backend.len().unwrap(), 6);
    }

    #[test]
    fn sync_failure_and_heal() {
        let (mut backend, control) = CrashableBackend::new(Box::new(InMemoryBackend::new()));
        control.fail_on_sync(true);
        assert!(backend.sync().is_err());

        control.heal();
        assert!(backend.sync().is_ok());
    }
}
