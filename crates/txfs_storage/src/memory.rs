//! In-memory storage backend for tests.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};

/// A `Vec`-backed storage backend.
///
/// Used by unit tests and the testkit's crash harness: it lets a test build
/// a log byte-for-byte (including torn tails) without touching the
/// filesystem. `flush` and `sync` are no-ops; nothing here survives the
/// process anyway.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: Vec<u8>,
}

impl InMemoryBackend {
    /// Creates an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-seeded with raw bytes.
    ///
    /// Handy for parser tests that want a hand-crafted log image.
    #[must_use]
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Returns the full contents for inspection.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&mut self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = self.data.len() as u64;
        let end = offset.saturating_add(len as u64);
        if offset > size || end > size {
            return Err(StorageError::OutOfBounds { offset, len, size });
        }
        Ok(self.data[offset as usize..offset as usize + len].to_vec())
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let offset = self.data.len() as u64;
        self.data.extend_from_slice(data);
        Ok(offset)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> StorageResult<()> {
        let size = self.data.len() as u64;
        let end = offset.saturating_add(data.len() as u64);
        if offset > size || end > size {
            return Err(StorageError::OutOfBounds {
                offset,
                len: data.len(),
                size,
            });
        }
        self.data[offset as usize..offset as usize + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn len(&self) -> StorageResult<u64> {
        Ok(self.data.len() as u64)
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        if new_size > self.data.len() as u64 {
            return Err(StorageError::OutOfBounds {
                offset: new_size,
                len: 0,
                size: self.data.len() as u64,
            });
        }
        self.data.truncate(new_size as usize);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_read_roundtrip() {
        let mut backend = InMemoryBackend::new();
        assert_eq!(backend.append(b"abc").unwrap(), 0);
        assert_eq!(backend.append(b"def").unwrap(), 3);
        assert_eq!(backend.read_at(2, 3).unwrap(), b"cde");
    }

    #[test]
    fn write_at_in_place() {
        let mut backend = InMemoryBackend::from_bytes(b"......".to_vec());
        backend.write_at(2, b"XY").unwrap();
        assert_eq!(backend.as_bytes(), b"..XY..");
    }

    #[test]
    fn bounds_enforced() {
        let mut backend = InMemoryBackend::from_bytes(vec![0; 4]);
        assert!(matches!(
            backend.read_at(2, 4),
            Err(StorageError::OutOfBounds { .. })
        ));
        assert!(matches!(
            backend.write_at(4, b"z"),
            Err(StorageError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn truncate_shrinks_only() {
        let mut backend = InMemoryBackend::from_bytes(vec![1, 2, 3, 4]);
        backend.truncate(2).unwrap();
        assert_eq!(backend.len().unwrap(), 2);
        assert!(backend.truncate(3).is_err());
    }
}
