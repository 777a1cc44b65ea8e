//! Streaming iterator over redo-log records.

use crate::error::StoreResult;
use crate::log::record::{RecordHeader, HEADER_SIZE};
use tracing::warn;
use txfs_storage::StorageBackend;

/// One complete record read back from a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Byte position of the record's header within the log.
    pub position: u64,
    /// The decoded header.
    pub header: RecordHeader,
    /// The payload, present for tentative records too (the apply engine
    /// filters on the commit bit, not the parser).
    pub payload: Vec<u8>,
}

/// Walks a log from the start, yielding complete records in append order.
///
/// The iterator is position-deterministic: the same backend bytes always
/// produce the same records. Torn tails (short header, short payload, or a
/// header with negative fields) end iteration at the last complete record
/// and are never reported as errors; only genuine I/O failures surface.
pub struct RecordIterator<'a> {
    backend: &'a mut dyn StorageBackend,
    size: u64,
    position: u64,
    finished: bool,
}

impl<'a> RecordIterator<'a> {
    /// Creates an iterator over the full extent of `backend`.
    pub fn new(backend: &'a mut dyn StorageBackend) -> StoreResult<Self> {
        let size = backend.len()?;
        Ok(Self {
            backend,
            size,
            position: 0,
            finished: false,
        })
    }

    fn read_next(&mut self) -> StoreResult<Option<LogRecord>> {
        if self.finished {
            return Ok(None);
        }

        let remaining = self.size - self.position;
        if remaining < HEADER_SIZE as u64 {
            // Torn header at the tail; everything before it is intact.
            self.finished = true;
            return Ok(None);
        }

        let header_bytes = self.backend.read_at(self.position, HEADER_SIZE)?;
        let mut buf = [0u8; HEADER_SIZE];
        if header_bytes.len() != HEADER_SIZE {
            self.finished = true;
            return Ok(None);
        }
        buf.copy_from_slice(&header_bytes);
        let header = RecordHeader::decode(&buf);

        if !header.is_well_formed() {
            warn!(
                position = self.position,
                "malformed record header, truncating log scan"
            );
            self.finished = true;
            return Ok(None);
        }

        let payload_len = header.length as u64;
        if remaining - (HEADER_SIZE as u64) < payload_len {
            // Torn payload: the header landed but the data did not.
            self.finished = true;
            return Ok(None);
        }

        let payload = self
            .backend
            .read_at(self.position + HEADER_SIZE as u64, header.length as usize)?;

        let record = LogRecord {
            position: self.position,
            header,
            payload,
        };
        self.position += HEADER_SIZE as u64 + payload_len;
        Ok(Some(record))
    }
}

impl Iterator for RecordIterator<'_> {
    type Item = StoreResult<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_next() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
