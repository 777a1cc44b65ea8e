//! # txfs
//!
//! An embedded, single-host transactional file store.
//!
//! txfs gives cooperating processes offset-addressed byte writes against
//! flat files in a managed directory, with a redo-log guarantee: a write
//! that was synced is durably visible in full after any crash, and a write
//! that wasn't leaves the file byte-identical to its pre-write state.
//!
//! ## How a write travels
//!
//! ```text
//! write()  → mutate the handle's private view, capture rollback bytes
//! sync()   → append record to the log, fsync, set commit bit, fsync
//! apply    → (next open / close / clean) replay committed records into
//!            the data file, fsync, erase the log
//! ```
//!
//! The data file itself is written only by the apply engine; everything
//! else goes through the log. Cross-process exclusion is an advisory
//! whole-file lock held for the lifetime of each [`FileHandle`].
//!
//! ## Crash behavior
//!
//! Recovery parses the log and replays records whose commit bit is set. A
//! torn tail (partial header, short payload, torn commit bit) marks the
//! end of the log and is discarded silently: that is the debris an
//! interrupted sync is allowed to leave.

#![warn(missing_docs)]

pub mod apply;
mod config;
mod dir;
mod error;
mod handle;
mod intent;
pub mod log;
mod store;

pub use config::Config;
pub use dir::{StoreDir, MAX_FILENAME_LEN};
pub use error::{StoreError, StoreResult};
pub use handle::FileHandle;
pub use intent::WriteIntent;
pub use store::Store;
