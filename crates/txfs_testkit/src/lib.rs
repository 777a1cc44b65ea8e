//! Test utilities for txfs.
//!
//! Two tools the recovery suites lean on:
//!
//! - [`fixtures`]: temp-directory store scaffolding
//! - [`crash`]: a storage backend wrapper that dies mid-write on command,
//!   for manufacturing every row of the sync protocol's crash-window table

#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;

pub use crash::{CrashControl, CrashableBackend};
pub use fixtures::TestStore;
