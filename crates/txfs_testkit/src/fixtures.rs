//! Temp-directory store fixtures.

use std::path::Path;
use tempfile::TempDir;
use txfs_core::{Config, Store, StoreResult};

/// A store rooted in a temp directory that lives as long as the fixture.
///
/// `reopen` simulates "the next process": a fresh session over the same
/// directory, which is how the recovery scenarios observe what survived.
pub struct TestStore {
    temp: TempDir,
    store: Store,
}

impl TestStore {
    /// Creates a store in a fresh temp directory.
    ///
    /// # Panics
    ///
    /// Panics on setup failure; fixtures have no one to report errors to.
    #[must_use]
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let store = Store::open(temp.path()).expect("open store");
        Self { temp, store }
    }

    /// The live store session.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The managed directory's path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Opens a second, independent session over the same directory.
    pub fn reopen(&self) -> StoreResult<Store> {
        Store::open(self.temp.path())
    }

    /// Opens a second session with an explicit configuration.
    pub fn reopen_with_config(&self, config: Config) -> StoreResult<Store> {
        Store::open_with_config(self.temp.path(), config)
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_roundtrip() {
        let fixture = TestStore::new();

        let mut handle = fixture.store().open_file("t1", 32).unwrap();
        handle.write(0, b"abc").unwrap().sync().unwrap();
        fixture.store().close_file(&mut handle).unwrap();

        let other = fixture.reopen().unwrap();
        let handle = other.open_file("t1", 32).unwrap();
        assert_eq!(handle.read(0, 3).unwrap(), b"abc");
    }
}
