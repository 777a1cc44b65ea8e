//! Managed-directory layout and path derivation.
//!
//! A store owns one flat directory:
//!
//! ```text
//! <root>/
//! ├─ t1            # data file, named by the caller
//! ├─ t1.log        # its redo log (present only between sync and apply)
//! └─ t2
//! ```
//!
//! The log for data file `name` lives at the sibling path `name.log`. This
//! convention is part of the on-disk contract: a later process recovers logs
//! written by an earlier one purely by scanning for the `.log` suffix. To
//! keep the two namespaces disjoint, data files may not themselves be named
//! with a `.log` suffix.

use crate::error::{StoreError, StoreResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum filename length in bytes.
pub const MAX_FILENAME_LEN: usize = 255;

/// Suffix appended to a data-file name to form its log name.
const LOG_SUFFIX: &str = ".log";

/// The managed directory of a store.
///
/// Pure path service: it validates names, derives data and log paths, and
/// enumerates pending logs. It holds no locks and no descriptors.
#[derive(Debug, Clone)]
pub struct StoreDir {
    root: PathBuf,
}

impl StoreDir {
    /// Opens or creates the managed directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path exists but is not a directory, if it is
    /// missing and `create_if_missing` is false, or on I/O failure.
    pub fn open(path: &Path, create_if_missing: bool) -> StoreResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("store directory does not exist: {}", path.display()),
                )));
            }
        }

        if !path.is_dir() {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("store path is not a directory: {}", path.display()),
            )));
        }

        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    /// Returns the managed directory's root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates a caller-supplied data-file name.
    ///
    /// # Errors
    ///
    /// Returns `NameTooLong` for names over [`MAX_FILENAME_LEN`] bytes and
    /// `InvalidName` for empty names, names containing a path separator, and
    /// names ending in `.log` (reserved for redo logs).
    pub fn validate_name(name: &str) -> StoreResult<()> {
        if name.len() > MAX_FILENAME_LEN {
            return Err(StoreError::NameTooLong {
                name: name.to_string(),
                len: name.len(),
                limit: MAX_FILENAME_LEN,
            });
        }
        if name.is_empty() {
            return Err(StoreError::invalid_name(name, "name is empty"));
        }
        if name.chars().any(std::path::is_separator) {
            return Err(StoreError::invalid_name(name, "name contains a path separator"));
        }
        if name.ends_with(LOG_SUFFIX) {
            return Err(StoreError::invalid_name(
                name,
                "the .log suffix is reserved for redo logs",
            ));
        }
        Ok(())
    }

    /// Returns the path of the data file for `name`.
    pub fn data_path(&self, name: &str) -> StoreResult<PathBuf> {
        Self::validate_name(name)?;
        Ok(self.root.join(name))
    }

    /// Returns the path of the redo log for `name`.
    pub fn log_path(&self, name: &str) -> StoreResult<PathBuf> {
        Self::validate_name(name)?;
        Ok(self.root.join(format!("{name}{LOG_SUFFIX}")))
    }

    /// Enumerates pending redo logs, yielding the data-file name each one
    /// belongs to.
    ///
    /// Entries that are not regular `*.log` files are skipped; the store
    /// shares its directory with the data files themselves and possibly
    /// with foreign content.
    pub fn log_entries(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(name) = file_name.strip_suffix(LOG_SUFFIX) {
                // A name the store could never have created is foreign
                // content, not a recoverable log.
                if Self::validate_name(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort_unstable();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_directory() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("store");

        assert!(!root.exists());
        let dir = StoreDir::open(&root, true).unwrap();
        assert!(root.is_dir());
        assert_eq!(dir.root(), root);
    }

    #[test]
    fn open_fails_if_missing_and_no_create() {
        let temp = tempdir().unwrap();
        let result = StoreDir::open(&temp.path().join("absent"), false);
        assert!(result.is_err());
    }

    #[test]
    fn log_path_is_sibling() {
        let temp = tempdir().unwrap();
        let dir = StoreDir::open(temp.path(), false).unwrap();

        assert_eq!(dir.data_path("t1").unwrap(), temp.path().join("t1"));
        assert_eq!(dir.log_path("t1").unwrap(), temp.path().join("t1.log"));
    }

    #[test]
    fn name_limit_enforced() {
        let long = "x".repeat(MAX_FILENAME_LEN + 1);
        assert!(matches!(
            StoreDir::validate_name(&long),
            Err(StoreError::NameTooLong { .. })
        ));
        assert!(StoreDir::validate_name(&"x".repeat(MAX_FILENAME_LEN)).is_ok());
    }

    #[test]
    fn reserved_and_malformed_names_rejected() {
        for name in ["", "a/b", "t1.log"] {
            assert!(
                matches!(StoreDir::validate_name(name), Err(StoreError::InvalidName { .. })),
                "expected rejection for {name:?}"
            );
        }
    }

    #[test]
    fn log_entries_filters_non_logs() {
        let temp = tempdir().unwrap();
        let dir = StoreDir::open(temp.path(), false).unwrap();

        std::fs::write(temp.path().join("t1"), b"data").unwrap();
        std::fs::write(temp.path().join("t1.log"), b"log").unwrap();
        std::fs::write(temp.path().join("t2.log"), b"log").unwrap();
        std::fs::write(temp.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(temp.path().join("sub.log")).unwrap();

        assert_eq!(dir.log_entries().unwrap(), vec!["t1", "t2"]);
    }
}
