//! Store configuration.

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the managed directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether `open_file` blocks until the file's exclusive lock is
    /// granted. When false, opening a file held by another handle fails
    /// immediately with `FileLocked`.
    pub blocking_open: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            blocking_open: true,
        }
    }
}

impl Config {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the managed directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether `open_file` waits for the exclusive lock.
    #[must_use]
    pub const fn blocking_open(mut self, value: bool) -> Self {
        self.blocking_open = value;
        self
    }
}
