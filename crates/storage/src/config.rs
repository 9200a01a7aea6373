use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name used when no path is configured.
pub const DEFAULT_FILE_NAME: &str = "tasks.csv";

/// Where a [`FileStore`](crate::FileStore) keeps its data and how long it
/// waits for the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    path: PathBuf,
    lock_timeout: Option<Duration>,
}

impl StoreConfig {
    /// Store tasks in `path`, waiting for the lock indefinitely.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout: None,
        }
    }

    /// Give up with `StorageError::LockTimeout` after waiting this long.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout
    }

    /// The sidecar lock file for the path as configured: the data file
    /// name with `.lock` appended. When the path is a symlink the store
    /// locks next to the link's target instead.
    pub fn lock_path(&self) -> PathBuf {
        lock_path_for(&self.path)
    }
}

pub(crate) fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from(DEFAULT_FILE_NAME));
    name.push(".lock");
    path.with_file_name(name)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_path_sits_next_to_the_data_file() {
        let config = StoreConfig::new("/var/data/my.tasks.csv");
        assert_eq!(config.lock_path(), PathBuf::from("/var/data/my.tasks.csv.lock"));
    }

    #[test]
    fn default_uses_tasks_csv_and_no_timeout() {
        let config = StoreConfig::default();
        assert_eq!(config.path(), Path::new("tasks.csv"));
        assert_eq!(config.lock_path(), PathBuf::from("tasks.csv.lock"));
        assert_eq!(config.lock_timeout(), None);
    }

    #[test]
    fn timeout_is_opt_in() {
        let config = StoreConfig::new("t.csv").with_lock_timeout(Duration::from_secs(2));
        assert_eq!(config.lock_timeout(), Some(Duration::from_secs(2)));
    }
}
