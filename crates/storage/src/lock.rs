//! Advisory whole-file locks on the store's sidecar lock file.
//!
//! The data file itself is replaced by rename on rewrite, so the lock lives
//! on a separate `<data file>.lock` that is created on demand and never
//! removed. Every process that uses the same data file therefore contends
//! on the same inode.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::StorageError;

/// How often a bounded wait retries a contended lock.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Readers: any number may hold it at once, never alongside a writer.
    Shared,
    /// Writers: sole holder.
    Exclusive,
}

/// A held lock. Released when dropped.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Open (creating if needed) and lock `path`.
    ///
    /// With no `timeout` this blocks until the lock is granted. With a
    /// timeout it polls and gives up with [`StorageError::LockTimeout`].
    pub fn acquire(
        path: &Path,
        mode: LockMode,
        timeout: Option<Duration>,
    ) -> Result<Self, StorageError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| StorageError::io("open lock file", path, e))?;

        match timeout {
            None => blocking_lock(&file, mode).map_err(|e| StorageError::io("lock", path, e))?,
            Some(timeout) => polling_lock(&file, mode, path, timeout)?,
        }

        tracing::debug!(path = %path.display(), ?mode, "lock acquired");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Closing the handle releases the lock as well; unlocking first
        // just makes the release point explicit.
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::debug!(path = %self.path.display(), error = %e, "unlock failed");
        }
    }
}

fn blocking_lock(file: &File, mode: LockMode) -> io::Result<()> {
    match mode {
        LockMode::Shared => FileExt::lock_shared(file),
        LockMode::Exclusive => FileExt::lock_exclusive(file),
    }
}

fn try_lock(file: &File, mode: LockMode) -> io::Result<()> {
    match mode {
        LockMode::Shared => FileExt::try_lock_shared(file),
        LockMode::Exclusive => FileExt::try_lock_exclusive(file),
    }
}

fn polling_lock(
    file: &File,
    mode: LockMode,
    path: &Path,
    timeout: Duration,
) -> Result<(), StorageError> {
    let deadline = Instant::now() + timeout;
    loop {
        match try_lock(file, mode) {
            Ok(()) => return Ok(()),
            Err(e) if is_contended(&e) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(StorageError::LockTimeout {
                        path: path.to_path_buf(),
                        timeout,
                    });
                }
                thread::sleep(POLL_INTERVAL.min(deadline - now));
            }
            Err(e) => return Err(StorageError::io("lock", path, e)),
        }
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
        || err.kind() == io::ErrorKind::WouldBlock
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn exclusive_lock_times_out_while_held() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.csv.lock");

        let _held = LockGuard::acquire(&path, LockMode::Exclusive, None).unwrap();
        let err = LockGuard::acquire(&path, LockMode::Exclusive, Some(Duration::from_millis(60)))
            .unwrap_err();
        assert!(matches!(err, StorageError::LockTimeout { .. }), "{err}");
    }

    #[test]
    fn shared_locks_coexist_but_exclude_writers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.csv.lock");
        let short = Some(Duration::from_millis(60));

        let _a = LockGuard::acquire(&path, LockMode::Shared, None).unwrap();
        let _b = LockGuard::acquire(&path, LockMode::Shared, short).unwrap();
        assert!(LockGuard::acquire(&path, LockMode::Exclusive, short).is_err());
    }

    #[test]
    fn dropping_the_guard_releases_the_lock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.csv.lock");

        drop(LockGuard::acquire(&path, LockMode::Exclusive, None).unwrap());
        LockGuard::acquire(&path, LockMode::Exclusive, Some(Duration::from_millis(60))).unwrap();
        assert!(path.exists(), "lock file is left in place");
    }
}
