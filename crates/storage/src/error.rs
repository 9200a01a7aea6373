use std::path::PathBuf;
use std::time::Duration;

/// All errors that can be returned by a TaskStorage implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing file (or its lock file) could not be opened, locked,
    /// read, written, synced, or replaced.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lock was still held by another process when the configured
    /// timeout elapsed.
    #[error("timed out after {timeout:?} waiting for lock on {}", path.display())]
    LockTimeout { path: PathBuf, timeout: Duration },

    /// A rewrite would replace invalid UTF-8 in other records with U+FFFD.
    #[error(
        "refusing to rewrite {}: it contains bytes that are not valid UTF-8 and would be altered",
        path.display()
    )]
    NotUtf8 { path: PathBuf },

    /// The last record already carries the largest representable id.
    #[error("task id space exhausted: last id is {last}")]
    IdExhausted { last: u64 },

    /// A backend-specific failure (poisoned in-process lock, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_action_and_path() {
        let err = StorageError::io(
            "open",
            "/tmp/tasks.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "failed to open /tmp/tasks.csv: denied");
    }

    #[test]
    fn not_utf8_message_names_the_file() {
        let err = StorageError::NotUtf8 {
            path: PathBuf::from("tasks.csv"),
        };
        assert!(err.to_string().starts_with("refusing to rewrite tasks.csv:"), "{err}");
    }

    #[test]
    fn lock_timeout_message_includes_duration() {
        let err = StorageError::LockTimeout {
            path: PathBuf::from("tasks.csv.lock"),
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(
            err.to_string(),
            "timed out after 1.5s waiting for lock on tasks.csv.lock"
        );
    }
}
