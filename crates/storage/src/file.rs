//! The file-backed store: one delimited-text file, guarded by an advisory
//! lock, loaded and persisted whole on every operation.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use time::OffsetDateTime;

use crate::codec;
use crate::collection::{self, CompleteOutcome, Listing};
use crate::config::{lock_path_for, StoreConfig};
use crate::error::StorageError;
use crate::lock::{LockGuard, LockMode};
use crate::record::{Record, Task};
use crate::traits::TaskStorage;

/// [`TaskStorage`] over a single file on disk.
///
/// Writers (`add`, `complete`, `delete`) hold an exclusive lock for the
/// whole load-mutate-persist cycle; `list` holds a shared one. `add`
/// appends a single line and leaves earlier content untouched. `complete`
/// and `delete` write the full record set to a temporary file in the same
/// directory and rename it over the data file, so a crash mid-write leaves
/// either the old or the new contents, never a truncated file.
///
/// A configured path that is a symlink is followed on every operation:
/// the lock, the temporary file and the rename all sit next to the target.
/// `list` creates the sidecar lock file but never a directory or the data
/// file.
#[derive(Debug, Clone)]
pub struct FileStore {
    config: StoreConfig,
}

/// The resolved data file, locked.
struct Locked {
    path: PathBuf,
    _guard: LockGuard,
}

/// What was on disk when the lock was taken.
struct Loaded {
    records: Vec<Record>,
    /// Non-empty file whose last byte is not a newline.
    unterminated: bool,
    /// The file ends inside a quoted field.
    open_quote: bool,
    /// Invalid UTF-8 was replaced while decoding.
    lossy: bool,
}

impl FileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Shorthand for `FileStore::new(StoreConfig::new(path))`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::new(StoreConfig::new(path.as_ref()))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn lock_for_write(&self) -> Result<Locked, StorageError> {
        let path = resolve(self.config.path())?;
        let dir = parent_dir(&path);
        fs::create_dir_all(dir).map_err(|e| StorageError::io("create directory", dir, e))?;
        self.acquire(path, LockMode::Exclusive)
    }

    /// `None` when the data file's directory does not exist, so there is
    /// nothing to read.
    fn lock_for_read(&self) -> Result<Option<Locked>, StorageError> {
        let path = resolve(self.config.path())?;
        if !parent_dir(&path).is_dir() {
            return Ok(None);
        }
        self.acquire(path, LockMode::Shared).map(Some)
    }

    fn acquire(&self, path: PathBuf, mode: LockMode) -> Result<Locked, StorageError> {
        let guard = LockGuard::acquire(&lock_path_for(&path), mode, self.config.lock_timeout())?;
        Ok(Locked {
            path,
            _guard: guard,
        })
    }

    fn load(&self, path: &Path) -> Result<Loaded, StorageError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StorageError::io("read", path, e)),
        };
        let lossy = std::str::from_utf8(&bytes).is_err();
        if lossy {
            tracing::warn!(path = %path.display(), "file is not valid UTF-8; invalid bytes read as U+FFFD");
        }
        let parsed = codec::parse(&String::from_utf8_lossy(&bytes));
        Ok(Loaded {
            records: parsed.records,
            unterminated: bytes.last().is_some_and(|&b| b != b'\n'),
            open_quote: parsed.open_quote,
            lossy,
        })
    }

    fn append(&self, path: &Path, line: &str) -> Result<(), StorageError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StorageError::io("open", path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| StorageError::io("write", path, e))?;
        file.sync_data()
            .map_err(|e| StorageError::io("sync", path, e))
    }

    /// Rewrite the whole file. Refused when decoding was lossy, since the
    /// replacement characters would be written back over the original bytes.
    fn replace(&self, path: &Path, lossy: bool, records: &[Record]) -> Result<(), StorageError> {
        if lossy {
            return Err(StorageError::NotUtf8 {
                path: path.to_path_buf(),
            });
        }
        let dir = parent_dir(path);

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| StorageError::io("create temporary file in", dir, e))?;
        tmp.write_all(codec::write_records(records).as_bytes())
            .map_err(|e| StorageError::io("write", tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StorageError::io("sync", tmp.path(), e))?;

        // Temporary files are created owner-only; keep the data file's mode.
        match fs::metadata(path) {
            Ok(meta) => fs::set_permissions(tmp.path(), meta.permissions())
                .map_err(|e| StorageError::io("set permissions on", tmp.path(), e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::io("stat", path, e)),
        }

        tmp.persist(path)
            .map_err(|e| StorageError::io("replace", path, e.error))?;
        tracing::debug!(path = %path.display(), records = records.len(), "file rewritten");
        Ok(())
    }
}

impl TaskStorage for FileStore {
    fn add(&self, description: &str) -> Result<Task, StorageError> {
        let locked = self.lock_for_write()?;
        let loaded = self.load(&locked.path)?;

        let id = collection::next_id(&loaded.records)?;
        let task = Task::new(id, description, OffsetDateTime::now_utc());

        let mut line = String::new();
        if loaded.open_quote {
            // A torn quoted field would swallow everything appended after it.
            tracing::warn!(path = %locked.path.display(), "closing a quoted field left open at end of file");
            line.push_str("\"\n");
        } else if loaded.unterminated {
            line.push('\n');
        }
        codec::write_record(&mut line, &task.to_fields());
        self.append(&locked.path, &line)?;

        tracing::debug!(id, path = %locked.path.display(), "task appended");
        Ok(task)
    }

    fn list_with_issues(&self, include_completed: bool) -> Result<Listing, StorageError> {
        let Some(locked) = self.lock_for_read()? else {
            return Ok(Listing::default());
        };
        let loaded = self.load(&locked.path)?;

        let listing = collection::tasks(&loaded.records, include_completed);
        for issue in &listing.issues {
            tracing::warn!(path = %locked.path.display(), "{issue}; using default value");
        }
        Ok(listing)
    }

    fn complete(&self, id: &str) -> Result<CompleteOutcome, StorageError> {
        let locked = self.lock_for_write()?;
        let Loaded {
            mut records, lossy, ..
        } = self.load(&locked.path)?;

        let outcome = collection::complete(&mut records, id);
        if outcome.changed() {
            self.replace(&locked.path, lossy, &records)?;
        } else if outcome == CompleteOutcome::NotFound {
            tracing::warn!(id, "no task with this id; nothing to complete");
        } else {
            tracing::debug!(id, "task already complete");
        }
        Ok(outcome)
    }

    fn delete(&self, id: &str) -> Result<usize, StorageError> {
        let locked = self.lock_for_write()?;
        let Loaded {
            mut records, lossy, ..
        } = self.load(&locked.path)?;

        let removed = collection::delete(&mut records, id);
        if removed == 0 {
            tracing::warn!(id, "no task with this id; nothing to delete");
        } else {
            self.replace(&locked.path, lossy, &records)?;
        }
        Ok(removed)
    }
}

/// The file `path` refers to, following symlinks.
///
/// Falls back to `path` itself when nothing exists there yet. A dangling
/// link resolves to its target, which the first append creates.
fn resolve(path: &Path) -> Result<PathBuf, StorageError> {
    match fs::canonicalize(path) {
        Ok(real) => Ok(real),
        Err(e) if e.kind() == io::ErrorKind::NotFound => match fs::read_link(path) {
            Ok(target) => Ok(parent_dir(path).join(target)),
            Err(_) => Ok(path.to_path_buf()),
        },
        Err(e) => Err(StorageError::io("resolve", path, e)),
    }
}

/// Directory holding `path`; `.` for a bare file name.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
