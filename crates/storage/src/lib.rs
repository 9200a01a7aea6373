//! Record store for the `tasks` command-line tool.
//!
//! Tasks live in one delimited-text file (`id,description,created_at,is_complete`
//! per line). Every operation takes an advisory lock, loads the whole file,
//! applies one change, and persists it before releasing the lock, so
//! separate invocations of the tool can safely overlap.

pub mod codec;
pub mod collection;
pub mod conformance;
mod config;
mod error;
mod file;
mod lock;
mod memory;
mod record;
mod traits;

pub use collection::{CompleteOutcome, Listing};
pub use config::{StoreConfig, DEFAULT_FILE_NAME};
pub use error::StorageError;
pub use file::FileStore;
pub use lock::{LockGuard, LockMode};
pub use memory::MemoryStore;
pub use record::{format_timestamp, Decoded, Field, FieldIssue, Record, Task, ZERO_TIME};
pub use traits::TaskStorage;
