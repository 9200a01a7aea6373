use crate::collection::{CompleteOutcome, Listing};
use crate::error::StorageError;
use crate::record::Task;

/// The storage trait behind the `tasks` commands.
///
/// Every method is one self-contained operation: the implementation takes
/// its lock, loads the whole collection, applies one bounded change,
/// persists, and releases the lock before returning. No state is carried
/// between calls.
///
/// ## Ids
///
/// `complete` and `delete` take the id as the user typed it. A record
/// matches when its id, written back out in base 10, equals that string
/// exactly, so `"01"` never addresses task 1.
///
/// ## No-op success
///
/// Addressing an id that does not exist is not an error:
/// `complete` reports [`CompleteOutcome::NotFound`] and `delete` returns 0.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` so that concurrent callers can
/// share one handle; the lock discipline serialises them.
pub trait TaskStorage: Send + Sync {
    /// Append a new, incomplete task and return it.
    ///
    /// The id is the last record's id plus one (1 for an empty store).
    fn add(&self, description: &str) -> Result<Task, StorageError>;

    /// Tasks in file order, skipping completed ones unless
    /// `include_completed` is set.
    fn list(&self, include_completed: bool) -> Result<Vec<Task>, StorageError> {
        Ok(self.list_with_issues(include_completed)?.tasks)
    }

    /// Like [`TaskStorage::list`], also returning every field that could
    /// not be decoded and fell back to its zero value.
    fn list_with_issues(&self, include_completed: bool) -> Result<Listing, StorageError>;

    /// Mark the first task with this id as complete.
    fn complete(&self, id: &str) -> Result<CompleteOutcome, StorageError>;

    /// Remove every task with this id and return how many were removed.
    fn delete(&self, id: &str) -> Result<usize, StorageError>;
}
