use std::sync::{Mutex, MutexGuard};

use time::OffsetDateTime;

use crate::collection::{self, CompleteOutcome, Listing};
use crate::error::StorageError;
use crate::record::{Record, Task};
use crate::traits::TaskStorage;

/// In-process [`TaskStorage`]: the same record set and operations as
/// [`FileStore`](crate::FileStore), with a `Mutex` standing in for the file
/// lock. Each call holds the mutex for its whole operation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record set, e.g. one read with
    /// [`read_records`](crate::codec::read_records).
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Copy of the current records in order.
    pub fn records(&self) -> Result<Vec<Record>, StorageError> {
        Ok(self.guard()?.clone())
    }

    fn guard(&self) -> Result<MutexGuard<'_, Vec<Record>>, StorageError> {
        self.records
            .lock()
            .map_err(|_| StorageError::Backend("task list mutex poisoned".to_string()))
    }
}

impl TaskStorage for MemoryStore {
    fn add(&self, description: &str) -> Result<Task, StorageError> {
        let mut records = self.guard()?;
        let id = collection::next_id(&records)?;
        let task = Task::new(id, description, OffsetDateTime::now_utc());
        records.push(Record::from_task(&task));
        Ok(task)
    }

    fn list_with_issues(&self, include_completed: bool) -> Result<Listing, StorageError> {
        let records = self.guard()?;
        Ok(collection::tasks(&records, include_completed))
    }

    fn complete(&self, id: &str) -> Result<CompleteOutcome, StorageError> {
        let mut records = self.guard()?;
        Ok(collection::complete(&mut records, id))
    }

    fn delete(&self, id: &str) -> Result<usize, StorageError> {
        let mut records = self.guard()?;
        Ok(collection::delete(&mut records, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::read_records;

    #[test]
    fn seeded_records_drive_id_assignment() {
        let store = MemoryStore::with_records(read_records(
            "1,a,2024-01-15T10:30:00Z,false\n2,b,2024-01-15T10:30:00Z,false\n5,c,2024-01-15T10:30:00Z,true\n",
        ));
        assert_eq!(store.add("d").unwrap().id, 6);
        assert_eq!(store.list(false).unwrap().len(), 3);
        assert_eq!(store.records().unwrap().len(), 4);
    }

    #[test]
    fn poisoned_mutex_surfaces_as_backend_error() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let clone = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = clone.records.lock().unwrap();
            panic!("poison");
        })
        .join();

        assert!(matches!(store.add("x"), Err(StorageError::Backend(_))));
    }
}
