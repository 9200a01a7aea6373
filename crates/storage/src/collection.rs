//! Operations over a fully loaded record set.
//!
//! Every backend loads the whole collection, applies one of these, and
//! persists the result, so all backends share one definition of id
//! assignment, matching, and filtering.

use crate::error::StorageError;
use crate::record::{FieldIssue, Record, Task};

/// What `complete` found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteOutcome {
    /// The task was open and is now complete.
    Completed,
    /// The task was already complete; nothing changed.
    AlreadyComplete,
    /// No task has that id; nothing changed.
    NotFound,
}

impl CompleteOutcome {
    /// Whether the collection needs to be written back.
    pub fn changed(self) -> bool {
        self == CompleteOutcome::Completed
    }
}

/// Tasks returned by a list, plus every field that decoded to a default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub tasks: Vec<Task>,
    pub issues: Vec<FieldIssue>,
}

/// The id for a new task: the last record's id plus one, or 1 when empty.
///
/// This follows file order, not the largest id present.
pub fn next_id(records: &[Record]) -> Result<u64, StorageError> {
    match records.last() {
        None => Ok(1),
        Some(last) => {
            let last = last.id();
            last.checked_add(1)
                .ok_or(StorageError::IdExhausted { last })
        }
    }
}

/// Mark the first record whose id matches `id` as complete.
pub fn complete(records: &mut [Record], id: &str) -> CompleteOutcome {
    match records.iter_mut().find(|r| r.matches_id(id)) {
        None => CompleteOutcome::NotFound,
        Some(record) if record.is_complete() => CompleteOutcome::AlreadyComplete,
        Some(record) => {
            record.mark_complete();
            CompleteOutcome::Completed
        }
    }
}

/// Remove every record whose id matches `id`; returns how many went.
pub fn delete(records: &mut Vec<Record>, id: &str) -> usize {
    let before = records.len();
    records.retain(|r| !r.matches_id(id));
    before - records.len()
}

/// Decode records in file order, dropping completed tasks unless asked.
pub fn tasks(records: &[Record], include_completed: bool) -> Listing {
    let mut listing = Listing::default();
    for record in records {
        let decoded = record.decode();
        listing.issues.extend(decoded.issues);
        if include_completed || !decoded.task.is_complete {
            listing.tasks.push(decoded.task);
        }
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, done: bool) -> Record {
        Record::new(
            0,
            vec![
                id.to_string(),
                format!("task {id}"),
                "2024-01-15T10:30:00Z".to_string(),
                done.to_string(),
            ],
        )
    }

    fn ids(records: &[Record]) -> Vec<u64> {
        records.iter().map(Record::id).collect()
    }

    #[test]
    fn first_id_is_one() {
        assert_eq!(next_id(&[]).unwrap(), 1);
    }

    #[test]
    fn next_id_follows_the_last_record_not_the_maximum() {
        let records = [rec("1", false), rec("2", false), rec("5", false)];
        assert_eq!(next_id(&records).unwrap(), 6);

        let out_of_order = [rec("1", false), rec("7", false), rec("3", false)];
        assert_eq!(next_id(&out_of_order).unwrap(), 4);
    }

    #[test]
    fn unreadable_last_id_restarts_at_one() {
        let records = [rec("4", false), rec("garbage", false)];
        assert_eq!(next_id(&records).unwrap(), 1);
    }

    #[test]
    fn next_id_refuses_to_wrap() {
        let records = [rec(&u64::MAX.to_string(), false)];
        assert!(matches!(
            next_id(&records),
            Err(StorageError::IdExhausted { last: u64::MAX })
        ));
    }

    #[test]
    fn complete_is_idempotent() {
        let mut records = vec![rec("1", false), rec("2", false)];
        assert_eq!(complete(&mut records, "2"), CompleteOutcome::Completed);
        assert_eq!(complete(&mut records, "2"), CompleteOutcome::AlreadyComplete);
        assert!(records[1].is_complete());
        assert!(!records[0].is_complete());
    }

    #[test]
    fn complete_matches_ids_as_strings() {
        let mut records = vec![rec("1", false)];
        assert_eq!(complete(&mut records, "01"), CompleteOutcome::NotFound);
        assert!(!records[0].is_complete());
    }

    #[test]
    fn complete_only_touches_the_first_duplicate() {
        let mut records = vec![rec("3", false), rec("3", false)];
        complete(&mut records, "3");
        assert!(records[0].is_complete());
        assert!(!records[1].is_complete());
    }

    #[test]
    fn delete_keeps_relative_order() {
        let mut records = vec![rec("1", false), rec("2", false), rec("3", false)];
        assert_eq!(delete(&mut records, "2"), 1);
        assert_eq!(ids(&records), [1, 3]);
    }

    #[test]
    fn delete_removes_every_duplicate_and_ignores_unknown_ids() {
        let mut records = vec![rec("3", false), rec("4", false), rec("3", true)];
        assert_eq!(delete(&mut records, "3"), 2);
        assert_eq!(ids(&records), [4]);
        assert_eq!(delete(&mut records, "9"), 0);
        assert_eq!(ids(&records), [4]);
    }

    #[test]
    fn listing_filters_completed_tasks_in_file_order() {
        let records = [rec("1", true), rec("2", false), rec("3", true), rec("4", false)];
        let open: Vec<u64> = tasks(&records, false).tasks.iter().map(|t| t.id).collect();
        assert_eq!(open, [2, 4]);
        let all: Vec<u64> = tasks(&records, true).tasks.iter().map(|t| t.id).collect();
        assert_eq!(all, [1, 2, 3, 4]);
    }

    #[test]
    fn listing_collects_issues_even_for_filtered_records() {
        let broken = Record::new(
            2,
            vec!["9".into(), "x".into(), "bad".into(), "true".into()],
        );
        let listing = tasks(&[broken], false);
        assert!(listing.tasks.is_empty());
        assert_eq!(listing.issues.len(), 1);
        assert_eq!(listing.issues[0].line, 2);
    }
}
