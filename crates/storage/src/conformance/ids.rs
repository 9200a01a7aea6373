use super::{add_all, all_ids, expect_ids, TestResult};
use crate::TaskStorage;

pub(super) fn run_id_tests<S, F>(factory: &F) -> Vec<TestResult>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    vec![
        TestResult::from_result("ids", "first_task_gets_id_1", first_task_gets_id_1(factory)),
        TestResult::from_result(
            "ids",
            "ids_increase_by_one_in_add_order",
            ids_increase_by_one_in_add_order(factory),
        ),
        TestResult::from_result(
            "ids",
            "next_id_follows_last_record_after_deletes",
            next_id_follows_last_record_after_deletes(factory),
        ),
        TestResult::from_result(
            "ids",
            "deleting_the_last_task_reuses_its_id",
            deleting_the_last_task_reuses_its_id(factory),
        ),
        TestResult::from_result(
            "ids",
            "emptied_store_starts_again_at_1",
            emptied_store_starts_again_at_1(factory),
        ),
    ]
}

fn first_task_gets_id_1<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    let task = s.add("x").map_err(|e| format!("add: {e}"))?;
    if task.id != 1 {
        return Err(format!("expected id 1, got {}", task.id));
    }
    if task.is_complete {
        return Err("new task must not be complete".to_string());
    }
    if task.description != "x" {
        return Err(format!("description changed to {:?}", task.description));
    }
    Ok(())
}

fn ids_increase_by_one_in_add_order<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    add_all(&s, &["a", "b", "c"])?;
    expect_ids(&s, &[1, 2, 3])
}

/// Build [1, 2, 5] by adding five tasks and deleting 3 and 4; the next id
/// must be 6.
fn next_id_follows_last_record_after_deletes<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    add_all(&s, &["1", "2", "3", "4", "5"])?;
    for id in ["3", "4"] {
        s.delete(id).map_err(|e| format!("delete {id}: {e}"))?;
    }
    expect_ids(&s, &[1, 2, 5])?;

    let task = s.add("6").map_err(|e| format!("add: {e}"))?;
    if task.id != 6 {
        return Err(format!("expected id 6, got {}", task.id));
    }
    Ok(())
}

/// Ids are not historically unique: removing the tail frees its id.
fn deleting_the_last_task_reuses_its_id<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    add_all(&s, &["a", "b", "c"])?;
    s.delete("3").map_err(|e| format!("delete: {e}"))?;
    let task = s.add("d").map_err(|e| format!("add: {e}"))?;
    if task.id != 3 {
        return Err(format!("expected id 3 to be reused, got {}", task.id));
    }
    Ok(())
}

fn emptied_store_starts_again_at_1<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    add_all(&s, &["a", "b"])?;
    for id in ["1", "2"] {
        s.delete(id).map_err(|e| format!("delete {id}: {e}"))?;
    }
    let remaining = all_ids(&s)?;
    if !remaining.is_empty() {
        return Err(format!("expected empty store, got {remaining:?}"));
    }
    let task = s.add("c").map_err(|e| format!("add: {e}"))?;
    if task.id != 1 {
        return Err(format!("expected id 1, got {}", task.id));
    }
    Ok(())
}
