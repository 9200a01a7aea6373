use super::{add_all, expect_ids, TestResult};
use crate::{CompleteOutcome, TaskStorage};

pub(super) fn run_mutate_tests<S, F>(factory: &F) -> Vec<TestResult>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    vec![
        TestResult::from_result("mutate", "complete_is_idempotent", complete_is_idempotent(factory)),
        TestResult::from_result(
            "mutate",
            "complete_matches_ids_as_strings",
            complete_matches_ids_as_strings(factory),
        ),
        TestResult::from_result(
            "mutate",
            "complete_unknown_id_is_noop_success",
            complete_unknown_id_is_noop_success(factory),
        ),
        TestResult::from_result(
            "mutate",
            "delete_removes_exactly_one",
            delete_removes_exactly_one(factory),
        ),
        TestResult::from_result(
            "mutate",
            "delete_matches_ids_as_strings",
            delete_matches_ids_as_strings(factory),
        ),
        TestResult::from_result(
            "mutate",
            "delete_unknown_id_is_noop_success",
            delete_unknown_id_is_noop_success(factory),
        ),
        TestResult::from_result(
            "mutate",
            "mutations_on_empty_store_succeed",
            mutations_on_empty_store_succeed(factory),
        ),
    ]
}

fn completion_flags<S: TaskStorage>(s: &S) -> Result<Vec<bool>, String> {
    Ok(s.list(true)
        .map_err(|e| format!("list: {e}"))?
        .iter()
        .map(|t| t.is_complete)
        .collect())
}

fn complete_is_idempotent<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    add_all(&s, &["a", "b"])?;

    let first = s.complete("1").map_err(|e| format!("first complete: {e}"))?;
    if first != CompleteOutcome::Completed {
        return Err(format!("first complete: expected Completed, got {first:?}"));
    }
    let second = s.complete("1").map_err(|e| format!("second complete: {e}"))?;
    if second != CompleteOutcome::AlreadyComplete {
        return Err(format!("second complete: expected AlreadyComplete, got {second:?}"));
    }

    let flags = completion_flags(&s)?;
    if flags != [true, false] {
        return Err(format!("expected flags [true, false], got {flags:?}"));
    }
    Ok(())
}

fn complete_matches_ids_as_strings<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    add_all(&s, &["a"])?;
    for id in ["01", "+1", " 1", "1.0"] {
        let outcome = s.complete(id).map_err(|e| format!("complete {id:?}: {e}"))?;
        if outcome != CompleteOutcome::NotFound {
            return Err(format!("{id:?} must not address task 1, got {outcome:?}"));
        }
    }
    let flags = completion_flags(&s)?;
    if flags != [false] {
        return Err(format!("task 1 was mutated: {flags:?}"));
    }
    Ok(())
}

fn complete_unknown_id_is_noop_success<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    add_all(&s, &["a", "b"])?;
    let outcome = s.complete("9").map_err(|e| format!("complete: {e}"))?;
    if outcome != CompleteOutcome::NotFound {
        return Err(format!("expected NotFound, got {outcome:?}"));
    }
    let flags = completion_flags(&s)?;
    if flags != [false, false] {
        return Err(format!("store changed: {flags:?}"));
    }
    Ok(())
}

fn delete_removes_exactly_one<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    add_all(&s, &["a", "b", "c"])?;
    let removed = s.delete("2").map_err(|e| format!("delete: {e}"))?;
    if removed != 1 {
        return Err(format!("expected 1 removed, got {removed}"));
    }
    expect_ids(&s, &[1, 3])
}

fn delete_matches_ids_as_strings<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    add_all(&s, &["a", "b"])?;
    let removed = s.delete("02").map_err(|e| format!("delete: {e}"))?;
    if removed != 0 {
        return Err(format!("\"02\" must not address task 2, removed {removed}"));
    }
    expect_ids(&s, &[1, 2])
}

fn delete_unknown_id_is_noop_success<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    add_all(&s, &["a"])?;
    for id in ["7", "", "abc"] {
        let removed = s.delete(id).map_err(|e| format!("delete {id:?}: {e}"))?;
        if removed != 0 {
            return Err(format!("delete {id:?} removed {removed}"));
        }
    }
    expect_ids(&s, &[1])
}

fn mutations_on_empty_store_succeed<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    let outcome = s.complete("1").map_err(|e| format!("complete: {e}"))?;
    if outcome != CompleteOutcome::NotFound {
        return Err(format!("expected NotFound, got {outcome:?}"));
    }
    let removed = s.delete("1").map_err(|e| format!("delete: {e}"))?;
    if removed != 0 {
        return Err(format!("expected nothing removed, got {removed}"));
    }
    expect_ids(&s, &[])
}
