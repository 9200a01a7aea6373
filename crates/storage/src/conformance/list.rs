use super::{add_all, expect_ids, TestResult};
use crate::TaskStorage;

pub(super) fn run_list_tests<S, F>(factory: &F) -> Vec<TestResult>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    vec![
        TestResult::from_result("list", "empty_store_lists_nothing", empty_store_lists_nothing(factory)),
        TestResult::from_result(
            "list",
            "open_listing_hides_completed",
            open_listing_hides_completed(factory),
        ),
        TestResult::from_result(
            "list",
            "full_listing_keeps_store_order",
            full_listing_keeps_store_order(factory),
        ),
        TestResult::from_result(
            "list",
            "listing_reports_no_issues_for_own_records",
            listing_reports_no_issues_for_own_records(factory),
        ),
    ]
}

fn empty_store_lists_nothing<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    for include_completed in [false, true] {
        let tasks = s
            .list(include_completed)
            .map_err(|e| format!("list({include_completed}): {e}"))?;
        if !tasks.is_empty() {
            return Err(format!("expected no tasks, got {}", tasks.len()));
        }
    }
    Ok(())
}

fn open_listing_hides_completed<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    add_all(&s, &["a", "b", "c", "d"])?;
    for id in ["1", "3"] {
        s.complete(id).map_err(|e| format!("complete {id}: {e}"))?;
    }

    let open = s.list(false).map_err(|e| format!("list: {e}"))?;
    if let Some(done) = open.iter().find(|t| t.is_complete) {
        return Err(format!("open listing contains completed task {}", done.id));
    }
    let ids: Vec<u64> = open.iter().map(|t| t.id).collect();
    if ids != [2, 4] {
        return Err(format!("expected open ids [2, 4], got {ids:?}"));
    }
    Ok(())
}

fn full_listing_keeps_store_order<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    add_all(&s, &["a", "b", "c"])?;
    s.complete("2").map_err(|e| format!("complete: {e}"))?;
    expect_ids(&s, &[1, 2, 3])?;

    let all = s.list(true).map_err(|e| format!("list: {e}"))?;
    let flags: Vec<bool> = all.iter().map(|t| t.is_complete).collect();
    if flags != [false, true, false] {
        return Err(format!("unexpected completion flags {flags:?}"));
    }
    Ok(())
}

fn listing_reports_no_issues_for_own_records<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    add_all(&s, &["plain", "with, comma", "with \"quotes\""])?;
    let listing = s
        .list_with_issues(true)
        .map_err(|e| format!("list_with_issues: {e}"))?;
    if let Some(issue) = listing.issues.first() {
        return Err(format!("unexpected decode issue: {issue}"));
    }
    Ok(())
}
