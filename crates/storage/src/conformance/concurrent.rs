use std::collections::BTreeSet;
use std::thread;

use super::{all_ids, TestResult};
use crate::TaskStorage;

/// Number of concurrent callers in each test.
const N: usize = 10;

pub(super) fn run_concurrent_tests<S, F>(factory: &F) -> Vec<TestResult>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    vec![
        TestResult::from_result(
            "concurrent",
            "concurrent_adds_get_distinct_sequential_ids",
            concurrent_adds_get_distinct_sequential_ids(factory),
        ),
        TestResult::from_result(
            "concurrent",
            "concurrent_completes_and_lists_agree",
            concurrent_completes_and_lists_agree(factory),
        ),
    ]
}

// ── Concurrent add: no lost update ──────────────────────────────────────────

/// N threads add one task each through the same store. Every add must
/// succeed, the returned ids must be exactly 1..=N, and every task must be
/// present afterwards.
fn concurrent_adds_get_distinct_sequential_ids<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let storage = factory();

    let returned: Result<Vec<u64>, String> = thread::scope(|scope| {
        let handles: Vec<_> = (0..N)
            .map(|i| {
                let s = &storage;
                scope.spawn(move || {
                    s.add(&format!("task from thread {i}"))
                        .map(|t| t.id)
                        .map_err(|e| format!("add from thread {i}: {e}"))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| "thread panicked".to_string())?)
            .collect()
    });
    let returned = returned?;

    let expected: BTreeSet<u64> = (1..=N as u64).collect();
    let distinct: BTreeSet<u64> = returned.iter().copied().collect();
    if distinct.len() != N {
        return Err(format!("duplicate ids handed out: {returned:?}"));
    }
    if distinct != expected {
        return Err(format!("expected ids 1..={N}, got {distinct:?}"));
    }

    let stored = all_ids(&storage)?;
    let sequential: Vec<u64> = (1..=N as u64).collect();
    if stored != sequential {
        return Err(format!("stored ids out of sequence: {stored:?}"));
    }
    Ok(())
}

// ── Completes racing with readers ───────────────────────────────────────────

/// Completing every task from separate threads while others list must end
/// with every task complete, and no list may fail.
fn concurrent_completes_and_lists_agree<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let storage = factory();
    for i in 0..N {
        storage
            .add(&format!("task {i}"))
            .map_err(|e| format!("seed add: {e}"))?;
    }

    let outcome: Result<(), String> = thread::scope(|scope| {
        let mut handles = Vec::new();
        for id in 1..=N {
            let s = &storage;
            handles.push(scope.spawn(move || {
                s.complete(&id.to_string())
                    .map(|_| ())
                    .map_err(|e| format!("complete {id}: {e}"))
            }));
            handles.push(scope.spawn(move || {
                let tasks = s.list(true).map_err(|e| format!("list: {e}"))?;
                if tasks.len() != N {
                    return Err(format!("reader saw {} tasks, expected {N}", tasks.len()));
                }
                Ok(())
            }));
        }
        for h in handles {
            h.join().map_err(|_| "thread panicked".to_string())??;
        }
        Ok(())
    });
    outcome?;

    let open = storage.list(false).map_err(|e| format!("list: {e}"))?;
    if !open.is_empty() {
        let ids: Vec<u64> = open.iter().map(|t| t.id).collect();
        return Err(format!("tasks left open: {ids:?}"));
    }
    Ok(())
}
