//! Conformance test suite for `TaskStorage` implementations.
//!
//! This module provides a backend-agnostic test suite that any `TaskStorage`
//! implementation can run to verify it behaves like the reference store.
//! The suite covers:
//!
//! - **Ids**: first id is 1, next id is the last record's id plus one
//! - **Listing**: completed-task filtering, file order, empty stores
//! - **Mutation**: complete idempotence, string-exact id matching,
//!   delete removing exactly the addressed task, no-op success
//! - **Round-trip**: descriptions with delimiters, quotes, and line breaks
//! - **Concurrency**: simultaneous adds get distinct, sequential ids
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function that
//! creates a fresh, empty storage instance for each test:
//!
//! ```ignore
//! use tasks_storage::conformance::run_conformance_suite;
//!
//! #[test]
//! fn file_store_conformance() {
//!     let dir = tempfile::TempDir::new().unwrap();
//!     let counter = std::sync::atomic::AtomicUsize::new(0);
//!     let report = run_conformance_suite(|| {
//!         let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
//!         FileStore::open(dir.path().join(format!("tasks-{n}.csv")))
//!     });
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod concurrent;
mod ids;
mod list;
mod mutate;
mod roundtrip;

use std::fmt;

use crate::TaskStorage;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "ids", "list", "mutate").
    pub category: String,
    /// Test name (e.g. "first_task_gets_id_1").
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// storage instance, ensuring test isolation.
pub fn run_conformance_suite<S, F>(factory: F) -> ConformanceReport
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let mut results = Vec::new();

    results.extend(ids::run_id_tests(&factory));
    results.extend(list::run_list_tests(&factory));
    results.extend(mutate::run_mutate_tests(&factory));
    results.extend(roundtrip::run_roundtrip_tests(&factory));
    results.extend(concurrent::run_concurrent_tests(&factory));

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Add each description in order, failing on the first storage error.
fn add_all<S: TaskStorage>(s: &S, descriptions: &[&str]) -> Result<(), String> {
    for d in descriptions {
        s.add(d).map_err(|e| format!("add {d:?}: {e}"))?;
    }
    Ok(())
}

/// Ids of every task (completed included), in store order.
fn all_ids<S: TaskStorage>(s: &S) -> Result<Vec<u64>, String> {
    Ok(s.list(true)
        .map_err(|e| format!("list: {e}"))?
        .iter()
        .map(|t| t.id)
        .collect())
}

fn expect_ids<S: TaskStorage>(s: &S, expected: &[u64]) -> Result<(), String> {
    let ids = all_ids(s)?;
    if ids != expected {
        return Err(format!("expected ids {expected:?}, got {ids:?}"));
    }
    Ok(())
}
