use super::TestResult;
use crate::TaskStorage;

/// Descriptions that stress the on-disk quoting rules.
const AWKWARD: &[&str] = &[
    "call Bob, then Alice",
    "the \"important\" one",
    "first line\nsecond line",
    "windows\r\nbreak",
    "bare\rreturn",
    "  leading and trailing spaces  ",
    "\"",
    ",,,",
    "",
    "unicode: żółw ✓ 日本",
];

pub(super) fn run_roundtrip_tests<S, F>(factory: &F) -> Vec<TestResult>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    vec![
        TestResult::from_result(
            "roundtrip",
            "awkward_descriptions_read_back_unchanged",
            awkward_descriptions_read_back_unchanged(factory),
        ),
        TestResult::from_result(
            "roundtrip",
            "rewrites_preserve_other_tasks",
            rewrites_preserve_other_tasks(factory),
        ),
        TestResult::from_result(
            "roundtrip",
            "crlf_in_descriptions_is_stored_as_lf",
            crlf_in_descriptions_is_stored_as_lf(factory),
        ),
    ]
}

fn crlf_in_descriptions_is_stored_as_lf<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    let added = s.add("one\r\ntwo").map_err(|e| format!("add: {e}"))?;
    if added.description != "one\ntwo" {
        return Err(format!("add returned {:?}", added.description));
    }
    let listed = s.list(true).map_err(|e| format!("list: {e}"))?;
    match listed.as_slice() {
        [task] if task.description == "one\ntwo" => Ok(()),
        other => Err(format!("expected one task reading \"one\\ntwo\", got {other:?}")),
    }
}

fn awkward_descriptions_read_back_unchanged<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    let mut added = Vec::new();
    for d in AWKWARD {
        added.push(s.add(d).map_err(|e| format!("add {d:?}: {e}"))?);
    }

    let listed = s.list(true).map_err(|e| format!("list: {e}"))?;
    if listed != added {
        return Err(format!(
            "listed tasks differ from added tasks:\n  added:  {added:?}\n  listed: {listed:?}"
        ));
    }
    Ok(())
}

/// Completing and deleting rewrite the collection; untouched tasks must
/// come back identical, timestamps included.
fn rewrites_preserve_other_tasks<S, F>(factory: &F) -> Result<(), String>
where
    S: TaskStorage,
    F: Fn() -> S,
{
    let s = factory();
    let mut added = Vec::new();
    for d in AWKWARD {
        added.push(s.add(d).map_err(|e| format!("add {d:?}: {e}"))?);
    }

    s.complete("2").map_err(|e| format!("complete: {e}"))?;
    s.delete("3").map_err(|e| format!("delete: {e}"))?;

    added[1].is_complete = true;
    added.remove(2);

    let listed = s.list(true).map_err(|e| format!("list: {e}"))?;
    if listed != added {
        return Err(format!(
            "tasks changed by rewrite:\n  expected: {added:?}\n  listed:   {listed:?}"
        ));
    }
    Ok(())
}
