use std::io::Write;

use serde::Serialize;
use tasks_storage::{CompleteOutcome, TaskStorage};

use crate::{CommandError, OutputFormat};

#[derive(Serialize)]
struct CompleteReport<'a> {
    id: &'a str,
    outcome: &'static str,
}

fn outcome_name(outcome: CompleteOutcome) -> &'static str {
    match outcome {
        CompleteOutcome::Completed => "completed",
        CompleteOutcome::AlreadyComplete => "already_complete",
        CompleteOutcome::NotFound => "not_found",
    }
}

/// An unknown id is reported the same way as a real completion; the
/// distinction is only visible in JSON output and the log.
pub(crate) fn cmd_complete<S: TaskStorage, W: Write>(
    store: &S,
    task_id: &str,
    output: OutputFormat,
    quiet: bool,
    out: &mut W,
) -> Result<(), CommandError> {
    let outcome = store.complete(task_id)?;

    if quiet {
        return Ok(());
    }
    match output {
        OutputFormat::Text => writeln!(out, "Marked task {} as complete.", task_id)?,
        OutputFormat::Json => {
            let report = CompleteReport {
                id: task_id,
                outcome: outcome_name(outcome),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
    }
    Ok(())
}
