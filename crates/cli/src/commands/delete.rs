use std::io::Write;

use serde::Serialize;
use tasks_storage::TaskStorage;

use crate::{CommandError, OutputFormat};

#[derive(Serialize)]
struct DeleteReport<'a> {
    id: &'a str,
    removed: usize,
}

pub(crate) fn cmd_delete<S: TaskStorage, W: Write>(
    store: &S,
    task_id: &str,
    output: OutputFormat,
    quiet: bool,
    out: &mut W,
) -> Result<(), CommandError> {
    let removed = store.delete(task_id)?;

    if quiet {
        return Ok(());
    }
    match output {
        OutputFormat::Text => writeln!(out, "Deleted task {}.", task_id)?,
        OutputFormat::Json => {
            let report = DeleteReport {
                id: task_id,
                removed,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
    }
    Ok(())
}
