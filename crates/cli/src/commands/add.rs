use std::io::Write;

use tasks_storage::TaskStorage;

use crate::{CommandError, OutputFormat};

pub(crate) fn cmd_add<S: TaskStorage, W: Write>(
    store: &S,
    description: &str,
    output: OutputFormat,
    quiet: bool,
    out: &mut W,
) -> Result<(), CommandError> {
    let task = store.add(description)?;
    tracing::info!(id = task.id, "task added");

    if quiet {
        return Ok(());
    }
    match output {
        OutputFormat::Text => writeln!(out, "Added task: {}", task.description)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&task)?)?,
    }
    Ok(())
}
