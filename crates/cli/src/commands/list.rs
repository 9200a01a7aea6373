use std::io::Write;

use tasks_storage::{Task, TaskStorage};
use time::OffsetDateTime;

use crate::humanize::relative;
use crate::table::Table;
use crate::{CommandError, OutputFormat};

pub(crate) fn cmd_list<S: TaskStorage, W: Write>(
    store: &S,
    all: bool,
    output: OutputFormat,
    out: &mut W,
) -> Result<(), CommandError> {
    let tasks = store.list(all)?;

    match output {
        OutputFormat::Text => render_table(&tasks, all, OffsetDateTime::now_utc()).write_to(out)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&tasks)?)?,
    }
    Ok(())
}

fn render_table(tasks: &[Task], all: bool, now: OffsetDateTime) -> Table {
    let mut header = vec!["ID", "Task", "Created"];
    if all {
        header.push("Done");
    }
    let mut table = Table::new(header);

    for task in tasks {
        let mut row = vec![
            task.id.to_string(),
            single_line(&task.description),
            relative(task.created_at, now),
        ];
        if all {
            row.push(task.is_complete.to_string());
        }
        table.push(row);
    }
    table
}

/// Line breaks and tabs would break the column layout.
fn single_line(description: &str) -> String {
    description
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn task(id: u64, description: &str, created_at: OffsetDateTime, done: bool) -> Task {
        Task {
            id,
            description: description.to_string(),
            created_at,
            is_complete: done,
        }
    }

    fn render(tasks: &[Task], all: bool) -> String {
        let now = datetime!(2024-01-18 10:30:00 UTC);
        let mut out = Vec::new();
        render_table(tasks, all, now).write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn open_tasks_table() {
        let tasks = [
            task(1, "buy milk", datetime!(2024-01-15 10:30:00 UTC), false),
            task(12, "call mum", datetime!(2024-01-18 10:29:50 UTC), false),
        ];
        assert_eq!(
            render(&tasks, false),
            "ID Task     Created\n\
             1  buy milk 3 days ago\n\
             12 call mum a few seconds ago\n"
        );
    }

    #[test]
    fn all_tasks_table_has_done_column() {
        let tasks = [
            task(1, "a", datetime!(2024-01-18 09:30:00 UTC), true),
            task(2, "b", datetime!(2024-01-18 10:29:00 UTC), false),
        ];
        assert_eq!(
            render(&tasks, true),
            "ID Task Created      Done\n\
             1  a    an hour ago  true\n\
             2  b    a minute ago false\n"
        );
    }

    #[test]
    fn empty_listing_prints_only_the_header() {
        assert_eq!(render(&[], false), "ID Task Created\n");
    }

    #[test]
    fn multi_line_descriptions_stay_on_one_row() {
        let tasks = [task(1, "two\nlines", datetime!(2024-01-18 10:30:00 UTC), false)];
        assert!(render(&tasks, false).contains("two lines"));
    }

    #[test]
    fn json_lists_tasks_in_order() {
        let store = tasks_storage::MemoryStore::new();
        for d in ["a", "b"] {
            store.add(d).unwrap();
        }
        let mut out = Vec::new();
        cmd_list(&store, true, OutputFormat::Json, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[1]["description"], "b");
    }
}
