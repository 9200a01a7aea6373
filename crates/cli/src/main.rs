mod commands;
mod humanize;
mod logging;
mod table;

use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tasks_storage::{FileStore, StorageError, StoreConfig, DEFAULT_FILE_NAME};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Errors a command can end with.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CommandError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Personal task tracker.
#[derive(Parser)]
#[command(name = "tasks", version, about = "Track personal tasks in a plain CSV file")]
struct Cli {
    /// Task file to read and write
    #[arg(long, global = true, env = "TASKS_FILE", default_value = DEFAULT_FILE_NAME)]
    file: PathBuf,

    /// Give up waiting for the file lock after this many seconds (default: wait forever)
    #[arg(
        long,
        global = true,
        env = "TASKS_LOCK_TIMEOUT",
        value_name = "SECONDS",
        value_parser = parse_seconds
    )]
    lock_timeout: Option<Duration>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress confirmation messages
    #[arg(long, global = true)]
    quiet: bool,

    /// Log more to stderr (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// What needs doing
        description: String,
    },

    /// List tasks
    List {
        /// Show all tasks, including completed ones
        #[arg(short, long)]
        all: bool,
    },

    /// Complete a task
    Complete {
        /// Id of the task, exactly as shown by `list`
        taskid: String,
    },

    /// Delete a task
    Delete {
        /// Id of the task, exactly as shown by `list`
        taskid: String,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = StoreConfig::new(&cli.file);
    if let Some(timeout) = cli.lock_timeout {
        config = config.with_lock_timeout(timeout);
    }
    let store = FileStore::new(config);
    tracing::debug!(file = %cli.file.display(), "using task file");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = match cli.command {
        Commands::Add { description } => {
            commands::add::cmd_add(&store, &description, cli.output, cli.quiet, &mut out)
        }
        Commands::List { all } => commands::list::cmd_list(&store, all, cli.output, &mut out),
        Commands::Complete { taskid } => {
            commands::complete::cmd_complete(&store, &taskid, cli.output, cli.quiet, &mut out)
        }
        Commands::Delete { taskid } => {
            commands::delete::cmd_delete(&store, &taskid, cli.output, cli.quiet, &mut out)
        }
    };

    drop(out);

    if let Err(e) = result {
        report_error(&e.to_string(), cli.output);
        process::exit(1);
    }
}

fn parse_seconds(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("'{raw}' is not a valid timeout"))
}

pub(crate) fn report_error(msg: &str, output: OutputFormat) {
    match output {
        OutputFormat::Text => eprintln!("Error: {}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn lock_timeout_accepts_fractional_seconds() {
        assert_eq!(parse_seconds("1.5"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_seconds("0"), Ok(Duration::ZERO));
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("soon").is_err());
    }

    #[test]
    fn list_all_has_a_short_flag() {
        let cli = Cli::try_parse_from(["tasks", "list", "-a"]).unwrap();
        assert!(matches!(cli.command, Commands::List { all: true }));
    }

    #[test]
    fn add_takes_exactly_one_description() {
        assert!(Cli::try_parse_from(["tasks", "add"]).is_err());
        assert!(Cli::try_parse_from(["tasks", "add", "a", "b"]).is_err());
        let cli = Cli::try_parse_from(["tasks", "add", "a b"]).unwrap();
        assert!(matches!(cli.command, Commands::Add { description } if description == "a b"));
    }

    #[test]
    fn task_ids_stay_strings() {
        let cli = Cli::try_parse_from(["tasks", "complete", "01"]).unwrap();
        assert!(matches!(cli.command, Commands::Complete { taskid } if taskid == "01"));
    }
}
