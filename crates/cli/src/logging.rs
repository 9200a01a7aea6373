use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `-v` and `-vv` win over `RUST_LOG`; without either only warnings show.
pub(crate) fn init(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}
