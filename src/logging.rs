use std::fs::{self, OpenOptions};
use std::path::Path;

use env_logger::{Builder, Env, Target};

const DEFAULT_FILTER: &str = "typeboard=info";

fn builder() -> Builder {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
}

/// Logs to `path`, appending. Used while the TUI owns the terminal.
pub fn init_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    // a second init (tests, repeated runs in one process) keeps the first logger
    let _ = builder()
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init();
    Ok(())
}

/// Logs to stderr for the non-interactive subcommands.
pub fn init_stderr() {
    let _ = builder().target(Target::Stderr).try_init();
}
