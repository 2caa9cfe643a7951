//! Tracing setup for the CLI.
//!
//! Logs go to stderr so stdout carries only command output. `RUST_LOG` wins
//! when set; otherwise the level is `warn`, or `debug` for our crates with
//! `--verbose`.

use std::io;
use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default = if verbose {
        "warn,workout=debug,workoutapp=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(verbose)
        .try_init();
}
