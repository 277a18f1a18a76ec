//! Command line interface for release_reconciler.
//!
//! Parses inputs, runs the reconciler and reports the result through the
//! terminal and the CI step protocol.

mod args;
pub mod commands;
mod output;

pub use args::{Args, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

/// Main CLI entry point, returning the process exit code
pub async fn run() -> i32 {
    let args = Args::parse_args();
    execute_command(args).await
}
