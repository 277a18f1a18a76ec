//! Release Reconciler - recreate a GitHub release at a tag from CI.

use release_reconciler::cli;
use std::process;

/// Log level used unless RUST_LOG says otherwise
fn default_log_filter() -> &'static str {
    // Set by the runner when a workflow is re-run with debug logging
    if std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1") {
        "debug"
    } else {
        "info"
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_log_filter()))
        .init();

    process::exit(cli::run().await);
}
