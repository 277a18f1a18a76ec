//! Command execution.

mod release;

use crate::action::error_annotation;
use crate::cli::{Args, RuntimeConfig};
use crate::error::ReleaseError;

use release::execute_release;

/// Execute the release and map the outcome onto a process exit code.
///
/// Failures are reported here, once, so callers only see the code.
pub async fn execute_command(args: Args) -> i32 {
    let config = RuntimeConfig::from(&args);

    match execute_release(&args, &config).await {
        Ok(()) => 0,
        Err(e) => {
            report_failure(&config, &e);
            1
        }
    }
}

/// Print the failure for humans and annotate the step for the runner
fn report_failure(config: &RuntimeConfig, error: &ReleaseError) {
    log::debug!("Release failed: {:?}", error);
    config.error_println(&format!("Release failed: {}", error));
    println!("{}", error_annotation(&error.to_string()));

    let suggestions = error.recovery_suggestions();
    if !suggestions.is_empty() {
        config.println("\n💡 Recovery suggestions:");
        for suggestion in suggestions {
            config.println(&format!("  • {}", suggestion));
        }
    }
}
