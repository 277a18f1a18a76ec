//! Release command: validate inputs, reconcile, publish outputs.

use crate::action::{ReleaseRequest, StepOutputs, required};
use crate::cli::{Args, RuntimeConfig};
use crate::error::{InputError, Result};
use crate::github::{GitHubClient, Repository};
use crate::reconcile::{
    BackupRef, CleanupPolicy, CleanupReport, ConsistencyConfig, PriorRelease, ReconcileConfig,
    ReleaseReconciler,
};

/// Environment variables checked for the API token, in order
const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Execute release command
pub(super) async fn execute_release(args: &Args, config: &RuntimeConfig) -> Result<()> {
    // Everything that can fail without the network is checked first
    let request = ReleaseRequest::from_inputs(&args.raw_inputs())?;
    let repository = Repository::parse(&required("repository", args.repository.as_deref())?)?;
    let cleanup_policy: CleanupPolicy = args.cleanup_failures.as_deref().unwrap_or_default().parse()?;
    let token = read_token()?;

    let reconcile_config = ReconcileConfig {
        cleanup_policy,
        consistency: ConsistencyConfig::from_env(),
    };
    log::debug!("Reconcile config: {:?}", reconcile_config);

    let client = GitHubClient::new(args.api_url(), &token, repository)?;

    let _ = config.output().section(&format!(
        "Releasing {} in {}",
        request.tag,
        client.repository()
    ));
    let outcome = ReleaseReconciler::new(&client, reconcile_config)
        .reconcile(&request)
        .await;
    let _ = config.output().end_section();
    let outcome = outcome?;

    describe_cleanup(config, &request, &outcome.cleanup);

    StepOutputs::from_env().set_all(&outcome.release.outputs())?;

    config.success_println(&format!(
        "Created release {} at tag {}: {}",
        outcome.release.id, request.tag, outcome.release.html_url
    ));
    Ok(())
}

/// Token from the environment; never logged
fn read_token() -> Result<String> {
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .ok_or_else(|| InputError::MissingToken.into())
}

fn describe_cleanup(config: &RuntimeConfig, request: &ReleaseRequest, report: &CleanupReport) {
    match &report.prior_release {
        PriorRelease::Absent => config.indent(&format!("No previous release at {}", request.tag)),
        PriorRelease::Deleted { release_id } => {
            config.indent(&format!("Deleted previous release {}", release_id))
        }
        PriorRelease::Archived {
            release_id,
            backup_tag,
            replaced_backup,
            backup_ref,
        } => {
            if let Some(old) = replaced_backup {
                config.indent(&format!("Deleted older backup release {}", old));
            }
            config.indent(&format!("Archived release {} as {}", release_id, backup_tag));
            if *backup_ref == BackupRef::Skipped {
                config.warning_println(&format!(
                    "Tag {} was not pinned: {} had no commit to copy",
                    backup_tag, request.tag
                ));
            }
        }
    }

    if report.tag_ref_deleted {
        config.indent(&format!("Deleted tag {}", request.tag));
    }

    for failure in &report.suppressed {
        config.warning_println(&format!("Ignored cleanup failure: {}", failure));
    }
}
