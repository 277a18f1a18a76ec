//! Command line argument parsing.
//!
//! Every release input can be given as a flag or through the environment
//! variable the CI runner sets for step inputs (`INPUT_<NAME>`).

use crate::action::RawInputs;
use crate::github::DEFAULT_API_URL;
use clap::Parser;

/// Recreate a GitHub release at a tag
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "release_reconciler",
    version,
    about = "Recreate a GitHub release at a tag, archiving the previous one",
    long_about = "Create a GitHub release at TAG. A release already attached to TAG is moved to
BACKUP_TAG (renamed with a ' BACKUP' suffix) or, without a backup tag, deleted.
The old tag is removed before the new release is created.

Usage:
  release_reconciler --tag-name refs/tags/v2.0.0 --release-name v2.0.0
  release_reconciler --tag-name nightly --backup-tag-name nightly-previous --release-name Nightly

In a workflow step the same values are read from INPUT_TAG_NAME, INPUT_BACKUP_TAG_NAME,
INPUT_RELEASE_NAME, INPUT_BODY, INPUT_DRAFT and INPUT_PRERELEASE. The token is read from
GITHUB_TOKEN (or GH_TOKEN)."
)]
pub struct Args {
    /// Tag to release (a `refs/tags/` prefix is removed)
    #[arg(long, env = "INPUT_TAG_NAME", value_name = "TAG")]
    pub tag_name: Option<String>,

    /// Tag to archive the previous release under; empty deletes it instead
    #[arg(long, env = "INPUT_BACKUP_TAG_NAME", value_name = "BACKUP_TAG")]
    pub backup_tag_name: Option<String>,

    /// Display name of the new release (a `refs/tags/` prefix is removed)
    #[arg(long, env = "INPUT_RELEASE_NAME", value_name = "NAME")]
    pub release_name: Option<String>,

    /// Release notes
    #[arg(long, env = "INPUT_BODY")]
    pub body: Option<String>,

    /// `true` creates a draft release
    #[arg(long, env = "INPUT_DRAFT", value_name = "BOOL")]
    pub draft: Option<String>,

    /// `true` marks the release as a prerelease
    #[arg(long, env = "INPUT_PRERELEASE", value_name = "BOOL")]
    pub prerelease: Option<String>,

    /// Repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY", value_name = "OWNER/REPO")]
    pub repository: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Cleanup errors other than "not found": `ignore` (default) warns and carries on, `fail` aborts
    #[arg(long, env = "INPUT_CLEANUP_FAILURES", value_name = "POLICY")]
    pub cleanup_failures: Option<String>,

    /// Suppress progress output (errors are still shown)
    #[arg(long, short)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Release inputs as given
    pub fn raw_inputs(&self) -> RawInputs {
        RawInputs {
            tag_name: self.tag_name.clone(),
            backup_tag_name: self.backup_tag_name.clone(),
            release_name: self.release_name.clone(),
            body: self.body.clone(),
            draft: self.draft.clone(),
            prerelease: self.prerelease.clone(),
        }
    }

    /// API base URL, falling back to the public endpoint
    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_URL)
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.quiet)
    }
}
