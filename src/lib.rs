//! # Release Reconciler
//!
//! Recreate a GitHub release at a tag from a CI pipeline.
//!
//! Given a target tag, the reconciler:
//!
//! 1. records the commit the tag currently points at,
//! 2. moves any release already at the tag to a backup tag (renaming it and
//!    marking its body) or deletes it, then deletes the tag itself,
//! 3. creates the new release,
//! 4. reports its `id`, `html_url` and `upload_url` as step outputs.
//!
//! Absence of a release or tag is expected and tolerated throughout cleanup.
//! Other cleanup failures are logged and the release is still created, unless
//! `--cleanup-failures fail` is given. Only a failed creation always fails the run.
//!
//! ## Usage
//!
//! ```bash
//! release_reconciler --tag-name refs/tags/v2.0.0 --release-name v2.0.0
//! release_reconciler --tag-name nightly --backup-tag-name nightly-previous --release-name Nightly
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod action;
pub mod cli;
pub mod error;
pub mod github;
pub mod reconcile;

// Re-export main types for public API
pub use action::{RawInputs, ReleaseRequest, StepOutputs};
pub use cli::Args;
pub use error::{FailureKind, GitHubError, InputError, ReleaseError, Result};
pub use github::{GitHubClient, ReleaseApi, Repository};
pub use reconcile::{
    CleanupPolicy, CleanupReport, ConsistencyConfig, CreatedRelease, PriorRelease,
    ReconcileConfig, ReconcileOutcome, ReleaseReconciler,
};
