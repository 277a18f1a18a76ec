//! Release reconciliation.
//!
//! Clears whatever occupies the target tag, archiving the previous release
//! under the backup tag when one is configured, then creates the new release.
//! Steps run strictly in order; each mutation is followed by a read-back
//! probe until GitHub reflects it.

mod config;
mod consistency;

pub use config::{
    CleanupPolicy, ConsistencyConfig, ReconcileConfig, SETTLE_ATTEMPTS_ENV, SETTLE_DELAY_ENV,
};
pub use consistency::wait_until_visible;

use crate::action::ReleaseRequest;
use crate::error::{ReleaseError, Result};
use crate::github::{ApiResult, NewRelease, Release, ReleaseApi, ReleaseUpdate};

/// Appended to the name of an archived release
pub const BACKUP_NAME_SUFFIX: &str = " BACKUP";
/// First line of the body of an archived release
pub const BACKUP_BODY_MARKER: &str = "THIS IS A BACKUP";

/// Identifiers of the release that was created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRelease {
    /// Numeric release id
    pub id: u64,
    /// Release page
    pub html_url: String,
    /// Asset upload endpoint template
    pub upload_url: String,
}

impl CreatedRelease {
    /// Step outputs in publication order
    pub fn outputs(&self) -> [(&'static str, String); 3] {
        [
            ("id", self.id.to_string()),
            ("html_url", self.html_url.clone()),
            ("upload_url", self.upload_url.clone()),
        ]
    }
}

impl From<Release> for CreatedRelease {
    fn from(release: Release) -> Self {
        Self {
            id: release.id,
            html_url: release.html_url,
            upload_url: release.upload_url,
        }
    }
}

/// How the backup tag ref ended up at the captured commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupRef {
    /// Existing ref was force-moved
    Moved,
    /// Ref did not exist and was created
    Created,
    /// No usable commit was captured for the target tag, so the ref was left alone
    Skipped,
}

/// What happened to the release that occupied the target tag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PriorRelease {
    /// No release was attached to the target tag (or cleanup did not get that far)
    #[default]
    Absent,
    /// Moved to the backup tag
    Archived {
        /// Id of the archived release
        release_id: u64,
        /// Tag it now lives under
        backup_tag: String,
        /// Id of the older backup that was deleted to make room
        replaced_backup: Option<u64>,
        /// Backup ref handling
        backup_ref: BackupRef,
    },
    /// Deleted outright
    Deleted {
        /// Id of the deleted release
        release_id: u64,
    },
}

/// Record of the cleanup phases
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CleanupReport {
    /// Commit the target tag pointed at before cleanup
    pub prior_sha: Option<String>,
    /// Fate of the release previously at the target tag
    pub prior_release: PriorRelease,
    /// Whether the target tag ref was deleted
    pub tag_ref_deleted: bool,
    /// Failures ignored under [`CleanupPolicy::Ignore`]
    pub suppressed: Vec<String>,
}

/// Result of a successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// The new release
    pub release: CreatedRelease,
    /// What cleanup did
    pub cleanup: CleanupReport,
}

/// Name given to an archived release
pub fn backup_name(release: &Release) -> String {
    let name = release.name.as_deref().unwrap_or(&release.tag_name);
    format!("{}{}", name, BACKUP_NAME_SUFFIX)
}

/// Body given to an archived release: the marker line, then the original body
pub fn backup_body(release: &Release) -> String {
    format!(
        "{}\n{}",
        BACKUP_BODY_MARKER,
        release.body.as_deref().unwrap_or_default()
    )
}

/// Four-phase release reconciler over a [`ReleaseApi`]
pub struct ReleaseReconciler<'a, A> {
    api: &'a A,
    config: ReconcileConfig,
}

impl<'a, A: ReleaseApi> ReleaseReconciler<'a, A> {
    /// Create a reconciler
    pub fn new(api: &'a A, config: ReconcileConfig) -> Self {
        Self { api, config }
    }

    /// Clear the target tag and create the requested release.
    ///
    /// Only creation failures are always fatal. A failure to read the target
    /// tag is logged and recorded. Later cleanup failures other than absence
    /// are recorded under [`CleanupPolicy::Ignore`] and fatal under
    /// [`CleanupPolicy::Fail`].
    pub async fn reconcile(&self, request: &ReleaseRequest) -> Result<ReconcileOutcome> {
        let mut report = CleanupReport::default();

        let prior_sha = self.capture_prior_sha(&request.tag, &mut report).await;
        report.prior_sha = prior_sha;

        if let Err(e) = self.clear_target(request, &mut report).await {
            self.tolerate("clean up previous release", e, &mut report)?;
        }

        let release = self.create_release(request).await?;

        Ok(ReconcileOutcome {
            release,
            cleanup: report,
        })
    }

    /// Phase 1: remember where the target tag points. Never fails the run.
    async fn capture_prior_sha(&self, tag: &str, report: &mut CleanupReport) -> Option<String> {
        match self.api.get_tag_ref(tag).await {
            Ok(tag_ref) => {
                log::info!("Tag {} points at {}", tag, tag_ref.sha());
                Some(tag_ref.object.sha)
            }
            Err(e) if e.is_not_found() => {
                log::info!("Tag {} does not exist yet", tag);
                None
            }
            Err(e) => {
                log::warn!("Could not read tag {}, continuing without its commit: {}", tag, e);
                report.suppressed.push(format!("read tag ref: {}", e));
                None
            }
        }
    }

    /// Phase 2: archive or delete the release at the target tag, then free the tag
    async fn clear_target(&self, request: &ReleaseRequest, report: &mut CleanupReport) -> Result<()> {
        let prior = match self.api.get_release_by_tag(&request.tag).await {
            Ok(release) => release,
            Err(e) if e.is_not_found() => {
                log::info!("No release at tag {}, nothing to clean up", request.tag);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        log::info!(
            "Found release {} ({}) at tag {}",
            prior.id,
            prior.name.as_deref().unwrap_or("unnamed"),
            request.tag
        );

        match request.backup_tag.as_deref() {
            Some(backup_tag) => self.archive(&prior, backup_tag, report).await?,
            None => self.delete_prior(&prior, &request.tag, report).await?,
        }

        self.delete_tag_ref(&request.tag, report).await
    }

    /// Move `prior` into the backup slot
    async fn archive(&self, prior: &Release, backup_tag: &str, report: &mut CleanupReport) -> Result<()> {
        let replaced_backup = match self.remove_previous_backup(backup_tag).await {
            Ok(replaced) => replaced,
            Err(e) => {
                self.tolerate("remove previous backup", e, report)?;
                None
            }
        };

        let update = ReleaseUpdate {
            tag_name: Some(backup_tag.to_string()),
            name: Some(backup_name(prior)),
            body: Some(backup_body(prior)),
        };
        match self.api.update_release(prior.id, &update).await {
            Ok(_) => log::info!("Moved release {} to tag {}", prior.id, backup_tag),
            Err(e) if e.is_not_found() => {
                log::info!("Release {} disappeared before it could be archived", prior.id);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
        wait_until_visible(
            || self.release_attached(backup_tag, prior.id),
            "move release to backup tag",
            &self.config.consistency,
        )
        .await?;

        let backup_ref = match report.prior_sha.clone() {
            Some(sha) => self.pin_backup_ref(backup_tag, &sha).await?,
            None => {
                log::warn!(
                    "No commit recorded for the original tag, leaving tag {} where GitHub put it",
                    backup_tag
                );
                BackupRef::Skipped
            }
        };

        report.prior_release = PriorRelease::Archived {
            release_id: prior.id,
            backup_tag: backup_tag.to_string(),
            replaced_backup,
            backup_ref,
        };
        Ok(())
    }

    /// Delete the release currently at `backup_tag`, if any
    async fn remove_previous_backup(&self, backup_tag: &str) -> Result<Option<u64>> {
        let previous = match self.api.get_release_by_tag(backup_tag).await {
            Ok(release) => release,
            Err(e) if e.is_not_found() => {
                log::debug!("No previous backup at tag {}", backup_tag);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match self.api.delete_release(previous.id).await {
            Ok(()) => log::info!("Deleted previous backup release {}", previous.id),
            Err(e) if e.is_not_found() => {
                log::debug!("Previous backup release {} already gone", previous.id)
            }
            Err(e) => return Err(e.into()),
        }
        wait_until_visible(
            || self.release_absent(backup_tag, previous.id),
            "delete previous backup release",
            &self.config.consistency,
        )
        .await?;

        Ok(Some(previous.id))
    }

    /// Force the backup tag onto the commit the target tag pointed at
    async fn pin_backup_ref(&self, backup_tag: &str, sha: &str) -> Result<BackupRef> {
        let outcome = match self.api.update_tag_ref(backup_tag, sha, true).await {
            Ok(_) => BackupRef::Moved,
            Err(e) if e.is_not_found() => match self.api.create_tag_ref(backup_tag, sha).await {
                Ok(_) => BackupRef::Created,
                Err(e) if e.is_not_found() => {
                    log::warn!("Commit {} is gone, leaving tag {} alone", sha, backup_tag);
                    return Ok(BackupRef::Skipped);
                }
                Err(e) => return Err(e.into()),
            },
            Err(e) => return Err(e.into()),
        };
        log::info!("Tag {} now points at {}", backup_tag, sha);

        wait_until_visible(
            || self.ref_points_at(backup_tag, sha),
            "update backup tag ref",
            &self.config.consistency,
        )
        .await?;
        Ok(outcome)
    }

    /// Delete `prior` without keeping a backup
    async fn delete_prior(&self, prior: &Release, tag: &str, report: &mut CleanupReport) -> Result<()> {
        match self.api.delete_release(prior.id).await {
            Ok(()) => log::info!("Deleted release {}", prior.id),
            Err(e) if e.is_not_found() => log::debug!("Release {} already gone", prior.id),
            Err(e) => return Err(e.into()),
        }
        wait_until_visible(
            || self.release_absent(tag, prior.id),
            "delete release",
            &self.config.consistency,
        )
        .await?;

        report.prior_release = PriorRelease::Deleted {
            release_id: prior.id,
        };
        Ok(())
    }

    async fn delete_tag_ref(&self, tag: &str, report: &mut CleanupReport) -> Result<()> {
        match self.api.delete_tag_ref(tag).await {
            Ok(()) => log::info!("Deleted tag {}", tag),
            Err(e) if e.is_not_found() => {
                log::debug!("Tag {} already absent", tag);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
        wait_until_visible(
            || self.ref_absent(tag),
            "delete tag ref",
            &self.config.consistency,
        )
        .await?;

        report.tag_ref_deleted = true;
        Ok(())
    }

    /// Phase 3: always fatal on failure
    async fn create_release(&self, request: &ReleaseRequest) -> Result<CreatedRelease> {
        let new_release = NewRelease {
            tag_name: request.tag.clone(),
            name: request.release_name.clone(),
            body: request.body.clone(),
            draft: request.draft,
            prerelease: request.prerelease,
        };
        log::info!(
            "Creating release '{}' at tag {} (draft: {}, prerelease: {})",
            new_release.name,
            new_release.tag_name,
            new_release.draft,
            new_release.prerelease
        );

        let release = self.api.create_release(&new_release).await?;
        Ok(release.into())
    }

    /// Apply the cleanup policy to a failure; absence is never one
    fn tolerate(&self, step: &str, error: ReleaseError, report: &mut CleanupReport) -> Result<()> {
        if error.is_not_found() {
            log::info!("Skipping the rest of {}: {}", step, error);
            return Ok(());
        }
        match self.config.cleanup_policy {
            CleanupPolicy::Fail => Err(error),
            CleanupPolicy::Ignore => {
                log::warn!("Ignoring failure to {}: {}", step, error);
                report.suppressed.push(format!("{}: {}", step, error));
                Ok(())
            }
        }
    }

    async fn release_absent(&self, tag: &str, release_id: u64) -> ApiResult<bool> {
        match self.api.get_release_by_tag(tag).await {
            Ok(release) => Ok(release.id != release_id),
            Err(e) if e.is_not_found() => Ok(true),
            Err(e) => Err(e),
        }
    }

    async fn release_attached(&self, tag: &str, release_id: u64) -> ApiResult<bool> {
        match self.api.get_release_by_tag(tag).await {
            Ok(release) => Ok(release.id == release_id),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn ref_points_at(&self, tag: &str, sha: &str) -> ApiResult<bool> {
        match self.api.get_tag_ref(tag).await {
            Ok(tag_ref) => Ok(tag_ref.sha() == sha),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn ref_absent(&self, tag: &str) -> ApiResult<bool> {
        match self.api.get_tag_ref(tag).await {
            Ok(_) => Ok(false),
            Err(e) if e.is_not_found() => Ok(true),
            Err(e) => Err(e),
        }
    }
}
