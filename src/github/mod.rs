//! GitHub integration for release operations

mod client;
mod models;

pub use client::{DEFAULT_API_URL, GitHubClient, Repository};
pub use models::{GitObject, NewRelease, Release, ReleaseUpdate, TagRef};

use crate::error::GitHubError;

/// Result type for remote calls
pub type ApiResult<T> = std::result::Result<T, GitHubError>;

/// Remote operations the reconciler consumes.
///
/// Tags are bare names (`v1.0.0`, not `refs/tags/v1.0.0`). Implementations must
/// report absence as [`GitHubError::NotFound`] so callers can tell it apart from
/// every other failure.
#[allow(async_fn_in_trait)]
pub trait ReleaseApi {
    /// Read `refs/tags/<tag>`
    async fn get_tag_ref(&self, tag: &str) -> ApiResult<TagRef>;

    /// Find the release attached to `tag`
    async fn get_release_by_tag(&self, tag: &str) -> ApiResult<Release>;

    /// Delete a release (the tag is left in place)
    async fn delete_release(&self, release_id: u64) -> ApiResult<()>;

    /// Update tag association, name or body of a release
    async fn update_release(&self, release_id: u64, update: &ReleaseUpdate) -> ApiResult<Release>;

    /// Point `refs/tags/<tag>` at `sha`, optionally forcing a non-fast-forward
    async fn update_tag_ref(&self, tag: &str, sha: &str, force: bool) -> ApiResult<TagRef>;

    /// Create `refs/tags/<tag>` at `sha`
    async fn create_tag_ref(&self, tag: &str, sha: &str) -> ApiResult<TagRef>;

    /// Delete `refs/tags/<tag>`
    async fn delete_tag_ref(&self, tag: &str) -> ApiResult<()>;

    /// Create a release
    async fn create_release(&self, release: &NewRelease) -> ApiResult<Release>;
}
