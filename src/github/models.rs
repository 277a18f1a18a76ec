//! Wire types for the GitHub REST endpoints the reconciler touches.

use serde::{Deserialize, Serialize};

/// A release as returned by the releases endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Numeric release id
    pub id: u64,
    /// Tag the release is attached to
    pub tag_name: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Release notes
    #[serde(default)]
    pub body: Option<String>,
    /// Draft flag
    #[serde(default)]
    pub draft: bool,
    /// Prerelease flag
    #[serde(default)]
    pub prerelease: bool,
    /// Human-facing release page
    #[serde(default)]
    pub html_url: String,
    /// Asset upload endpoint template
    #[serde(default)]
    pub upload_url: String,
}

/// A git reference (`refs/tags/<tag>`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    /// Full ref name, e.g. `refs/tags/v1.0.0`
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Object the ref points at
    pub object: GitObject,
}

impl TagRef {
    /// Commit (or tag object) hash the ref points at
    pub fn sha(&self) -> &str {
        &self.object.sha
    }
}

/// Target of a git reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitObject {
    /// Object hash
    pub sha: String,
    /// Object type (`commit` or `tag`)
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Payload for creating a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    /// Tag to attach the release to (created by GitHub if missing)
    pub tag_name: String,
    /// Display name
    pub name: String,
    /// Release notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Draft flag
    pub draft: bool,
    /// Prerelease flag
    pub prerelease: bool,
}

/// Partial update of an existing release; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseUpdate {
    /// New tag association
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New release notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Payload for force-moving a ref
#[derive(Debug, Serialize)]
pub(crate) struct RefUpdate<'a> {
    pub sha: &'a str,
    pub force: bool,
}

/// Payload for creating a ref
#[derive(Debug, Serialize)]
pub(crate) struct RefCreate<'a> {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: &'a str,
}

/// Error body returned by the API
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}
