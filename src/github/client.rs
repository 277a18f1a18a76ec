//! reqwest-backed implementation of [`ReleaseApi`] for the GitHub REST API.

use super::models::{ApiErrorBody, NewRelease, RefCreate, RefUpdate, Release, ReleaseUpdate, TagRef};
use super::{ApiResult, ReleaseApi};
use crate::error::{GitHubError, InputError, ReleaseError, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("release_reconciler/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Message GitHub uses (with HTTP 422) when a ref endpoint addresses a missing ref
const MISSING_REF_MESSAGE: &str = "Reference does not exist";

/// Repository coordinates (`owner/name`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Owning user or organization
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl Repository {
    /// Parse `owner/name`, as found in `GITHUB_REPOSITORY`
    pub fn parse(slug: &str) -> std::result::Result<Self, InputError> {
        let invalid = || InputError::InvalidInput {
            name: "repository".to_string(),
            reason: format!("expected 'owner/repo', got '{}'", slug),
        };

        let (owner, name) = slug.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Authenticated client scoped to one repository
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base: Url,
    repo: Repository,
}

impl GitHubClient {
    /// Create a client for `repo` against `api_url` authenticated with `token`
    pub fn new(api_url: &str, token: &str, repo: Repository) -> Result<Self> {
        let base = Url::parse(api_url).map_err(|e| InputError::InvalidInput {
            name: "api_url".to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(InputError::InvalidInput {
                name: "api_url".to_string(),
                reason: format!("'{}' is not a base URL", api_url),
            }
            .into());
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            InputError::InvalidInput {
                name: "token".to_string(),
                reason: "token contains characters not allowed in an HTTP header".to_string(),
            }
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| {
                ReleaseError::GitHub(GitHubError::Transport {
                    operation: "build HTTP client".to_string(),
                    source,
                })
            })?;

        Ok(Self { http, base, repo })
    }

    /// Repository this client operates on
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// `<base>/repos/<owner>/<repo>/<segments...>`, each segment percent-encoded
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["repos", self.repo.owner.as_str(), self.repo.name.as_str()])
                .extend(segments);
        }
        url
    }

    fn tag_ref_endpoint(&self, lookup: bool, tag: &str) -> Url {
        // GET uses the singular `git/ref`, mutations use `git/refs`
        let refs = if lookup { "ref" } else { "refs" };
        self.endpoint(["git", refs, "tags"].into_iter().chain(tag.split('/')))
    }

    /// Send and map non-success statuses onto [`GitHubError`]
    async fn execute(
        &self,
        operation: &str,
        resource: &str,
        ref_endpoint: bool,
        request: RequestBuilder,
    ) -> ApiResult<Response> {
        let response = request.send().await.map_err(|source| GitHubError::Transport {
            operation: operation.to_string(),
            source,
        })?;

        let status = response.status();
        if status.is_success() {
            log::debug!("{} -> {}", operation, status);
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = classify(operation, resource, status, &body, ref_endpoint);
        log::debug!("{} -> {} ({})", operation, status, error);
        Err(error)
    }

    async fn decode<T: DeserializeOwned>(operation: &str, response: Response) -> ApiResult<T> {
        response.json::<T>().await.map_err(|e| GitHubError::Decode {
            operation: operation.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Map an error response onto [`GitHubError`]
pub(crate) fn classify(
    operation: &str,
    resource: &str,
    status: StatusCode,
    body: &str,
    ref_endpoint: bool,
) -> GitHubError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string());

    let missing_ref = ref_endpoint
        && status == StatusCode::UNPROCESSABLE_ENTITY
        && message.contains(MISSING_REF_MESSAGE);

    if status == StatusCode::NOT_FOUND || missing_ref {
        GitHubError::NotFound {
            resource: resource.to_string(),
        }
    } else {
        GitHubError::Api {
            operation: operation.to_string(),
            status: status.as_u16(),
            message,
        }
    }
}

impl ReleaseApi for GitHubClient {
    async fn get_tag_ref(&self, tag: &str) -> ApiResult<TagRef> {
        let url = self.tag_ref_endpoint(true, tag);
        let resource = format!("tag ref '{}'", tag);
        let response = self
            .execute("get tag ref", &resource, true, self.http.get(url))
            .await?;
        Self::decode("get tag ref", response).await
    }

    async fn get_release_by_tag(&self, tag: &str) -> ApiResult<Release> {
        let url = self.endpoint(["releases", "tags"].into_iter().chain(tag.split('/')));
        let resource = format!("release for tag '{}'", tag);
        let response = self
            .execute("get release by tag", &resource, false, self.http.get(url))
            .await?;
        Self::decode("get release by tag", response).await
    }

    async fn delete_release(&self, release_id: u64) -> ApiResult<()> {
        let id = release_id.to_string();
        let url = self.endpoint(["releases", id.as_str()]);
        let resource = format!("release {}", release_id);
        self.execute("delete release", &resource, false, self.http.delete(url))
            .await?;
        Ok(())
    }

    async fn update_release(&self, release_id: u64, update: &ReleaseUpdate) -> ApiResult<Release> {
        let id = release_id.to_string();
        let url = self.endpoint(["releases", id.as_str()]);
        let resource = format!("release {}", release_id);
        let response = self
            .execute(
                "update release",
                &resource,
                false,
                self.http.patch(url).json(update),
            )
            .await?;
        Self::decode("update release", response).await
    }

    async fn update_tag_ref(&self, tag: &str, sha: &str, force: bool) -> ApiResult<TagRef> {
        let url = self.tag_ref_endpoint(false, tag);
        let resource = format!("tag ref '{}'", tag);
        let response = self
            .execute(
                "update tag ref",
                &resource,
                true,
                self.http.patch(url).json(&RefUpdate { sha, force }),
            )
            .await?;
        Self::decode("update tag ref", response).await
    }

    async fn create_tag_ref(&self, tag: &str, sha: &str) -> ApiResult<TagRef> {
        let url = self.endpoint(["git", "refs"]);
        let resource = format!("tag ref '{}'", tag);
        let payload = RefCreate {
            ref_name: format!("refs/tags/{}", tag),
            sha,
        };
        let response = self
            .execute(
                "create tag ref",
                &resource,
                true,
                self.http.post(url).json(&payload),
            )
            .await?;
        Self::decode("create tag ref", response).await
    }

    async fn delete_tag_ref(&self, tag: &str) -> ApiResult<()> {
        let url = self.tag_ref_endpoint(false, tag);
        let resource = format!("tag ref '{}'", tag);
        self.execute("delete tag ref", &resource, true, self.http.delete(url))
            .await?;
        Ok(())
    }

    async fn create_release(&self, release: &NewRelease) -> ApiResult<Release> {
        let url = self.endpoint(["releases"]);
        let resource = format!("release for tag '{}'", release.tag_name);
        let response = self
            .execute(
                "create release",
                &resource,
                false,
                self.http.post(url).json(release),
            )
            .await?;
        Self::decode("create release", response).await
    }
}
