//! In-memory stand-in for the GitHub releases and git refs endpoints.

#![allow(dead_code)]

use release_reconciler::GitHubError;
use release_reconciler::github::{
    ApiResult, GitObject, NewRelease, Release, ReleaseApi, ReleaseUpdate, TagRef,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Commit GitHub assigns to tags it creates implicitly (default branch head)
pub const HEAD_SHA: &str = "headc0mmit";

#[derive(Default)]
struct State {
    releases: Vec<Release>,
    refs: BTreeMap<String, String>,
    next_id: u64,
    calls: Vec<String>,
    /// Injected status and how many more calls it applies to (`None` = all)
    failures: HashMap<String, (u16, Option<u32>)>,
    /// Reads of a deleted tag that still return it, keyed by tag
    lingering_tags: HashMap<String, u32>,
    ghosts: HashMap<String, (String, u32)>,
    /// Releases removed by someone else just before the keyed call runs
    vanishing: HashMap<String, u64>,
}

pub struct FakeGitHub {
    state: Mutex<State>,
}

impl State {
    fn push_release(&mut self, tag: &str, name: Option<&str>, body: Option<&str>, draft: bool) -> Release {
        let id = self.next_id;
        self.next_id += 1;
        let release = Release {
            id,
            tag_name: tag.to_string(),
            name: name.map(str::to_string),
            body: body.map(str::to_string),
            draft,
            prerelease: false,
            html_url: format!("https://github.com/octo/widgets/releases/tag/{}", tag),
            upload_url: format!(
                "https://uploads.github.com/repos/octo/widgets/releases/{}/assets{{?name,label}}",
                id
            ),
        };
        self.releases.push(release.clone());
        release
    }
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 100,
                ..Default::default()
            }),
        }
    }

    pub fn add_tag(&self, tag: &str, sha: &str) {
        let mut state = self.state.lock().unwrap();
        state.refs.insert(tag.to_string(), sha.to_string());
    }

    pub fn add_release(&self, tag: &str, name: &str, body: &str) -> u64 {
        self.insert_release(tag, Some(name), Some(body), false)
    }

    pub fn add_draft_release(&self, tag: &str, name: &str, body: &str) -> u64 {
        self.insert_release(tag, Some(name), Some(body), true)
    }

    fn insert_release(&self, tag: &str, name: Option<&str>, body: Option<&str>, draft: bool) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.push_release(tag, name, body, draft).id
    }

    /// Fail every call to `call` (an operation name like `delete_release`, or a
    /// full call like `get_release_by_tag:backup`) with `status`
    pub fn fail(&self, call: &str, status: u16) {
        let mut state = self.state.lock().unwrap();
        state.failures.insert(call.to_string(), (status, None));
    }

    /// Like [`FakeGitHub::fail`], for the next `times` calls only
    pub fn fail_times(&self, call: &str, status: u16, times: u32) {
        let mut state = self.state.lock().unwrap();
        state.failures.insert(call.to_string(), (status, Some(times)));
    }

    /// Keep returning `tag` for `reads` lookups after it is deleted
    pub fn linger_after_delete(&self, tag: &str, reads: u32) {
        let mut state = self.state.lock().unwrap();
        state.lingering_tags.insert(tag.to_string(), reads);
    }

    /// Delete `release_id` behind the caller's back right before `call`
    pub fn delete_release_on(&self, call: &str, release_id: u64) {
        let mut state = self.state.lock().unwrap();
        state.vanishing.insert(call.to_string(), release_id);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_index(&self, call: &str) -> Option<usize> {
        self.calls().iter().position(|c| c == call)
    }

    pub fn count_calls(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn release(&self, id: u64) -> Option<Release> {
        let state = self.state.lock().unwrap();
        state.releases.iter().find(|r| r.id == id).cloned()
    }

    pub fn release_at(&self, tag: &str) -> Option<Release> {
        let state = self.state.lock().unwrap();
        state.releases.iter().find(|r| r.tag_name == tag).cloned()
    }

    pub fn releases(&self) -> Vec<Release> {
        self.state.lock().unwrap().releases.clone()
    }

    pub fn tag_sha(&self, tag: &str) -> Option<String> {
        self.state.lock().unwrap().refs.get(tag).cloned()
    }

    /// Record the call and apply any injected failure
    fn enter(state: &mut State, operation: &str, target: &str) -> ApiResult<()> {
        let call = format!("{}:{}", operation, target);
        state.calls.push(call.clone());
        if let Some(release_id) = state.vanishing.remove(&call) {
            state.releases.retain(|r| r.id != release_id);
        }

        let key = if state.failures.contains_key(&call) {
            call.clone()
        } else {
            operation.to_string()
        };
        let status = match state.failures.get_mut(&key) {
            Some((_, Some(0))) => None,
            Some((status, Some(remaining))) => {
                *remaining -= 1;
                Some(*status)
            }
            Some((status, None)) => Some(*status),
            None => None,
        };
        match status {
            None => Ok(()),
            Some(404) => Err(not_found(&call)),
            Some(status) => Err(GitHubError::Api {
                operation: operation.to_string(),
                status,
                message: "injected failure".to_string(),
            }),
        }
    }
}

fn not_found(resource: &str) -> GitHubError {
    GitHubError::NotFound {
        resource: resource.to_string(),
    }
}

fn tag_ref(tag: &str, sha: &str) -> TagRef {
    TagRef {
        ref_name: format!("refs/tags/{}", tag),
        object: GitObject {
            sha: sha.to_string(),
            kind: "commit".to_string(),
        },
    }
}

impl ReleaseApi for FakeGitHub {
    async fn get_tag_ref(&self, tag: &str) -> ApiResult<TagRef> {
        let mut state = self.state.lock().unwrap();
        Self::enter(&mut state, "get_tag_ref", tag)?;

        if let Some((sha, reads)) = state.ghosts.get_mut(tag) {
            if *reads > 0 {
                *reads -= 1;
                return Ok(tag_ref(tag, sha));
            }
        }
        state
            .refs
            .get(tag)
            .map(|sha| tag_ref(tag, sha))
            .ok_or_else(|| not_found(tag))
    }

    async fn get_release_by_tag(&self, tag: &str) -> ApiResult<Release> {
        let mut state = self.state.lock().unwrap();
        Self::enter(&mut state, "get_release_by_tag", tag)?;
        state
            .releases
            .iter()
            .find(|r| r.tag_name == tag)
            .cloned()
            .ok_or_else(|| not_found(tag))
    }

    async fn delete_release(&self, release_id: u64) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::enter(&mut state, "delete_release", &release_id.to_string())?;
        let before = state.releases.len();
        state.releases.retain(|r| r.id != release_id);
        if state.releases.len() == before {
            return Err(not_found(&release_id.to_string()));
        }
        Ok(())
    }

    async fn update_release(&self, release_id: u64, update: &ReleaseUpdate) -> ApiResult<Release> {
        let mut state = self.state.lock().unwrap();
        Self::enter(&mut state, "update_release", &release_id.to_string())?;

        let release = state
            .releases
            .iter_mut()
            .find(|r| r.id == release_id)
            .ok_or_else(|| not_found(&release_id.to_string()))?;
        if let Some(tag) = &update.tag_name {
            release.tag_name = tag.clone();
        }
        if let Some(name) = &update.name {
            release.name = Some(name.clone());
        }
        if let Some(body) = &update.body {
            release.body = Some(body.clone());
        }
        let updated = release.clone();

        // Publishing a release at a new tag creates that tag at the default branch head
        if !updated.draft && !state.refs.contains_key(&updated.tag_name) {
            state.refs.insert(updated.tag_name.clone(), HEAD_SHA.to_string());
        }
        Ok(updated)
    }

    async fn update_tag_ref(&self, tag: &str, sha: &str, _force: bool) -> ApiResult<TagRef> {
        let mut state = self.state.lock().unwrap();
        Self::enter(&mut state, "update_tag_ref", tag)?;
        match state.refs.get_mut(tag) {
            Some(current) => {
                *current = sha.to_string();
                Ok(tag_ref(tag, sha))
            }
            None => Err(not_found(tag)),
        }
    }

    async fn create_tag_ref(&self, tag: &str, sha: &str) -> ApiResult<TagRef> {
        let mut state = self.state.lock().unwrap();
        Self::enter(&mut state, "create_tag_ref", tag)?;
        if state.refs.contains_key(tag) {
            return Err(GitHubError::Api {
                operation: "create_tag_ref".to_string(),
                status: 422,
                message: "Reference already exists".to_string(),
            });
        }
        state.refs.insert(tag.to_string(), sha.to_string());
        Ok(tag_ref(tag, sha))
    }

    async fn delete_tag_ref(&self, tag: &str) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::enter(&mut state, "delete_tag_ref", tag)?;
        let sha = state.refs.remove(tag).ok_or_else(|| not_found(tag))?;
        if let Some(reads) = state.lingering_tags.remove(tag) {
            state.ghosts.insert(tag.to_string(), (sha, reads));
        }
        Ok(())
    }

    async fn create_release(&self, release: &NewRelease) -> ApiResult<Release> {
        let mut state = self.state.lock().unwrap();
        Self::enter(&mut state, "create_release", &release.tag_name)?;
        if state.releases.iter().any(|r| r.tag_name == release.tag_name) {
            return Err(GitHubError::Api {
                operation: "create_release".to_string(),
                status: 422,
                message: "Validation Failed: already_exists".to_string(),
            });
        }
        if !release.draft && !state.refs.contains_key(&release.tag_name) {
            state.refs.insert(release.tag_name.clone(), HEAD_SHA.to_string());
        }

        let mut created = state.push_release(
            &release.tag_name,
            Some(&release.name),
            release.body.as_deref(),
            release.draft,
        );
        created.prerelease = release.prerelease;
        if let Some(stored) = state.releases.iter_mut().find(|r| r.id == created.id) {
            stored.prerelease = release.prerelease;
        }
        Ok(created)
    }
}
