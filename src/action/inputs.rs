//! Input normalization.
//!
//! Tag-like inputs may arrive as full refs (`refs/tags/v1.2.3`); the first
//! occurrence of the ref namespace is removed to get the bare tag name.

use crate::error::InputError;

/// Ref namespace for tags
pub const TAG_REF_PREFIX: &str = "refs/tags/";

/// Remove the first occurrence of `refs/tags/` from `value`
pub fn strip_ref_prefix(value: &str) -> String {
    value.replacen(TAG_REF_PREFIX, "", 1)
}

/// A flag is set only when its input is exactly `"true"`
pub fn parse_flag(value: Option<&str>) -> bool {
    value.map(str::trim) == Some("true")
}

/// Trim an optional input; blank values count as absent
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Trimmed, non-empty required input
pub fn required(name: &str, value: Option<&str>) -> Result<String, InputError> {
    optional(value).ok_or_else(|| InputError::MissingInput {
        name: name.to_string(),
    })
}

/// Raw step inputs, as supplied by the workflow or command line
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    /// `tag_name`
    pub tag_name: Option<String>,
    /// `backup_tag_name`
    pub backup_tag_name: Option<String>,
    /// `release_name`
    pub release_name: Option<String>,
    /// `body`
    pub body: Option<String>,
    /// `draft`
    pub draft: Option<String>,
    /// `prerelease`
    pub prerelease: Option<String>,
}

/// Normalized description of the release to (re)create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Bare target tag
    pub tag: String,
    /// Bare backup tag; `None` deletes the prior release instead of archiving it
    pub backup_tag: Option<String>,
    /// Display name for the new release
    pub release_name: String,
    /// Release notes
    pub body: Option<String>,
    /// Create as draft
    pub draft: bool,
    /// Mark as prerelease
    pub prerelease: bool,
}

impl ReleaseRequest {
    /// Validate and normalize raw inputs
    pub fn from_inputs(raw: &RawInputs) -> Result<Self, InputError> {
        let tag = strip_ref_prefix(&required("tag_name", raw.tag_name.as_deref())?);
        let release_name =
            strip_ref_prefix(&required("release_name", raw.release_name.as_deref())?);
        let backup_tag = optional(raw.backup_tag_name.as_deref())
            .map(|t| strip_ref_prefix(&t))
            .filter(|t| !t.is_empty());

        if tag.is_empty() {
            return Err(InputError::InvalidInput {
                name: "tag_name".to_string(),
                reason: "tag name is empty once the ref prefix is removed".to_string(),
            });
        }

        if backup_tag.as_deref() == Some(tag.as_str()) {
            return Err(InputError::InvalidInput {
                name: "backup_tag_name".to_string(),
                reason: format!("backup tag must differ from the release tag '{}'", tag),
            });
        }

        Ok(Self {
            tag,
            backup_tag,
            release_name,
            body: optional(raw.body.as_deref()),
            draft: parse_flag(raw.draft.as_deref()),
            prerelease: parse_flag(raw.prerelease.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(tag: &str, backup: &str, name: &str) -> RawInputs {
        RawInputs {
            tag_name: Some(tag.to_string()),
            backup_tag_name: Some(backup.to_string()),
            release_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_strip_ref_prefix() {
        assert_eq!(strip_ref_prefix("refs/tags/v1.10.15"), "v1.10.15");
        assert_eq!(strip_ref_prefix("v1.10.15"), "v1.10.15");
        // Only the first occurrence is removed
        assert_eq!(strip_ref_prefix("refs/tags/refs/tags/x"), "refs/tags/x");
        assert_eq!(strip_ref_prefix("refs/heads/main"), "refs/heads/main");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some(" true\n")));
        assert!(!parse_flag(Some("True")));
        assert!(!parse_flag(Some("yes")));
        assert!(!parse_flag(Some("1")));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_request_normalization() {
        let request = ReleaseRequest::from_inputs(&raw(
            "refs/tags/v2.0.0",
            "refs/tags/backup",
            "refs/tags/v2.0.0",
        ))
        .expect("valid inputs");

        assert_eq!(request.tag, "v2.0.0");
        assert_eq!(request.backup_tag.as_deref(), Some("backup"));
        assert_eq!(request.release_name, "v2.0.0");
        assert_eq!(request.body, None);
        assert!(!request.draft);
        assert!(!request.prerelease);
    }

    #[test]
    fn test_empty_backup_means_delete_mode() {
        let request = ReleaseRequest::from_inputs(&raw("v1", "  ", "Version 1")).expect("valid");
        assert_eq!(request.backup_tag, None);

        let request = ReleaseRequest::from_inputs(&raw("v1", "refs/tags/", "Version 1")).expect("valid");
        assert_eq!(request.backup_tag, None);
    }

    #[test]
    fn test_missing_required_inputs() {
        let err = ReleaseRequest::from_inputs(&RawInputs {
            release_name: Some("x".to_string()),
            ..Default::default()
        })
        .expect_err("tag_name is required");
        assert!(matches!(err, InputError::MissingInput { ref name } if name == "tag_name"));

        let err = ReleaseRequest::from_inputs(&raw("v1", "", "   "))
            .expect_err("release_name is required");
        assert!(matches!(err, InputError::MissingInput { ref name } if name == "release_name"));
    }

    #[test]
    fn test_backup_equal_to_tag_rejected() {
        let err = ReleaseRequest::from_inputs(&raw("refs/tags/v1", "v1", "v1"))
            .expect_err("same slot");
        assert!(matches!(err, InputError::InvalidInput { ref name, .. } if name == "backup_tag_name"));
    }

    #[test]
    fn test_body_and_flags_pass_through() {
        let mut inputs = raw("v1", "", "v1");
        inputs.body = Some("line one\nline two\n".to_string());
        inputs.draft = Some("true".to_string());
        inputs.prerelease = Some("false".to_string());

        let request = ReleaseRequest::from_inputs(&inputs).expect("valid");
        assert_eq!(request.body.as_deref(), Some("line one\nline two"));
        assert!(request.draft);
        assert!(!request.prerelease);
    }
}
