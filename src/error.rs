//! Error types for release reconciliation.
//!
//! Remote failures are classified into "not found" and everything else, so the
//! cleanup phases can tolerate absence without hiding real failures.

use thiserror::Error;

/// Result type alias for release_reconciler operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release_reconciler operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Input validation errors (raised before any remote call)
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// GitHub API errors
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// A mutation was not observable within the polling budget
    #[error("GitHub did not reflect '{operation}' after {attempts} check(s)")]
    Consistency {
        /// Mutation that was being waited on
        operation: String,
        /// Number of probes issued
        attempts: u32,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Input errors
#[derive(Error, Debug)]
pub enum InputError {
    /// Required input missing or empty
    #[error("Input required and not supplied: {name}")]
    MissingInput {
        /// Input name
        name: String,
    },

    /// No API token in the environment
    #[error("No GitHub token found. Set GITHUB_TOKEN or GH_TOKEN")]
    MissingToken,

    /// Input present but unusable
    #[error("Invalid input '{name}': {reason}")]
    InvalidInput {
        /// Input name
        name: String,
        /// Reason for the error
        reason: String,
    },
}

/// Coarse classification of a remote failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The addressed resource does not exist
    NotFound,
    /// Anything else: permissions, rate limits, server errors, transport
    Other,
}

/// GitHub API errors
#[derive(Error, Debug)]
pub enum GitHubError {
    /// Resource does not exist
    #[error("{resource} not found")]
    NotFound {
        /// Resource that was addressed
        resource: String,
    },

    /// The API answered with a non-success status
    #[error("{operation} failed with HTTP {status}: {message}")]
    Api {
        /// Operation that failed
        operation: String,
        /// HTTP status code
        status: u16,
        /// Message from the response body
        message: String,
    },

    /// Request could not be sent or the connection failed
    #[error("{operation} failed: {source}")]
    Transport {
        /// Operation that failed
        operation: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Response body could not be decoded
    #[error("{operation} returned an unexpected response: {reason}")]
    Decode {
        /// Operation that failed
        operation: String,
        /// Reason for the error
        reason: String,
    },
}

impl GitHubError {
    /// Classify this failure
    pub fn kind(&self) -> FailureKind {
        match self {
            GitHubError::NotFound { .. } => FailureKind::NotFound,
            _ => FailureKind::Other,
        }
    }

    /// Whether the addressed resource is absent
    pub fn is_not_found(&self) -> bool {
        self.kind() == FailureKind::NotFound
    }

    /// HTTP status, when the API answered
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::NotFound { .. } => Some(404),
            GitHubError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Input(InputError::MissingInput { name }) => vec![
                format!("Set the '{}' input in the workflow step", name),
                format!("Or pass --{} on the command line", name.replace('_', "-")),
            ],
            ReleaseError::Input(InputError::MissingToken) => vec![
                "Add `env: GITHUB_TOKEN: ${{ secrets.GITHUB_TOKEN }}` to the step".to_string(),
            ],
            ReleaseError::GitHub(e) => match e.status() {
                Some(401) => vec![
                    "Check that GITHUB_TOKEN is set and has not expired".to_string(),
                ],
                Some(403) => vec![
                    "Grant the workflow 'contents: write' permission".to_string(),
                    "If this is a rate limit, wait before retrying".to_string(),
                ],
                Some(422) => vec![
                    "A release or tag with this name may still exist".to_string(),
                    "If cleanup failures were ignored, re-run with --cleanup-failures fail to see them".to_string(),
                ],
                Some(429) => vec!["Rate limit exceeded, wait before retrying".to_string()],
                _ => vec!["Check the error message above for specific details".to_string()],
            },
            ReleaseError::Consistency { .. } => vec![
                "Increase RELEASE_SETTLE_ATTEMPTS or RELEASE_SETTLE_DELAY_MS".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Whether this is a remote not-found failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReleaseError::GitHub(e) if e.is_not_found())
    }
}
