//! Reconciler configuration.
//!
//! Consistency polling is tuned from the environment, with clamping, so slow
//! GitHub Enterprise instances can be given more room without a rebuild.

use crate::error::InputError;
use std::str::FromStr;
use std::time::Duration;

/// Env var: probes issued after each mutation before giving up
pub const SETTLE_ATTEMPTS_ENV: &str = "RELEASE_SETTLE_ATTEMPTS";
/// Env var: first backoff delay in milliseconds
pub const SETTLE_DELAY_ENV: &str = "RELEASE_SETTLE_DELAY_MS";

const MAX_ATTEMPTS: u32 = 30;
const DEFAULT_ATTEMPTS: u32 = 10;
const DEFAULT_DELAY_MS: u64 = 500;
const MAX_INITIAL_DELAY_MS: u64 = 10_000;

/// What to do when a cleanup step fails for a reason other than absence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPolicy {
    /// Abort before creating the new release
    Fail,
    /// Log, abandon the remaining cleanup and create the release anyway
    #[default]
    Ignore,
}

impl FromStr for CleanupPolicy {
    type Err = InputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(CleanupPolicy::Fail),
            "" | "ignore" => Ok(CleanupPolicy::Ignore),
            other => Err(InputError::InvalidInput {
                name: "cleanup_failures".to_string(),
                reason: format!("expected 'fail' or 'ignore', got '{}'", other),
            }),
        }
    }
}

/// Poll-until-consistent settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyConfig {
    /// Probes issued after a mutation (0 disables waiting)
    pub max_attempts: u32,
    /// Delay before the second probe; doubles each time
    pub initial_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_DELAY_MS),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl ConsistencyConfig {
    /// No waiting at all
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Probe without sleeping between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Parse a numeric env var, clamped to `max`
    fn parse_env<T>(var_name: &str, default: T, max: T) -> T
    where
        T: std::str::FromStr + Ord,
    {
        std::env::var(var_name)
            .ok()
            .and_then(|s| s.trim().parse::<T>().ok())
            .map(|v| v.min(max))
            .unwrap_or(default)
    }

    /// Create config from environment variables with fallback to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let delay_ms = Self::parse_env(SETTLE_DELAY_ENV, DEFAULT_DELAY_MS, MAX_INITIAL_DELAY_MS);
        Self {
            max_attempts: Self::parse_env(SETTLE_ATTEMPTS_ENV, DEFAULT_ATTEMPTS, MAX_ATTEMPTS),
            initial_delay: Duration::from_millis(delay_ms),
            max_delay: defaults.max_delay.max(Duration::from_millis(delay_ms)),
        }
    }

    /// Delay after the `attempt`-th failed probe (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Everything the reconciler needs besides the request
#[derive(Debug, Clone, Default)]
pub struct ReconcileConfig {
    /// Handling of non-NotFound cleanup failures
    pub cleanup_policy: CleanupPolicy,
    /// Read-after-write polling
    pub consistency: ConsistencyConfig,
}
