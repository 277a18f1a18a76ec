//! Read-after-write polling with exponential backoff.

use super::config::ConsistencyConfig;
use crate::error::{GitHubError, ReleaseError, Result};
use std::future::Future;

/// Re-run `probe` until it reports the mutation `operation` as visible.
///
/// The probe returns `Ok(true)` once the remote state reflects the mutation.
/// Probe errors count as "not yet"; the last one is logged when the budget is
/// exhausted. With `max_attempts == 0` this returns immediately.
pub async fn wait_until_visible<F, Fut>(
    mut probe: F,
    operation: &str,
    config: &ConsistencyConfig,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<bool, GitHubError>>,
{
    if config.max_attempts == 0 {
        return Ok(());
    }

    let mut attempts = 0;
    let mut last_error = None;

    loop {
        attempts += 1;
        match probe().await {
            Ok(true) => {
                if attempts > 1 {
                    log::debug!("{} visible after {} check(s)", operation, attempts);
                }
                return Ok(());
            }
            Ok(false) => {}
            Err(e) => last_error = Some(e),
        }

        if attempts >= config.max_attempts {
            if let Some(e) = last_error {
                log::warn!("Last consistency check for {} failed: {}", operation, e);
            }
            return Err(ReleaseError::Consistency {
                operation: operation.to_string(),
                attempts,
            });
        }

        let wait = config.delay_for(attempts);
        log::debug!(
            "{} not visible yet (check {}/{}), retrying in {:.1}s",
            operation,
            attempts,
            config.max_attempts,
            wait.as_secs_f64()
        );
        tokio::time::sleep(wait).await;
    }
}
