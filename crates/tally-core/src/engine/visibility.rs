use crate::config::VisibilityPolicy;
use crate::errors::VisibilityTimeout;
use crate::model::Post;
use crate::twitter::StatusApi;
use anyhow::Context;
use tokio::time::{sleep, Duration};

/// Polls the lookup API until `status_id` shows up, backing off between tries.
///
/// Lookup errors abort immediately; only "not yet visible" is retried.
pub async fn wait_until_visible(
    api: &dyn StatusApi,
    status_id: u64,
    policy: &VisibilityPolicy,
) -> anyhow::Result<Post> {
    let mut waited = Duration::ZERO;
    let attempts = policy.max_attempts.max(1);

    for attempt in 0..attempts {
        let delay = policy.delay_for(attempt);
        sleep(delay).await;
        waited += delay;

        let found = api
            .lookup(&[status_id])
            .await
            .with_context(|| format!("failed to look up status {} while waiting", status_id))?
            .into_iter()
            .find(|p| p.id == status_id);

        tracing::debug!(
            event = "visibility_poll",
            status_id,
            attempt = attempt + 1,
            visible = found.is_some()
        );

        if let Some(post) = found {
            return Ok(post);
        }
    }

    Err(VisibilityTimeout {
        status_id,
        attempts,
        waited_ms: waited.as_millis() as u64,
    }
    .into())
}
