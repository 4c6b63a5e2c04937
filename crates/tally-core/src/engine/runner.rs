use crate::compose::compose_message;
use crate::config::{Baseline, UpdateConfig, VisibilityPolicy};
use crate::engine::visibility::wait_until_visible;
use crate::model::UpdateOutcome;
use crate::stats::StatsSource;
use crate::storage::history::HistoryStore;
use crate::thread::{materialize, ThreadWalker};
use crate::twitter::StatusApi;
use anyhow::Context;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

/// Settings the runner needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct RunPolicy {
    pub zone: Tz,
    pub max_depth: Option<usize>,
    pub visibility: VisibilityPolicy,
    pub baseline: Baseline,
}

impl Default for RunPolicy {
    fn default() -> Self {
        RunPolicy::from(&UpdateConfig::default())
    }
}

impl From<&UpdateConfig> for RunPolicy {
    fn from(cfg: &UpdateConfig) -> Self {
        Self {
            zone: cfg.zone,
            max_depth: cfg.max_depth,
            visibility: cfg.visibility.clone(),
            baseline: cfg.baseline.clone(),
        }
    }
}

/// The reply a run would post, without posting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub reply_to: u64,
    pub message: String,
}

/// Loads history, fetches stats and composes the next post.
pub async fn preview(
    stats: &dyn StatsSource,
    history: &HistoryStore,
    policy: &RunPolicy,
    now: DateTime<Utc>,
) -> anyhow::Result<Preview> {
    let reply_to = history.latest_id()?;
    let snapshot = stats.fetch().await.context("failed to fetch stats")?;
    let message = compose_message(&snapshot, &now.with_timezone(&policy.zone), &policy.baseline);
    Ok(Preview { reply_to, message })
}

/// One daily update: reply to the latest known post, then rebuild the history
/// from the thread as the API now reports it.
pub struct Runner {
    pub api: Arc<dyn StatusApi>,
    pub stats: Arc<dyn StatsSource>,
    pub history: HistoryStore,
    pub policy: RunPolicy,
}

impl Runner {
    pub async fn run_once(&self, now: DateTime<Utc>) -> anyhow::Result<UpdateOutcome> {
        let Preview { reply_to, message } =
            preview(self.stats.as_ref(), &self.history, &self.policy, now).await?;

        let posted = self
            .api
            .post_reply(&message, reply_to)
            .await
            .with_context(|| format!("failed to post reply to {}", reply_to))?;
        tracing::info!(
            event = "status_posted",
            provider = self.api.provider_name(),
            id = posted.id,
            reply_to
        );

        // Nothing below is rolled back if it fails: the post is already public and
        // the next run would reply to the stale latest id.
        wait_until_visible(self.api.as_ref(), posted.id, &self.policy.visibility).await?;

        let ids = ThreadWalker::new(self.api.as_ref())
            .with_max_depth(self.policy.max_depth)
            .walk(posted.id)
            .await?;
        let table = materialize(self.api.as_ref(), &ids, self.policy.zone).await?;
        self.history.save(&table)?;

        let outcome = UpdateOutcome {
            posted_id: posted.id,
            reply_to,
            message,
            thread_len: table.len(),
        };
        tracing::info!(
            event = "update_complete",
            posted_id = outcome.posted_id,
            thread_len = outcome.thread_len
        );
        Ok(outcome)
    }
}
