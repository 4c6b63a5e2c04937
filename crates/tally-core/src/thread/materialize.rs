use crate::model::{ThreadRow, ThreadTable};
use crate::twitter::StatusApi;
use anyhow::Context;
use chrono_tz::Tz;

/// Resolves thread ids into rows sorted by target-zone time.
///
/// One batch lookup; ids are not deduplicated.
pub async fn materialize(
    api: &dyn StatusApi,
    ids: &[u64],
    zone: Tz,
) -> anyhow::Result<ThreadTable> {
    let posts = api
        .lookup(ids)
        .await
        .with_context(|| format!("failed to look up {} thread statuses", ids.len()))?;

    if posts.len() != ids.len() {
        tracing::warn!(
            event = "thread_lookup_incomplete",
            requested = ids.len(),
            returned = posts.len()
        );
    }

    let mut table = ThreadTable::new(
        posts
            .iter()
            .map(|p| ThreadRow::from_post(p, zone))
            .collect(),
    );
    table.sort_chronologically();

    tracing::info!(event = "thread_materialized", rows = table.len(), zone = %zone);
    Ok(table)
}
