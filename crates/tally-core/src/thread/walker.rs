use crate::errors::ThreadDepthExceeded;
use crate::twitter::StatusApi;
use anyhow::Context;

/// Follows reply-to links from a post back to the thread's origin.
pub struct ThreadWalker<'a> {
    api: &'a dyn StatusApi,
    max_depth: Option<usize>,
}

impl<'a> ThreadWalker<'a> {
    pub fn new(api: &'a dyn StatusApi) -> Self {
        Self {
            api,
            max_depth: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the ids of the chain, newest first (`start_id` is element 0).
    ///
    /// Each hop is its own single-id lookup; any failed or empty lookup aborts.
    pub async fn walk(&self, start_id: u64) -> anyhow::Result<Vec<u64>> {
        let mut ids = Vec::new();
        let mut current = start_id;

        loop {
            if let Some(max) = self.max_depth {
                if ids.len() >= max {
                    return Err(ThreadDepthExceeded {
                        start_id,
                        max_depth: max,
                    }
                    .into());
                }
            }

            ids.push(current);
            let post = self
                .api
                .lookup(&[current])
                .await
                .with_context(|| format!("failed to look up status {}", current))?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    anyhow::anyhow!("status {} not found while walking thread", current)
                })?;

            match post.in_reply_to_id {
                None => break,
                Some(parent) => current = parent,
            }
        }

        tracing::info!(event = "thread_walked", start_id, len = ids.len());
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twitter::fake::FakeStatusApi;
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 4, 5, 23, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn walks_chain_back_to_origin() {
        let api = FakeStatusApi::new();
        // A <- B <- C
        api.seed_thread(&[1, 2, 3], start());

        let ids = ThreadWalker::new(&api).walk(3).await.unwrap();
        assert_eq!(ids, vec![3, 2, 1]);
        let set: HashSet<u64> = ids.into_iter().collect();
        assert_eq!(set, HashSet::from([1, 2, 3]));
        // one lookup per hop
        assert_eq!(api.lookup_calls(), 3);
    }

    #[tokio::test]
    async fn origin_post_is_a_thread_of_one() {
        let api = FakeStatusApi::new();
        api.seed_thread(&[42], start());
        let ids = ThreadWalker::new(&api).walk(42).await.unwrap();
        assert_eq!(ids, vec![42]);
    }

    #[tokio::test]
    async fn missing_parent_aborts() {
        let api = FakeStatusApi::new();
        api.insert(crate::model::Post {
            id: 7,
            created_at: start(),
            text: "orphan".into(),
            in_reply_to_id: Some(6),
        });
        let err = ThreadWalker::new(&api).walk(7).await.unwrap_err();
        assert!(err.to_string().contains("status 6 not found"));
    }

    #[tokio::test]
    async fn depth_guard_trips_on_long_thread() {
        let api = FakeStatusApi::new();
        api.seed_thread(&[1, 2, 3, 4, 5], start());

        let err = ThreadWalker::new(&api)
            .with_max_depth(Some(3))
            .walk(5)
            .await
            .unwrap_err();
        let depth = err.downcast_ref::<ThreadDepthExceeded>().unwrap();
        assert_eq!(depth.max_depth, 3);

        // exactly at the limit is fine
        let ids = ThreadWalker::new(&api)
            .with_max_depth(Some(5))
            .walk(5)
            .await
            .unwrap();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn depth_guard_stops_cycles() {
        let api = FakeStatusApi::new();
        for (id, parent) in [(1u64, 2u64), (2, 1)] {
            api.insert(crate::model::Post {
                id,
                created_at: start(),
                text: String::new(),
                in_reply_to_id: Some(parent),
            });
        }
        let err = ThreadWalker::new(&api)
            .with_max_depth(Some(50))
            .walk(1)
            .await
            .unwrap_err();
        assert!(err.is::<ThreadDepthExceeded>());
    }
}
