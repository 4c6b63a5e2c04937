use crate::model::Post;
use async_trait::async_trait;

#[async_trait]
pub trait StatusApi: Send + Sync {
    /// Batch lookup. Unknown or deleted ids are silently missing from the result,
    /// and the result order is not guaranteed to match `ids`.
    async fn lookup(&self, ids: &[u64]) -> anyhow::Result<Vec<Post>>;

    /// Posts `text` as a reply to `in_reply_to`, inheriting the reply mentions.
    async fn post_reply(&self, text: &str, in_reply_to: u64) -> anyhow::Result<Post>;

    fn provider_name(&self) -> &'static str;
}

pub mod client;
pub mod fake;
pub mod oauth;
