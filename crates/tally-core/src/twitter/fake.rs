use super::StatusApi;
use crate::model::Post;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory stand-in for the status API.
///
/// Newly posted statuses can be kept invisible for a number of lookups to mimic
/// the remote side's eventual consistency.
pub struct FakeStatusApi {
    state: Mutex<FakeState>,
}

struct FakeState {
    posts: HashMap<u64, Post>,
    // id -> remaining lookups that must not see it
    hidden: HashMap<u64, u32>,
    next_id: u64,
    clock: DateTime<Utc>,
    hide_new_posts_for: u32,
    lookup_calls: usize,
    posted: Vec<u64>,
}

impl Default for FakeStatusApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeStatusApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                posts: HashMap::new(),
                hidden: HashMap::new(),
                next_id: 1_000,
                clock: DateTime::<Utc>::UNIX_EPOCH,
                hide_new_posts_for: 0,
                lookup_calls: 0,
                posted: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert(&self, post: Post) {
        let mut st = self.lock();
        st.next_id = st.next_id.max(post.id + 1);
        st.clock = st.clock.max(post.created_at);
        st.posts.insert(post.id, post);
    }

    /// Seeds a linear thread; each post replies to the one before it.
    pub fn seed_thread(&self, ids: &[u64], start: DateTime<Utc>) {
        let mut parent = None;
        for (i, id) in ids.iter().enumerate() {
            self.insert(Post {
                id: *id,
                created_at: start + Duration::days(i as i64),
                text: format!("post {}", id),
                in_reply_to_id: parent,
            });
            parent = Some(*id);
        }
    }

    /// Posts created after this call stay invisible for `lookups` lookup calls.
    pub fn hide_new_posts_for(&self, lookups: u32) {
        self.lock().hide_new_posts_for = lookups;
    }

    pub fn lookup_calls(&self) -> usize {
        self.lock().lookup_calls
    }

    pub fn posted(&self) -> Vec<u64> {
        self.lock().posted.clone()
    }

    pub fn get(&self, id: u64) -> Option<Post> {
        self.lock().posts.get(&id).cloned()
    }
}

#[async_trait]
impl StatusApi for FakeStatusApi {
    async fn lookup(&self, ids: &[u64]) -> anyhow::Result<Vec<Post>> {
        let mut st = self.lock();
        st.lookup_calls += 1;

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(remaining) = st.hidden.get_mut(id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    continue;
                }
            }
            if let Some(post) = st.posts.get(id) {
                out.push(post.clone());
            }
        }
        Ok(out)
    }

    async fn post_reply(&self, text: &str, in_reply_to: u64) -> anyhow::Result<Post> {
        let mut st = self.lock();
        if !st.posts.contains_key(&in_reply_to) {
            anyhow::bail!("in_reply_to status {} does not exist", in_reply_to);
        }

        let id = st.next_id;
        st.next_id += 1;
        st.clock += Duration::hours(24);

        let post = Post {
            id,
            created_at: st.clock,
            text: text.to_string(),
            in_reply_to_id: Some(in_reply_to),
        };
        st.posts.insert(id, post.clone());
        let hide = st.hide_new_posts_for;
        if hide > 0 {
            st.hidden.insert(id, hide);
        }
        st.posted.push(id);
        Ok(post)
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
