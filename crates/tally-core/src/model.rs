use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A single status as returned by the lookup API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to_id: Option<u64>,
}

impl Post {
    pub fn is_origin(&self) -> bool {
        self.in_reply_to_id.is_none()
    }
}

/// Aggregate counts pulled from the stats resource. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub case_count: i64,
    pub death_count: i64,
}

/// One persisted row of the thread history.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadRow {
    pub id: u64,
    pub utc: DateTime<Utc>,
    pub local: DateTime<Tz>,
    pub text: String,
}

impl ThreadRow {
    pub fn from_post(post: &Post, zone: Tz) -> Self {
        Self {
            id: post.id,
            utc: post.created_at,
            local: post.created_at.with_timezone(&zone),
            text: post.text.clone(),
        }
    }
}

/// The projection of a thread that lives in the history file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadTable {
    pub rows: Vec<ThreadRow>,
}

impl ThreadTable {
    pub fn new(rows: Vec<ThreadRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Id of the last row, i.e. the post the next update replies to.
    pub fn latest_id(&self) -> Option<u64> {
        self.rows.last().map(|r| r.id)
    }

    /// Stable sort by target-zone timestamp; equal timestamps keep their order.
    pub fn sort_chronologically(&mut self) {
        self.rows.sort_by(|a, b| a.local.cmp(&b.local));
    }
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub posted_id: u64,
    pub reply_to: u64,
    pub message: String,
    pub thread_len: usize,
}
