use clap::Parser;
use std::path::PathBuf;
use tally_core::config::{
    DEFAULT_API_BASE, DEFAULT_HISTORY_PATH, DEFAULT_MAX_DEPTH, DEFAULT_STATS_URL, DEFAULT_ZONE,
};

/// Runs one update: reply to the latest post of the thread with today's numbers.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tally",
    version,
    about = "Posts today's case and death counts as a reply in a running thread"
)]
pub struct Cli {
    /// CSV file holding the thread history (read, then rewritten)
    #[arg(long, env = "TALLY_HISTORY", default_value = DEFAULT_HISTORY_PATH)]
    pub history: PathBuf,

    /// CSV endpoint with `positive` and `death` columns
    #[arg(long, env = "TALLY_STATS_URL", default_value = DEFAULT_STATS_URL)]
    pub stats_url: String,

    #[arg(long, env = "TALLY_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Time zone used for the post date and history ordering
    #[arg(long, env = "TALLY_ZONE", default_value = DEFAULT_ZONE)]
    pub zone: String,

    /// Maximum posts to follow when walking the thread (0 = unlimited)
    #[arg(long, env = "TALLY_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Delay before the first visibility check of the new post
    #[arg(long, env = "TALLY_VISIBILITY_DELAY_MS", default_value_t = 5000)]
    pub visibility_delay_ms: u64,

    /// Lookups to try before giving up on the new post
    #[arg(long, env = "TALLY_VISIBILITY_ATTEMPTS", default_value_t = 6)]
    pub visibility_attempts: u32,

    #[arg(long, env = "TALLY_CASES_BASELINE", default_value_t = 523.0)]
    pub cases_baseline: f64,

    #[arg(long, env = "TALLY_DEATHS_BASELINE", default_value_t = 19.0)]
    pub deaths_baseline: f64,

    #[arg(long, env = "TALLY_BASELINE_LABEL", default_value = "March 9th")]
    pub baseline_label: String,

    /// Print the composed post instead of publishing it (no credentials needed)
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    #[arg(long = "log", env = "TALLY_LOG", default_value = "info")]
    pub log_level: String,
}
