use super::exit_codes;
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use tally_core::config::{Credentials, UpdateConfig};
use tally_core::engine::runner::{preview, RunPolicy, Runner};
use tally_core::stats::CsvStatsSource;
use tally_core::storage::history::HistoryStore;
use tally_core::twitter::client::TwitterClient;

pub async fn run(cfg: &UpdateConfig) -> anyhow::Result<i32> {
    // Credentials first, so a misconfigured job fails before touching the network.
    let credentials = Credentials::from_env()?;

    tracing::info!(
        event = "update_start",
        history = %cfg.history_path.display(),
        stats_url = %cfg.stats_url,
        zone = %cfg.zone
    );

    let runner = Runner {
        api: Arc::new(TwitterClient::new(cfg.api_base.clone(), credentials)),
        stats: Arc::new(CsvStatsSource::new(cfg.stats_url.clone())),
        history: HistoryStore::new(cfg.history_path.clone(), cfg.zone),
        policy: RunPolicy::from(cfg),
    };
    let outcome = runner.run_once(Utc::now()).await?;

    eprintln!(
        "posted {} in reply to {} (thread now {} posts)",
        outcome.posted_id, outcome.reply_to, outcome.thread_len
    );
    Ok(exit_codes::OK)
}

pub async fn dry_run(cfg: &UpdateConfig) -> anyhow::Result<i32> {
    let stats = CsvStatsSource::new(cfg.stats_url.clone());
    let history = HistoryStore::new(cfg.history_path.clone(), cfg.zone);
    let p = preview(&stats, &history, &RunPolicy::from(cfg), Utc::now())
        .await
        .context("dry run failed")?;

    println!("in_reply_to: {}", p.reply_to);
    println!();
    println!("{}", p.message);
    Ok(exit_codes::OK)
}
