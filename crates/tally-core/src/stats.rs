use crate::model::StatsSnapshot;
use anyhow::{Context, Result};
use async_trait::async_trait;

pub const CASES_COLUMN: &str = "positive";
pub const DEATHS_COLUMN: &str = "death";

#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch(&self) -> Result<StatsSnapshot>;
}

/// Reads the current national totals from a CSV endpoint.
pub struct CsvStatsSource {
    pub url: String,
    pub client: reqwest::Client,
}

impl CsvStatsSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl StatsSource for CsvStatsSource {
    async fn fetch(&self) -> Result<StatsSnapshot> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("failed to fetch stats from {}", self.url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("stats endpoint returned {}: {}", status, body);
        }

        let body = resp.text().await.context("failed to read stats body")?;
        let snapshot = parse_stats_csv(&body)?;

        tracing::info!(
            event = "stats_fetched",
            url = %self.url,
            cases = snapshot.case_count,
            deaths = snapshot.death_count
        );
        Ok(snapshot)
    }
}

/// Always returns the same snapshot. Lets the runner be driven without a network.
pub struct FixedStats(pub StatsSnapshot);

#[async_trait]
impl StatsSource for FixedStats {
    async fn fetch(&self) -> Result<StatsSnapshot> {
        Ok(self.0)
    }
}

/// Pulls `positive` and `death` out of the first data row.
pub fn parse_stats_csv(content: &str) -> Result<StatsSnapshot> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("failed to read stats CSV header")?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            h.trim().to_string()
        })
        .collect();

    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow::anyhow!("stats CSV has no '{}' column", name))
    };
    let cases_idx = column(CASES_COLUMN)?;
    let deaths_idx = column(DEATHS_COLUMN)?;

    let row = reader
        .records()
        .next()
        .ok_or_else(|| anyhow::anyhow!("stats CSV has no data rows"))?
        .context("failed to read stats CSV row")?;

    Ok(StatsSnapshot {
        case_count: parse_count(row.get(cases_idx), CASES_COLUMN)?,
        death_count: parse_count(row.get(deaths_idx), DEATHS_COLUMN)?,
    })
}

fn parse_count(raw: Option<&str>, column: &str) -> Result<i64> {
    let raw = raw
        .map(str::trim)
        .ok_or_else(|| anyhow::anyhow!("stats CSV row is missing '{}'", column))?;

    if let Ok(n) = raw.parse::<i64>() {
        return Ok(n);
    }
    let f: f64 = raw
        .parse()
        .with_context(|| format!("invalid '{}' value in stats CSV: {:?}", column, raw))?;
    if !f.is_finite() {
        anyhow::bail!("invalid '{}' value in stats CSV: {:?}", column, raw);
    }
    Ok(f.round() as i64)
}
