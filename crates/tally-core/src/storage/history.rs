use crate::model::{ThreadRow, ThreadTable};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";
const HEADER: [&str; 5] = ["", "id", "UTC", "PDT", "text"];

/// On-disk row. The unnamed first column is a 0-based row index.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryRecord {
    #[serde(rename = "")]
    index: usize,
    id: u64,
    #[serde(rename = "UTC")]
    utc: String,
    #[serde(rename = "PDT")]
    local: String,
    text: String,
}

/// CSV file holding the materialized thread. Read once per run, rewritten in full.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    pub path: PathBuf,
    pub zone: Tz,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, zone: Tz) -> Self {
        Self {
            path: path.into(),
            zone,
        }
    }

    pub fn load(&self) -> Result<ThreadTable> {
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("failed to open history file: {}", self.path.display()))?;

        let mut rows = Vec::new();
        for (i, rec) in reader.deserialize::<HistoryRecord>().enumerate() {
            let rec = rec.with_context(|| {
                format!("{}: failed to parse history row {}", self.path.display(), i + 1)
            })?;
            let utc = parse_timestamp(&rec.utc)
                .with_context(|| format!("history row {}: bad UTC timestamp", i + 1))?
                .with_timezone(&Utc);
            let local = parse_timestamp(&rec.local)
                .with_context(|| format!("history row {}: bad local timestamp", i + 1))?
                .with_timezone(&self.zone);
            rows.push(ThreadRow {
                id: rec.id,
                utc,
                local,
                text: rec.text,
            });
        }

        tracing::info!(
            event = "history_loaded",
            path = %self.path.display(),
            rows = rows.len()
        );
        Ok(ThreadTable::new(rows))
    }

    /// Latest post id recorded in the history, i.e. the one the next update replies to.
    pub fn latest_id(&self) -> Result<u64> {
        self.load()?.latest_id().ok_or_else(|| {
            anyhow::anyhow!("history has no rows: {}", self.path.display())
        })
    }

    /// Overwrites the file with `table`, creating parent directories as needed.
    pub fn save(&self, table: &ThreadTable) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create history directory: {}", parent.display())
                })?;
            }
        }
        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("failed to create history file: {}", self.path.display()))?;

        if table.is_empty() {
            writer.write_record(HEADER)?;
        }
        for (index, row) in table.rows.iter().enumerate() {
            writer
                .serialize(HistoryRecord {
                    index,
                    id: row.id,
                    utc: row.utc.format(TIMESTAMP_FORMAT).to_string(),
                    local: row.local.format(TIMESTAMP_FORMAT).to_string(),
                    text: row.text.clone(),
                })
                .context("failed to write history row")?;
        }
        writer.flush().context("failed to flush history file")?;

        tracing::info!(
            event = "history_saved",
            path = %self.path.display(),
            rows = table.len()
        );
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw.trim()))
        .with_context(|| format!("unrecognised timestamp {:?}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn row(id: u64, utc: DateTime<Utc>, text: &str) -> ThreadRow {
        ThreadRow {
            id,
            utc,
            local: utc.with_timezone(&chrono_tz::US::Pacific),
            text: text.to_string(),
        }
    }

    #[test]
    fn save_then_load_keeps_rows() -> Result<()> {
        let dir = tempdir()?;
        let store = HistoryStore::new(
            dir.path().join("nested/history.csv"),
            chrono_tz::US::Pacific,
        );

        let table = ThreadTable::new(vec![
            row(
                1246950287403737088,
                Utc.with_ymd_and_hms(2020, 4, 6, 2, 13, 5).unwrap(),
                "April 5th\n\nConfirmed COVID-19 cases in the US: 337,072. ~645x increase",
            ),
            row(
                1247300000000000000,
                Utc.with_ymd_and_hms(2020, 4, 7, 2, 0, 0).unwrap(),
                "April 6th, \"quoted\"",
            ),
        ]);
        store.save(&table)?;

        let loaded = store.load()?;
        assert_eq!(loaded, table);
        assert_eq!(store.latest_id()?, 1247300000000000000);

        let raw = std::fs::read_to_string(&store.path)?;
        assert!(raw.starts_with(",id,UTC,PDT,text\n"));
        assert!(raw.contains(
            "0,1246950287403737088,2020-04-06 02:13:05+00:00,2020-04-05 19:13:05-07:00,"
        ));
        Ok(())
    }

    #[test]
    fn loads_legacy_pandas_export() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("covid_thread_history.csv");
        std::fs::write(
            &path,
            ",id,UTC,PDT,text\n\
             0,1246950287403737088,2020-04-06 00:00:01+00:00,2020-04-05 17:00:01-07:00,\"April 5th\n\nDeaths from COVID-19 in the US: 9,619.\"\n",
        )?;
        let store = HistoryStore::new(&path, chrono_tz::US::Pacific);
        let table = store.load()?;
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].id, 1246950287403737088);
        assert_eq!(
            table.rows[0].utc,
            Utc.with_ymd_and_hms(2020, 4, 6, 0, 0, 1).unwrap()
        );
        assert!(table.rows[0].text.contains("9,619"));
        Ok(())
    }

    #[test]
    fn empty_history_has_no_latest_id() -> Result<()> {
        let dir = tempdir()?;
        let store = HistoryStore::new(dir.path().join("h.csv"), chrono_tz::UTC);
        store.save(&ThreadTable::default())?;
        assert_eq!(std::fs::read_to_string(&store.path)?, ",id,UTC,PDT,text\n");
        let err = store.latest_id().unwrap_err();
        assert!(err.to_string().contains("history has no rows"));
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let store = HistoryStore::new("/definitely/not/here.csv", chrono_tz::UTC);
        assert!(!store.path.is_file());
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("failed to open history file"));
    }

    #[test]
    fn save_reports_unusable_parent_directory() -> Result<()> {
        let dir = tempdir()?;
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "")?;

        let store = HistoryStore::new(blocker.join("history.csv"), chrono_tz::UTC);
        let err = store.save(&ThreadTable::default()).unwrap_err();
        assert!(
            err.to_string().contains("failed to create history directory"),
            "{:#}",
            err
        );
        Ok(())
    }
}
