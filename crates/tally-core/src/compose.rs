use crate::config::Baseline;
use crate::model::StatsSnapshot;
use chrono::{DateTime, Datelike, TimeZone};
use icu_decimal::input::Decimal;
use icu_decimal::DecimalFormatter;
use icu_locale_core::locale;
use std::sync::OnceLock;

/// `1` -> `1st`, `12` -> `12th`, `122` -> `122nd`.
pub fn ordinal(n: u64) -> String {
    let suffix = if (11..=13).contains(&(n % 100)) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{}{}", n, suffix)
}

fn decimal_formatter() -> Option<&'static DecimalFormatter> {
    static FORMATTER: OnceLock<Option<DecimalFormatter>> = OnceLock::new();
    FORMATTER
        .get_or_init(|| {
            DecimalFormatter::try_new(locale!("en-US").into(), Default::default())
                .inspect_err(|e| {
                    tracing::warn!(event = "decimal_formatter_unavailable", error = %e)
                })
                .ok()
        })
        .as_ref()
}

/// Formats an integer with en-US grouping separators (`5,000,000`).
pub fn thousands(n: i64) -> String {
    match decimal_formatter() {
        Some(f) => f.format(&Decimal::from(n)).to_string(),
        None => n.to_string(),
    }
}

/// `count / base` rounded to a whole number, with separators.
pub fn increase_factor(count: i64, base: f64) -> String {
    let ratio = count as f64 / base;
    if !ratio.is_finite() {
        return ratio.to_string();
    }
    thousands(ratio.round() as i64)
}

/// Builds the post text for `now`, which should already be in the target zone.
pub fn compose_message<Tz: TimeZone>(
    stats: &StatsSnapshot,
    now: &DateTime<Tz>,
    baseline: &Baseline,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let month = now.format("%B");
    let day = ordinal(u64::from(now.day()));

    format!(
        "{month} {day}\n\n\
         Confirmed COVID-19 cases in the US: {cases}. ~{cases_x}x increase since {label}\n\
         Deaths from COVID-19 in the US: {deaths}. ~{deaths_x}x increase since {label}",
        cases = thousands(stats.case_count),
        cases_x = increase_factor(stats.case_count, baseline.cases),
        deaths = thousands(stats.death_count),
        deaths_x = increase_factor(stats.death_count, baseline.deaths),
        label = baseline.label,
    )
}
