pub mod update;

use crate::cli::args::Cli;
use std::time::Duration;
use tally_core::config::{parse_zone, Baseline, UpdateConfig, VisibilityPolicy};
use tally_core::errors::ConfigError;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const RUN_ERROR: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let cfg = build_config(&cli)?;
    if cli.dry_run {
        update::dry_run(&cfg).await
    } else {
        update::run(&cfg).await
    }
}

pub fn build_config(cli: &Cli) -> Result<UpdateConfig, ConfigError> {
    if cli.cases_baseline <= 0.0 || cli.deaths_baseline <= 0.0 {
        return Err(ConfigError(format!(
            "baselines must be positive (cases: {}, deaths: {})",
            cli.cases_baseline, cli.deaths_baseline
        )));
    }

    let defaults = VisibilityPolicy::default();
    Ok(UpdateConfig {
        history_path: cli.history.clone(),
        stats_url: cli.stats_url.clone(),
        api_base: cli.api_base.clone(),
        zone: parse_zone(&cli.zone)?,
        max_depth: (cli.max_depth > 0).then_some(cli.max_depth),
        visibility: VisibilityPolicy {
            initial_delay: Duration::from_millis(cli.visibility_delay_ms),
            max_attempts: cli.visibility_attempts,
            ..defaults
        },
        baseline: Baseline {
            cases: cli.cases_baseline,
            deaths: cli.deaths_baseline,
            label: cli.baseline_label.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_build_a_valid_config() {
        let cli = Cli::try_parse_from(["tally"]).unwrap();
        let cfg = build_config(&cli).unwrap();
        assert_eq!(cfg.zone, chrono_tz::US::Pacific);
        assert_eq!(cfg.max_depth, Some(10_000));
        assert_eq!(cfg.visibility.initial_delay, Duration::from_secs(5));
        assert_eq!(cfg.baseline, Baseline::default());
        assert!(!cli.dry_run);
    }

    #[test]
    fn zero_depth_disables_guard() {
        let cli = Cli::try_parse_from(["tally", "--max-depth", "0"]).unwrap();
        assert_eq!(build_config(&cli).unwrap().max_depth, None);
    }

    #[test]
    fn unknown_zone_is_config_error() {
        let cli = Cli::try_parse_from(["tally", "--zone", "Nowhere/Special"]).unwrap();
        let err = build_config(&cli).unwrap_err();
        assert!(err.0.contains("Nowhere/Special"));
    }

    #[test]
    fn non_positive_baseline_is_config_error() {
        let cli = Cli::try_parse_from(["tally", "--deaths-baseline", "0"]).unwrap();
        assert!(build_config(&cli).is_err());
    }
}
