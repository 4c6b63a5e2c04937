use crate::errors::ConfigError;
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HISTORY_PATH: &str = "covid_thread_history.csv";
pub const DEFAULT_STATS_URL: &str = "https://covidtracking.com/api/v1/us/current.csv";
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";
pub const DEFAULT_ZONE: &str = "US/Pacific";
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_API_SECRET_KEY: &str = "API_SECRET_KEY";
pub const ENV_ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const ENV_ACCESS_TOKEN_SECRET: &str = "ACCESS_TOKEN_SECRET";

/// OAuth 1.0a user-context credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret_key: String,
    pub access_token: String,
    pub access_token_secret: String,
}

// Secrets stay out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_secret_key", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build credentials from any key lookup. Missing or blank values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(ConfigError(format!(
                    "missing credential: environment variable {} is not set",
                    name
                ))),
            }
        };

        Ok(Self {
            api_key: get(ENV_API_KEY)?,
            api_secret_key: get(ENV_API_SECRET_KEY)?,
            access_token: get(ENV_ACCESS_TOKEN)?,
            access_token_secret: get(ENV_ACCESS_TOKEN_SECRET)?,
        })
    }
}

/// Denominators for the "times increase" figures in the post text.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub cases: f64,
    pub deaths: f64,
    pub label: String,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            cases: 523.0,
            deaths: 19.0,
            label: "March 9th".to_string(),
        }
    }
}

/// Bounded exponential backoff used while waiting for a new post to show up.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityPolicy {
    pub initial_delay: Duration,
    pub backoff_factor: u32,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            backoff_factor: 2,
            max_delay: Duration::from_secs(60),
            max_attempts: 6,
        }
    }
}

impl VisibilityPolicy {
    /// Delay before lookup number `attempt` (zero based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.max(1).saturating_pow(attempt);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateConfig {
    pub history_path: PathBuf,
    pub stats_url: String,
    pub api_base: String,
    pub zone: Tz,
    /// `None` disables the walker's depth guard.
    pub max_depth: Option<usize>,
    pub visibility: VisibilityPolicy,
    pub baseline: Baseline,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            stats_url: DEFAULT_STATS_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            zone: chrono_tz::US::Pacific,
            max_depth: Some(DEFAULT_MAX_DEPTH),
            visibility: VisibilityPolicy::default(),
            baseline: Baseline::default(),
        }
    }
}

pub fn parse_zone(name: &str) -> Result<Tz, ConfigError> {
    name.parse::<Tz>()
        .map_err(|e| ConfigError(format!("unknown time zone '{}': {}", name, e)))
}
