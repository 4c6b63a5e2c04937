use std::fmt;

/// Startup configuration problem (missing credentials, unknown zone, ...).
///
/// The binary maps this to its config exit code; everything else is a run failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigError: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// The walker followed more reply links than its guard allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadDepthExceeded {
    pub start_id: u64,
    pub max_depth: usize,
}

impl fmt::Display for ThreadDepthExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "thread starting at {} exceeds the maximum depth of {} posts",
            self.start_id, self.max_depth
        )
    }
}

impl std::error::Error for ThreadDepthExceeded {}

/// A freshly posted status never showed up through the lookup API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityTimeout {
    pub status_id: u64,
    pub attempts: u32,
    pub waited_ms: u64,
}

impl fmt::Display for VisibilityTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status {} not visible after {} lookups ({} ms)",
            self.status_id, self.attempts, self.waited_ms
        )
    }
}

impl std::error::Error for VisibilityTimeout {}

/// True when the error chain carries a [`ConfigError`].
pub fn is_config_error(err: &anyhow::Error) -> bool {
    err.chain().any(|e| e.downcast_ref::<ConfigError>().is_some())
}
