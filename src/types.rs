use std::fmt;

use serde::{Deserialize, Serialize};

/// A mirror address such as `nitter.net` or `127.0.0.1:8080`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Instance(String);

impl Instance {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Instance {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for Instance {
    fn from(address: String) -> Self {
        Self(address)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProbeOutcome {
    pub instance: Instance,
    pub latency_ms: u64,
}

/// Healthy instances ordered fastest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct HealthSnapshot(Vec<ProbeOutcome>);

impl HealthSnapshot {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a snapshot from outcomes already sorted by latency.
    pub(crate) fn from_ranked(outcomes: Vec<ProbeOutcome>) -> Self {
        Self(outcomes)
    }

    pub fn outcomes(&self) -> &[ProbeOutcome] {
        &self.0
    }

    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.0.iter().map(|outcome| &outcome.instance)
    }

    pub fn fastest(&self) -> Option<&ProbeOutcome> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The newest post read from a mirror, tagged with the mirror that served it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PostRecord {
    pub content_url: String,
    pub author_name: String,
    pub author_handle: String,
    pub text: String,
    pub timestamp: String,
    pub media_url: Option<String>,
    pub source_instance: Instance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Result of one monitor cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The newest post was already delivered on a previous run.
    Unchanged(PostRecord),
    Delivered(PostRecord),
}

/**
 * Output of the `health_check` binary. `generated_at` is wall-clock time so it
 * can be compared across runs, unlike the monotonic capture time in the cache.
 */
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthReport {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub probed: usize,
    pub healthy: HealthSnapshot,
}

impl HealthReport {
    pub fn new(probed: usize, healthy: HealthSnapshot) -> Self {
        Self {
            generated_at: chrono::Utc::now(),
            probed,
            healthy,
        }
    }

    pub fn has_healthy(&self) -> bool {
        !self.healthy.is_empty()
    }
}

// structs are effectively data objects

pub const DEFAULT_INSTANCES: &[&str] = &[
    "nitter.net",
    "xcancel.com",
    "nitter.poast.org",
    "nitter.privacydev.net",
    "nitter.catsarch.com",
    "nitter.woodland.cafe",
    "nitter.in.projectsegfau.lt",
    "nitter.1d4.us",
    "nitter.moomoo.me",
    "nitter.eu.projectsegfau.lt",
    "nitter.projectsegfau.lt",
    "nitter.fdn.fr",
    "nitter.ktachibana.party",
    "nitter.pw",
];

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LookoutConfig {
    pub instances: Vec<String>,
    pub health_check_count: usize,
    pub probe: ProbeSettings,
    pub cache_ttl_secs: u64,
    pub fetch_timeout_ms: u64,
    pub log_level: LogLevel,
    pub log_dir: String,
    pub strategy: crate::Strategy,
}

/**
 * Think of `impl Default for xyz` as the default constructor for the struct,
 * and with `#[serde(default)]` a config file only has to name what it overrides.
 */

impl Default for LookoutConfig {
    fn default() -> Self {
        Self {
            instances: DEFAULT_INSTANCES.iter().map(|s| s.to_string()).collect(),
            health_check_count: 3,
            probe: ProbeSettings::default(),
            cache_ttl_secs: 5 * 60,
            fetch_timeout_ms: 30_000,
            log_level: LogLevel::Info,
            log_dir: "log".to_string(),
            strategy: crate::Strategy::Ranked,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub timeout_ms: u64,
    pub test_handle: String,
    pub scheme: String,
    pub user_agent: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            test_handle: "twitter".to_string(),
            scheme: "https".to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}
