use std::{collections::HashSet, path::Path, time::Duration};
use crate::{
    types::{Instance, LogLevel, LookoutConfig, ProbeSettings},
    LookoutError, Result, Strategy,
};

#[derive(Debug, Clone)]
pub struct NormalizedConfig {
    /// Mirrors in priority order, trimmed and deduplicated
    pub instances: Vec<Instance>,
    /// How many of the leading instances a health check probes
    pub health_check_count: usize,
    /// Settings for the health probe
    pub probe: ProbeConfig,
    /// How long a health snapshot stays valid
    pub cache_ttl: Duration,
    /// Timeout for a single fetch from one mirror
    pub fetch_timeout: Duration,
    pub log_level: LogLevel,
    /// Where last-seen files are kept
    pub log_dir: String,
    pub strategy: Strategy,
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub timeout: Duration,
    /// Handle requested from every mirror, should always have a timeline
    pub test_handle: String,
    /// `https` for public mirrors, `http` for local ones
    pub scheme: String,
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        resolve_probe(ProbeSettings::default())
    }
}

pub fn resolve_config(config: LookoutConfig) -> Result<NormalizedConfig> {
    let instances = normalize_instances(&config.instances)?;
    validate_scheme(&config.probe.scheme)?;

    Ok(NormalizedConfig {
        instances,
        health_check_count: config.health_check_count,
        probe: resolve_probe(config.probe),
        cache_ttl: Duration::from_secs(config.cache_ttl_secs),
        fetch_timeout: Duration::from_millis(config.fetch_timeout_ms),
        log_level: config.log_level,
        log_dir: config.log_dir,
        strategy: config.strategy,
    })
}

/// Reads a JSON config file. Fields left out keep their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<LookoutConfig> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn normalize_instances(raw: &[String]) -> Result<Vec<Instance>> {
    let mut seen = HashSet::new();
    let mut instances = Vec::with_capacity(raw.len());

    for entry in raw {
        let trimmed = entry.trim();
        if trimmed.is_empty() || trimmed.contains('/') || trimmed.contains(char::is_whitespace) {
            return Err(LookoutError::InvalidInstance(entry.clone()));
        }
        if seen.insert(trimmed.to_string()) {
            instances.push(Instance::new(trimmed));
        }
    }

    if instances.is_empty() {
        return Err(LookoutError::NoInstancesConfigured);
    }

    Ok(instances)
}

/// Mirrors for a diagnostic run: explicit ones win, then the config file's
/// list, then `fallback`.
pub fn diagnostic_instances(
    explicit: &[String],
    configured: Option<&NormalizedConfig>,
    fallback: &[&str],
) -> Result<Vec<Instance>> {
    if !explicit.is_empty() {
        return normalize_instances(explicit);
    }
    match configured {
        Some(config) => Ok(config.instances.clone()),
        None => normalize_instances(&fallback.iter().map(|s| s.to_string()).collect::<Vec<_>>()),
    }
}

fn validate_scheme(scheme: &str) -> Result<()> {
    match scheme {
        "https" | "http" => Ok(()),
        other => Err(LookoutError::Config(format!("unsupported scheme {other:?}"))),
    }
}

fn resolve_probe(settings: ProbeSettings) -> ProbeConfig {
    ProbeConfig {
        timeout: Duration::from_millis(settings.timeout_ms),
        test_handle: settings.test_handle,
        scheme: settings.scheme,
        user_agent: settings.user_agent,
    }
}
