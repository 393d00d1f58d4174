//! Runtime configuration.
//!
//! Values come from, in increasing priority: built-in defaults, the process
//! environment (with `.env` loaded via `dotenvy`), and CLI flags (applied by
//! `app::config_from_args`).

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::data::{SourceInput, salad, vast};
use crate::error::AppError;

pub const ENV_SALAD_URL: &str = "GPU_COMPARE_SALAD_URL";
pub const ENV_VAST_URL: &str = "GPU_COMPARE_VAST_URL";
pub const ENV_TIMEOUT_SECS: &str = "GPU_COMPARE_TIMEOUT_SECS";
pub const ENV_FAILURE_POLICY: &str = "GPU_COMPARE_FAILURE_POLICY";
pub const ENV_BIND: &str = "GPU_COMPARE_BIND";

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// What to do when one feed cannot be fetched or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Treat the failed feed as an empty list and keep going.
    Degrade,
    /// Abort the whole run.
    Strict,
}

impl FromStr for FailurePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "degrade" => Ok(FailurePolicy::Degrade),
            "strict" => Ok(FailurePolicy::Strict),
            other => Err(AppError::usage(format!(
                "Invalid {ENV_FAILURE_POLICY} '{other}' (expected degrade or strict)."
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub salad: SourceInput,
    pub vast: SourceInput,
    /// Per-request timeout, applied to each feed independently.
    pub timeout: Duration,
    pub policy: FailurePolicy,
    pub bind: SocketAddr,
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in practice).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let salad = SourceInput::Url(non_empty(ENV_SALAD_URL).unwrap_or_else(|| salad::DEFAULT_URL.to_string()));
        let vast = SourceInput::Url(non_empty(ENV_VAST_URL).unwrap_or_else(|| vast::DEFAULT_URL.to_string()));

        let timeout_secs = match non_empty(ENV_TIMEOUT_SECS) {
            Some(raw) => parse_timeout_secs(&raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let policy = match non_empty(ENV_FAILURE_POLICY) {
            Some(raw) => raw.parse()?,
            None => FailurePolicy::Degrade,
        };

        let bind_raw = non_empty(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| AppError::usage(format!("Invalid {ENV_BIND} '{bind_raw}': {e}")))?;

        Ok(Self {
            salad,
            vast,
            timeout: Duration::from_secs(timeout_secs),
            policy,
            bind,
        })
    }
}

pub fn parse_timeout_secs(raw: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(AppError::usage("Timeout must be at least 1 second.")),
        Ok(secs) => Ok(secs),
        Err(e) => Err(AppError::usage(format!("Invalid timeout '{raw}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.salad, SourceInput::Url(salad::DEFAULT_URL.to_string()));
        assert_eq!(config.vast, SourceInput::Url(vast::DEFAULT_URL.to_string()));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.policy, FailurePolicy::Degrade);
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup(&[
            (ENV_SALAD_URL, "http://localhost:9000/salad"),
            (ENV_TIMEOUT_SECS, " 12 "),
            (ENV_FAILURE_POLICY, "STRICT"),
            (ENV_BIND, "0.0.0.0:8080"),
        ]))
        .unwrap();
        assert_eq!(config.salad, SourceInput::Url("http://localhost:9000/salad".to_string()));
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.policy, FailurePolicy::Strict);
        assert_eq!(config.bind.port(), 8080);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[(ENV_VAST_URL, "   "), (ENV_TIMEOUT_SECS, "")])).unwrap();
        assert_eq!(config.vast, SourceInput::Url(vast::DEFAULT_URL.to_string()));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn invalid_values_are_usage_errors() {
        let err = Config::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_USAGE);

        let err = Config::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "0")])).unwrap_err();
        assert!(err.to_string().contains("at least 1 second"));

        let err = Config::from_lookup(lookup(&[(ENV_FAILURE_POLICY, "lenient")])).unwrap_err();
        assert!(err.to_string().contains("degrade or strict"));

        assert!(Config::from_lookup(lookup(&[(ENV_BIND, "nowhere")])).is_err());
    }
}
