//! Process configuration loaded from environment variables
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_DATABASE_PATH: &str = "time_capsules.db";
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SUBMIT_RATE_LIMIT: usize = 5;
pub const DEFAULT_SUBMIT_RATE_WINDOW_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_path: String,
    pub sweep_interval_secs: u64,
    pub notify_timeout_secs: u64,
    pub submit_rate_limit: usize,
    pub submit_rate_window_secs: u64,
    pub log_level: String,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .context("DISCORD_TOKEN must be set")?;

        let database_path =
            lookup("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        let sweep_interval_secs = parse_positive(
            &lookup,
            "SWEEP_INTERVAL_SECS",
            DEFAULT_SWEEP_INTERVAL_SECS,
        )?;
        let notify_timeout_secs = parse_positive(
            &lookup,
            "NOTIFY_TIMEOUT_SECS",
            DEFAULT_NOTIFY_TIMEOUT_SECS,
        )?;
        let submit_rate_limit =
            parse_positive(&lookup, "SUBMIT_RATE_LIMIT", DEFAULT_SUBMIT_RATE_LIMIT)?;
        let submit_rate_window_secs = parse_positive(
            &lookup,
            "SUBMIT_RATE_WINDOW_SECS",
            DEFAULT_SUBMIT_RATE_WINDOW_SECS,
        )?;

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Config {
            discord_token,
            database_path,
            sweep_interval_secs,
            notify_timeout_secs,
            submit_rate_limit,
            submit_rate_window_secs,
            log_level,
        })
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }

    pub fn submit_rate_window(&self) -> Duration {
        Duration::from_secs(self.submit_rate_window_secs)
    }
}

fn parse_positive<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    let value: T = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{key} must be a positive integer, got '{raw}'"))?;

    if value <= T::default() {
        anyhow::bail!("{key} must be greater than zero, got '{raw}'");
    }

    Ok(value)
}
