//! Engine configuration.

use anyhow::{Context, bail};
use chrono::Duration;
use serde::Deserialize;

pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;
const MAX_IDLE_TIMEOUT_SECS: u64 = 86_400;

const ENV_IDLE_TIMEOUT: &str = "CASHDESK_IDLE_TIMEOUT_SECS";
const ENV_SHORTCUTS: &str = "CASHDESK_SHORTCUTS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    /// Seconds of inactivity away from the category step before the draft
    /// is discarded.
    pub idle_timeout_secs: u64,
    /// Install positional shortcuts on the category/sub-category grids.
    pub shortcuts_enabled: bool,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            shortcuts_enabled: true,
        }
    }
}

impl EntryConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through `lookup`; unset variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_IDLE_TIMEOUT) {
            config.idle_timeout_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_IDLE_TIMEOUT} must be a whole number of seconds, got {raw:?}"))?;
        }
        if let Some(raw) = lookup(ENV_SHORTCUTS) {
            config.shortcuts_enabled = parse_flag(&raw)
                .with_context(|| format!("{ENV_SHORTCUTS} must be a boolean, got {raw:?}"))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(raw).context("invalid entry configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.idle_timeout_secs == 0 || self.idle_timeout_secs > MAX_IDLE_TIMEOUT_SECS {
            bail!(
                "idle timeout must be between 1 and {MAX_IDLE_TIMEOUT_SECS} seconds, got {}",
                self.idle_timeout_secs
            );
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        let secs = self.idle_timeout_secs.min(MAX_IDLE_TIMEOUT_SECS);
        Duration::seconds(i64::try_from(secs).unwrap_or(i64::from(u32::MAX)))
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognized flag {other:?}"),
    }
}
