//! # Configuration
//!
//! Environment-driven settings, loaded once at start-up. A `.env` file is
//! honoured by the binary through `dotenvy` before this runs.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Context, Result};
use chrono::{FixedOffset, Offset, Utc};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Asia/Tehran, UTC+03:30 with no daylight saving
pub const DEFAULT_TZ_OFFSET_MINUTES: i32 = 210;
pub const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 60;
pub const DEFAULT_MAX_MENTIONS: usize = 50;
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    /// Channel whose membership gates reminder creation (`None` disables the gate)
    pub required_channel: Option<String>,
    pub data_file: PathBuf,
    pub tz_offset_minutes: i32,
    pub check_interval_minutes: u64,
    pub max_mentions: usize,
    pub send_timeout_secs: u64,
    pub notify_once_per_day: bool,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("BOT_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("BOT_TOKEN must be set"))?;

        let required_channel = lookup("REQUIRED_CHANNEL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let data_file = lookup("DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data.json"));

        let tz_offset_minutes =
            parse_or(&lookup, "TZ_OFFSET_MINUTES", DEFAULT_TZ_OFFSET_MINUTES)?;
        // FixedOffset only accepts offsets strictly within one day
        if tz_offset_minutes.abs() >= 24 * 60 {
            return Err(anyhow!(
                "TZ_OFFSET_MINUTES out of range: {tz_offset_minutes}"
            ));
        }

        let check_interval_minutes = parse_or(
            &lookup,
            "CHECK_INTERVAL_MINUTES",
            DEFAULT_CHECK_INTERVAL_MINUTES,
        )?;
        if check_interval_minutes == 0 {
            return Err(anyhow!("CHECK_INTERVAL_MINUTES must be greater than zero"));
        }

        Ok(Self {
            bot_token,
            required_channel,
            data_file,
            tz_offset_minutes,
            check_interval_minutes,
            max_mentions: parse_or(&lookup, "MAX_MENTIONS", DEFAULT_MAX_MENTIONS)?,
            send_timeout_secs: parse_or(&lookup, "SEND_TIMEOUT_SECS", DEFAULT_SEND_TIMEOUT_SECS)?,
            notify_once_per_day: parse_or(&lookup, "NOTIFY_ONCE_PER_DAY", true)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Fixed reference time zone for "today"
    pub fn reference_offset(&self) -> FixedOffset {
        // Range is checked in from_lookup; fall back to UTC for hand-built configs
        FixedOffset::east_opt(self.tz_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes * 60)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("BOT_TOKEN", "123:abc")]).unwrap();

        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.required_channel, None);
        assert_eq!(config.data_file, PathBuf::from("data.json"));
        assert_eq!(config.tz_offset_minutes, 210);
        assert_eq!(config.check_interval(), Duration::from_secs(3600));
        assert_eq!(config.max_mentions, 50);
        assert_eq!(config.send_timeout(), Duration::from_secs(10));
        assert!(config.notify_once_per_day);
        assert_eq!(config.reference_offset().local_minus_utc(), 210 * 60);
    }

    #[test]
    fn test_missing_token_is_an_error() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("BOT_TOKEN", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BOT_TOKEN", "t"),
            ("REQUIRED_CHANNEL", "@aporoir"),
            ("DATA_FILE", "/var/lib/yadavar/data.json"),
            ("TZ_OFFSET_MINUTES", "-300"),
            ("CHECK_INTERVAL_MINUTES", "15"),
            ("MAX_MENTIONS", "20"),
            ("NOTIFY_ONCE_PER_DAY", "false"),
        ])
        .unwrap();

        assert_eq!(config.required_channel.as_deref(), Some("@aporoir"));
        assert_eq!(config.reference_offset().local_minus_utc(), -300 * 60);
        assert_eq!(config.check_interval(), Duration::from_secs(900));
        assert_eq!(config.max_mentions, 20);
        assert!(!config.notify_once_per_day);
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert!(config_from(&[("BOT_TOKEN", "t"), ("MAX_MENTIONS", "lots")]).is_err());
        assert!(config_from(&[("BOT_TOKEN", "t"), ("CHECK_INTERVAL_MINUTES", "0")]).is_err());
        assert!(config_from(&[("BOT_TOKEN", "t"), ("TZ_OFFSET_MINUTES", "1440")]).is_err());
        assert!(config_from(&[("BOT_TOKEN", "t"), ("NOTIFY_ONCE_PER_DAY", "yes")]).is_err());
    }
}
