// src/config.rs
// Runtime settings built once at process entry and passed in explicitly;
// nothing downstream reads the environment.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Result};

use crate::aggregate::{DEFAULT_MIN_MENTIONS, DEFAULT_STRONG_PCT};
use crate::scoring::{DEFAULT_HYPE_CUTOFF, DEFAULT_IMPACT_CUTOFF};

#[derive(Debug, Clone)]
pub struct Settings {
    pub bot_token: String,
    pub chat_id: String,

    pub state_path: PathBuf,
    pub hype_state_path: PathBuf,
    pub summary_state_path: PathBuf,

    pub impact_cutoff: f64,
    pub hype_cutoff: f64,
    /// Lookback for impact news recency, hours.
    pub recent_hours: i64,
    /// Lookback for hype news recency, hours.
    pub hype_recent_hours: i64,
    /// Dedupe-record retention floor, hours.
    pub dedupe_hours: i64,

    pub min_mentions: usize,
    pub strong_pct: u8,

    pub heartbeat: bool,
    pub max_hype_alerts: usize,
}

impl Settings {
    /// The one hard startup failure: missing bot credentials. Everything
    /// else falls back to the defaults the watchers have always used.
    pub fn from_env() -> Result<Self> {
        let bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let chat_id = required("TELEGRAM_CHAT_ID")?;

        Ok(Self {
            bot_token,
            chat_id,
            state_path: PathBuf::from(
                env_or("WATCH_STATE_PATH", "state.json"),
            ),
            hype_state_path: PathBuf::from(
                env_or("WATCH_HYPE_STATE_PATH", "hype_state.json"),
            ),
            summary_state_path: PathBuf::from(
                env_or("WATCH_SUMMARY_STATE_PATH", "summary_state.json"),
            ),
            impact_cutoff: parsed("WATCH_IMPACT_CUTOFF", DEFAULT_IMPACT_CUTOFF),
            hype_cutoff: parsed("WATCH_HYPE_CUTOFF", DEFAULT_HYPE_CUTOFF),
            recent_hours: parsed("WATCH_RECENT_HOURS", 24),
            hype_recent_hours: parsed("WATCH_HYPE_RECENT_HOURS", 6),
            dedupe_hours: parsed("WATCH_DEDUPE_HOURS", 12),
            min_mentions: parsed("WATCH_MIN_MENTIONS", DEFAULT_MIN_MENTIONS),
            strong_pct: parsed("WATCH_STRONG_PCT", DEFAULT_STRONG_PCT),
            heartbeat: env_or("WATCH_HEARTBEAT", "1") != "0",
            max_hype_alerts: parsed("WATCH_MAX_HYPE_ALERTS", 5),
        })
    }
}

fn required(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => bail!("missing required env var {name}"),
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).ok().unwrap_or_else(|| default.to_string())
}

fn parsed<T: FromStr + Copy>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear() {
        for k in [
            "TELEGRAM_BOT_TOKEN",
            "TELEGRAM_CHAT_ID",
            "WATCH_STATE_PATH",
            "WATCH_IMPACT_CUTOFF",
            "WATCH_HEARTBEAT",
        ] {
            env::remove_var(k);
        }
    }

    #[serial]
    #[test]
    fn missing_credentials_is_fatal() {
        clear();
        assert!(Settings::from_env().is_err());

        env::set_var("TELEGRAM_BOT_TOKEN", "t");
        assert!(Settings::from_env().is_err()); // chat id still missing
        clear();
    }

    #[serial]
    #[test]
    fn defaults_apply_when_unset() {
        clear();
        env::set_var("TELEGRAM_BOT_TOKEN", "t");
        env::set_var("TELEGRAM_CHAT_ID", "c");

        let s = Settings::from_env().unwrap();
        assert_eq!(s.state_path, PathBuf::from("state.json"));
        assert_eq!(s.impact_cutoff, DEFAULT_IMPACT_CUTOFF);
        assert_eq!(s.dedupe_hours, 12);
        assert!(s.heartbeat);
        clear();
    }

    #[serial]
    #[test]
    fn overrides_parse_and_bad_values_fall_back() {
        clear();
        env::set_var("TELEGRAM_BOT_TOKEN", "t");
        env::set_var("TELEGRAM_CHAT_ID", "c");
        env::set_var("WATCH_IMPACT_CUTOFF", "7.5");
        env::set_var("WATCH_HEARTBEAT", "0");

        let s = Settings::from_env().unwrap();
        assert_eq!(s.impact_cutoff, 7.5);
        assert!(!s.heartbeat);

        env::set_var("WATCH_IMPACT_CUTOFF", "not-a-number");
        let s = Settings::from_env().unwrap();
        assert_eq!(s.impact_cutoff, DEFAULT_IMPACT_CUTOFF);
        clear();
    }
}
