use anyhow::{bail, Context};
use serde::Deserialize;

const DEFAULT_TTL_MINUTES: i64 = 60 * 24;
/// One year; longer sessions would be indistinguishable from never expiring.
pub const MAX_TTL_MINUTES: i64 = 366 * 24 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_minutes: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
    pub max_photo_bytes: usize,
}

impl SessionConfig {
    pub fn ttl(&self) -> time::Duration {
        time::Duration::seconds(self.ttl_minutes.saturating_mul(60))
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/app.sqlite?mode=rwc".into());
        let production = std::env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);
        let session = SessionConfig {
            ttl_minutes: parse_ttl_minutes(std::env::var("SESSION_TTL_MINUTES").ok().as_deref())?,
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "session_token".into()),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(production),
            sweep_interval_secs: std::env::var("SESSION_SWEEP_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(600),
        };
        let max_photo_bytes = std::env::var("MAX_PHOTO_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(5 * 1024 * 1024);
        Ok(Self {
            database_url,
            session,
            max_photo_bytes,
        })
    }
}

/// Absent means the 24 h default; anything else must be a whole number of
/// minutes in `1..=MAX_TTL_MINUTES`.
fn parse_ttl_minutes(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TTL_MINUTES);
    };
    let minutes = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("SESSION_TTL_MINUTES is not a number: {raw}"))?;
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        bail!("SESSION_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {minutes}");
    }
    Ok(minutes)
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" ON "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn ttl_minutes_bounds() {
        assert_eq!(parse_ttl_minutes(None).unwrap(), 1440);
        assert_eq!(parse_ttl_minutes(Some(" 90 ")).unwrap(), 90);
        assert_eq!(parse_ttl_minutes(Some("527040")).unwrap(), MAX_TTL_MINUTES);
        assert!(parse_ttl_minutes(Some("0")).is_err());
        assert!(parse_ttl_minutes(Some("-5")).is_err());
        assert!(parse_ttl_minutes(Some("soon")).is_err());
        assert!(parse_ttl_minutes(Some("10000000000")).is_err());
    }

    #[test]
    fn oversized_ttl_saturates_instead_of_panicking() {
        let cfg = SessionConfig {
            ttl_minutes: i64::MAX,
            cookie_name: "s".into(),
            cookie_secure: false,
            sweep_interval_secs: 0,
        };
        assert_eq!(cfg.ttl(), time::Duration::seconds(i64::MAX));
    }

    #[test]
    fn session_ttl_is_minutes() {
        let cfg = SessionConfig {
            ttl_minutes: 90,
            cookie_name: "s".into(),
            cookie_secure: false,
            sweep_interval_secs: 0,
        };
        assert_eq!(cfg.ttl(), time::Duration::minutes(90));
    }
}
