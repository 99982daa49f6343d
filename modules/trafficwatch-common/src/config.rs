use std::env;
use std::time::Duration;

use crate::error::TrafficWatchError;

/// Bound on a single storage scan before the query gives up.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(10);

/// Application configuration loaded from environment variables.
/// Policy knobs (recency window, default radius) are constants, not config.
#[derive(Debug, Clone)]
pub struct Config {
    // Database. Absent means the in-memory store.
    pub database_url: Option<String>,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Storage
    pub scan_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, TrafficWatchError> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: parse_env("PORT", 8080)?,
            scan_timeout: parse_scan_timeout("SCAN_TIMEOUT_SECS")?,
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  DATABASE_URL: {}",
            if self.database_url.is_some() { "<set>" } else { "<not set, using in-memory store>" }
        );
        tracing::info!("  WEB_HOST: {}", self.web_host);
        tracing::info!("  PORT: {}", self.web_port);
        tracing::info!("  SCAN_TIMEOUT_SECS: {}", self.scan_timeout.as_secs());
    }
}

/// A zero timeout would fail every scan, so it is a config error.
fn parse_scan_timeout(key: &str) -> Result<Duration, TrafficWatchError> {
    match parse_env(key, DEFAULT_SCAN_TIMEOUT.as_secs())? {
        0 => Err(TrafficWatchError::Config(format!("{key} must be greater than zero"))),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, TrafficWatchError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| TrafficWatchError::Config(format!("{key} must be a number: {e}"))),
        _ => Ok(default),
    }
}
