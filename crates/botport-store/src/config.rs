//! Connection pool settings

use std::str::FromStr;
use std::time::Duration;

use crate::connection::ConnectionError;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    /// Default pool settings for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Pool settings from `BOTPORT_DB_MAX_CONNECTIONS`,
    /// `BOTPORT_DB_MIN_CONNECTIONS` and `BOTPORT_DB_CONNECT_TIMEOUT` (seconds)
    pub fn from_env(url: impl Into<String>) -> Result<Self, ConnectionError> {
        Self::from_lookup(url, |name| std::env::var(name).ok())
    }

    fn from_lookup(
        url: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConnectionError> {
        let mut config = Self::new(url);
        if let Some(max) = parse_var(&lookup, "BOTPORT_DB_MAX_CONNECTIONS")? {
            config.max_connections = max;
        }
        if let Some(min) = parse_var(&lookup, "BOTPORT_DB_MIN_CONNECTIONS")? {
            config.min_connections = min;
        }
        if let Some(secs) = parse_var(&lookup, "BOTPORT_DB_CONNECT_TIMEOUT")? {
            config.connect_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Every pooled connection to an in-memory SQLite database sees its own
    /// empty database
    pub fn is_memory(&self) -> bool {
        self.url.starts_with("sqlite::memory:") || self.url.contains("mode=memory")
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConnectionError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConnectionError::InvalidSetting { name, value }),
    }
}
