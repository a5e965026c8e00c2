use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Time between promotion sweep passes
    pub promotion_interval: Duration,
    pub promotion_batch_size: i64,
    /// Upper bound on any single store operation
    pub store_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            jwt_secret: lookup("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "release-desk".to_string()),
            promotion_interval: Duration::from_millis(parse_or(
                &lookup,
                "PROMOTION_INTERVAL_MS",
                5000,
            )?),
            promotion_batch_size: parse_or(&lookup, "PROMOTION_BATCH_SIZE", 50)?,
            store_timeout: Duration::from_millis(parse_or(&lookup, "STORE_TIMEOUT_MS", 5000)?),
        };

        if config.promotion_batch_size < 1 {
            anyhow::bail!("PROMOTION_BATCH_SIZE must be at least 1");
        }
        if config.promotion_interval.is_zero() {
            anyhow::bail!("PROMOTION_INTERVAL_MS must be greater than 0");
        }

        Ok(config)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/releases"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.jwt_issuer, "release-desk");
        assert_eq!(config.promotion_interval, Duration::from_secs(5));
        assert_eq!(config.promotion_batch_size, 50);
        assert_eq!(config.store_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_secret() {
        let result = Config::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "postgres://localhost/releases",
        )]));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/releases"),
            ("JWT_SECRET", "secret"),
            ("PORT", "3000"),
            ("PROMOTION_INTERVAL_MS", "250"),
            ("PROMOTION_BATCH_SIZE", "5"),
        ]))
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.promotion_interval, Duration::from_millis(250));
        assert_eq!(config.promotion_batch_size, 5);

        let bad = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/releases"),
            ("JWT_SECRET", "secret"),
            ("PORT", "eighty"),
        ]));
        assert!(bad.is_err());

        let zero_batch = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/releases"),
            ("JWT_SECRET", "secret"),
            ("PROMOTION_BATCH_SIZE", "0"),
        ]));
        assert!(zero_batch.is_err());
    }
}
