use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub db_connect_attempts: u32,
    pub db_connect_delay: Duration,
    pub request_timeout: Duration,
    pub update_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset keys fall back to
    /// defaults; set but unparsable numbers are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            host: var("REVIEWER_HOST", "0.0.0.0"),
            port: parse(&lookup, "REVIEWER_PORT", 8080)?,
            db_path: PathBuf::from(var("REVIEWER_DB_PATH", "reviewer.db")),
            db_connect_attempts: parse(&lookup, "REVIEWER_DB_CONNECT_ATTEMPTS", 15u32)?.max(1),
            db_connect_delay: Duration::from_secs(parse(
                &lookup,
                "REVIEWER_DB_CONNECT_DELAY_SECS",
                2,
            )?),
            request_timeout: Duration::from_secs(parse(
                &lookup,
                "REVIEWER_REQUEST_TIMEOUT_SECS",
                30,
            )?),
            update_attempts: parse(&lookup, "REVIEWER_UPDATE_ATTEMPTS", 3u32)?,
        })
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}
