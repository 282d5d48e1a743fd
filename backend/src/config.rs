use std::{fmt::Display, str::FromStr};
use shuttle_runtime::SecretStore;
use thiserror::Error;
use tracing::{info, warn};

pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not configured")]
    Missing(&'static str),
    #[error("{0} must be at least {1} bytes long")]
    TooShort(&'static str, usize),
}

/// Runtime settings, read from Shuttle secrets (`Secrets.toml`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub session_secret: String,
    pub allowed_origin: String,
    pub top_voted_limit: usize,
    pub max_top_voted_limit: usize,
    pub vote_attempts_per_minute: u32,
}

impl Settings {
    pub fn from_secrets(secrets: &SecretStore) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| secrets.get(key))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let session_secret = lookup("SESSION_SECRET")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SESSION_SECRET"))?;
        if session_secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::TooShort("SESSION_SECRET", MIN_SECRET_LENGTH));
        }

        let max_top_voted_limit = try_load(&lookup, "MAX_TOP_VOTED_LIMIT", 50usize).max(1);
        let mut top_voted_limit = try_load(&lookup, "TOP_VOTED_LIMIT", 3usize).max(1);
        if top_voted_limit > max_top_voted_limit {
            warn!("TOP_VOTED_LIMIT {top_voted_limit} exceeds MAX_TOP_VOTED_LIMIT, clamping to {max_top_voted_limit}");
            top_voted_limit = max_top_voted_limit;
        }

        Ok(Self {
            session_secret,
            allowed_origin: try_load(&lookup, "ALLOWED_ORIGIN", "http://localhost".to_string()),
            top_voted_limit,
            max_top_voted_limit,
            vote_attempts_per_minute: try_load(&lookup, "VOTE_ATTEMPTS_PER_MINUTE", 10u32).max(1),
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
    }
}
