//! Startup configuration
//!
//! All settings are read once from the environment in `main` and carried in
//! [`ApiConfig`]; nothing reads the environment after startup.
//!
//! # Environment Variables
//!
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `API_PORT`: Port to listen on (default: 3000)
//! - `NATOURS_ENV`: `development` or `production` (default: production)
//! - `RATE_LIMIT_MAX`: Requests allowed per client and window (default: 100)
//! - `RATE_LIMIT_WINDOW_SECS`: Rate limit window length (default: 3600)
//! - `BODY_LIMIT_BYTES`: Largest accepted JSON body (default: 10240)
//! - `PUBLIC_DIR`: Directory served as static files (default: public)

use std::{fmt::Display, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;

use crate::{RateLimitConfig, DEFAULT_PORT};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Largest JSON body accepted, in bytes.
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Deployment environment; development enables request logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!(
                "unknown environment '{other}', expected 'development' or 'production'"
            )),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    pub environment: Environment,

    /// Limits applied to every `/api` request
    pub rate_limit: RateLimitConfig,

    /// Largest accepted JSON body, in bytes
    pub body_limit: usize,

    /// Directory served as static files
    pub public_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            environment: Environment::default(),
            rate_limit: RateLimitConfig::default(),
            body_limit: DEFAULT_BODY_LIMIT,
            public_dir: PathBuf::from("public"),
        }
    }
}

impl ApiConfig {
    /// Load configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is set but cannot
    /// be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let window_secs = parse_var(
            &lookup,
            "RATE_LIMIT_WINDOW_SECS",
            defaults.rate_limit.window.as_secs(),
        )?;

        Ok(Self {
            host: lookup("API_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "API_PORT", defaults.port)?,
            environment: parse_var(&lookup, "NATOURS_ENV", defaults.environment)?,
            rate_limit: RateLimitConfig {
                max_requests: parse_var(
                    &lookup,
                    "RATE_LIMIT_MAX",
                    defaults.rate_limit.max_requests,
                )?,
                window: Duration::from_secs(window_secs),
                ..defaults.rate_limit
            },
            body_limit: parse_var(&lookup, "BODY_LIMIT_BYTES", defaults.body_limit)?,
            public_dir: lookup("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
            reason: e.to_string(),
        }),
    }
}
