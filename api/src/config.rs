//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{bail, Result};
use std::net::SocketAddr;

/// Row limit used when a request does not ask for one.
pub const DEFAULT_LIMIT: i64 = 100;

/// Timezone used when a request does not name one.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `LOGCHEF_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `LOGCHEF_PORT`: The port to listen on (default: 8080)
/// - `LOGCHEF_DEFAULT_LIMIT`: Row limit for full queries without one (default: 100)
/// - `LOGCHEF_DEFAULT_TIMEZONE`: Timezone for full SQL queries without one (default: "UTC")
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Row limit applied when a request's limit is missing or not positive.
    pub default_limit: i64,
    /// Timezone applied when a request does not carry one.
    pub default_timezone: String,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `LOGCHEF_PORT` is set but cannot be parsed as a valid port number
    /// - `LOGCHEF_DEFAULT_LIMIT` is set but is not a positive integer
    /// - `LOGCHEF_DEFAULT_TIMEZONE` is set but is not an accepted timezone
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("LOGCHEF_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("LOGCHEF_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()?
            .unwrap_or(8080);

        let default_limit = std::env::var("LOGCHEF_DEFAULT_LIMIT")
            .ok()
            .map(|l| l.parse::<i64>())
            .transpose()?
            .unwrap_or(DEFAULT_LIMIT);
        if default_limit <= 0 {
            bail!("LOGCHEF_DEFAULT_LIMIT must be positive, got {default_limit}");
        }

        let default_timezone = std::env::var("LOGCHEF_DEFAULT_TIMEZONE")
            .unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());
        logchefql::builder::validate_timezone(&default_timezone)?;

        Ok(Self {
            host,
            port,
            default_limit,
            default_timezone,
        })
    }

    /// Resolves a requested limit, falling back to the default when it is
    /// missing or not positive.
    #[must_use]
    pub fn effective_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .filter(|limit| *limit > 0)
            .unwrap_or(self.default_limit)
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port combination is not a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            default_limit: DEFAULT_LIMIT,
            default_timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}
