//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `STOREFRONT_WHATSAPP_NUMBER` - Store WhatsApp number (default: 5511999999999)
//! - `STOREFRONT_SIMULATED_LATENCY_MS` - Delay for login, signup and CEP lookup (default: 0)
//! - `STOREFRONT_RATE_LIMIT` - Rate-limit auth form posts (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default WhatsApp contact number, digits only.
pub const DEFAULT_WHATSAPP_NUMBER: &str = "5511999999999";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// WhatsApp number used in outbound links
    pub whatsapp_number: String,
    /// Artificial delay for mocked network calls
    pub simulated_latency: Duration,
    /// Whether auth form posts are rate limited
    pub rate_limit: bool,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
            simulated_latency: Duration::ZERO,
            rate_limit: true,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let host = parse_env("STOREFRONT_HOST", defaults.host)?;
        let port = parse_env("STOREFRONT_PORT", defaults.port)?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", &defaults.base_url);
        validate_base_url(&base_url)?;
        let whatsapp_number = get_env_or_default("STOREFRONT_WHATSAPP_NUMBER", DEFAULT_WHATSAPP_NUMBER);
        let latency_ms: u64 = parse_env("STOREFRONT_SIMULATED_LATENCY_MS", 0)?;
        let rate_limit = parse_env("STOREFRONT_RATE_LIMIT", defaults.rate_limit)?;

        let sentry_sample_rate = parse_env("SENTRY_SAMPLE_RATE", defaults.sentry_sample_rate)?;
        let sentry_traces_sample_rate =
            parse_env("SENTRY_TRACES_SAMPLE_RATE", defaults.sentry_traces_sample_rate)?;

        Ok(Self {
            host,
            port,
            base_url,
            whatsapp_number,
            simulated_latency: Duration::from_millis(latency_ms),
            rate_limit,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// The base URL must be an absolute http(s) URL.
fn validate_base_url(value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| {
        ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "STOREFRONT_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig::default();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.whatsapp_number, "5511999999999");
        assert_eq!(config.simulated_latency, Duration::ZERO);
        assert!(config.rate_limit);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://essencearabe.com").is_ok());
        assert!(validate_base_url("http://localhost:3000").is_ok());
        assert!(matches!(
            validate_base_url("ftp://essencearabe.com"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("STOREFRONT_TEST_UNSET_PORT_VAR", 4000).unwrap();
        assert_eq!(port, 4000);
    }
}
