//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_ALLOW_PUBLIC_BIND` - Set to `true` to bind a non-loopback address
//! - `BUSINESS_INFO_ID` - Business info document printed on invoices (default: oldest record)
//! - `RENDER_SERVICE_URL` - HTML-to-PNG render service; enables invoice PDF export
//! - `RENDER_SERVICE_TOKEN` - Bearer token for the render service
//! - `RENDER_SERVICE_TIMEOUT_SECS` - Render request timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)
//!
//! The admin panel has no login. It binds to loopback unless
//! `ADMIN_ALLOW_PUBLIC_BIND=true`, in which case access control must be
//! provided by the network (VPN, reverse proxy).

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use shopfloor_core::BusinessInfoId;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Business info document printed on invoices
    pub business_info_id: Option<BusinessInfoId>,
    /// Render service for invoice PDFs (disabled when `None`)
    pub render: Option<RenderServiceConfig>,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// HTML-to-PNG render service settings.
#[derive(Clone)]
pub struct RenderServiceConfig {
    pub url: Url,
    pub token: Option<SecretString>,
    pub timeout: Duration,
}

impl std::fmt::Debug for RenderServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderServiceConfig")
            .field("url", &self.url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RenderServiceConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(raw) = get_optional_env("RENDER_SERVICE_URL") else {
            return Ok(None);
        };
        let url = Url::parse(&raw).map_err(|e| {
            ConfigError::InvalidEnvVar("RENDER_SERVICE_URL".to_owned(), e.to_string())
        })?;

        Ok(Some(Self {
            url,
            token: get_optional_env("RENDER_SERVICE_TOKEN").map(SecretString::from),
            timeout: Duration::from_secs(parse_env("RENDER_SERVICE_TIMEOUT_SECS", "30")?),
        }))
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if a non-loopback bind address is configured without
    /// `ADMIN_ALLOW_PUBLIC_BIND=true`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host: IpAddr = parse_env("ADMIN_HOST", "127.0.0.1")?;
        let allow_public = parse_env::<bool>("ADMIN_ALLOW_PUBLIC_BIND", "false")?;
        check_bind_address(host, allow_public)?;

        Ok(Self {
            database_url: get_database_url("ADMIN_DATABASE_URL")?,
            host,
            port: parse_env("ADMIN_PORT", "3001")?,
            business_info_id: get_optional_env("BUSINESS_INFO_ID").map(BusinessInfoId::new),
            render: RenderServiceConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Refuse to expose the unauthenticated panel beyond loopback unless the
/// operator opted in.
fn check_bind_address(host: IpAddr, allow_public: bool) -> Result<(), ConfigError> {
    if host.is_loopback() || allow_public {
        return Ok(());
    }
    Err(ConfigError::InvalidEnvVar(
        "ADMIN_HOST".to_owned(),
        format!("{host} is not a loopback address; set ADMIN_ALLOW_PUBLIC_BIND=true to allow it"),
    ))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable (or its default) with `FromStr`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_owned())
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_check_bind_address() {
        assert!(check_bind_address("127.0.0.1".parse().unwrap(), false).is_ok());
        assert!(check_bind_address("::1".parse().unwrap(), false).is_ok());

        let err = check_bind_address("0.0.0.0".parse().unwrap(), false).unwrap_err();
        assert!(err.to_string().contains("ADMIN_ALLOW_PUBLIC_BIND"));
        assert!(check_bind_address("0.0.0.0".parse().unwrap(), true).is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = AdminConfig {
            database_url: SecretString::from("postgres://localhost/shopfloor"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            business_info_id: None,
            render: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
        assert!(!format!("{config:?}").contains("postgres://localhost"));
    }

    #[test]
    fn test_render_config_debug_redacts_token() {
        let config = RenderServiceConfig {
            url: Url::parse("http://render.internal:8080/render").unwrap(),
            token: Some(SecretString::from("tok_live_123")),
            timeout: Duration::from_secs(30),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("render.internal"));
        assert!(!debug_output.contains("tok_live_123"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
