//! Web front-end configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required in production
//! - `AGENCY_API_URL` - Base URL of the agency REST API (e.g. `https://api.example.com/api/v1`)
//!
//! ## Optional
//! - `AGENCY_ENV` - `development` (default) or `production`
//! - `AGENCY_HOST` - Bind address (default: 127.0.0.1)
//! - `AGENCY_PORT` - Listen port (default: 3000)
//! - `AGENCY_BASE_URL` - Public URL of this site (default: `http://{host}:{port}`)
//! - `AGENCY_API_TIMEOUT_SECS` - Per-call API timeout (default: 10)
//! - `DEMO_USERNAME` / `DEMO_PASSWORD` - Pre-fill the login form (both or neither)
//! - `SENTRY_DSN` - error reporting endpoint
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// API base URL used in development when `AGENCY_API_URL` is unset.
pub const DEFAULT_DEV_API_URL: &str = "http://localhost:5000/api/v1";

const DEFAULT_API_TIMEOUT_SECS: u64 = 10;

/// Why the configuration could not be built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Name of the dotenv file read for this environment.
    #[must_use]
    pub const fn dotenv_file(self) -> &'static str {
        match self {
            Self::Development => ".env",
            Self::Production => ".env.production",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "dev" | "development" => Ok(Self::Development),
            "prod" | "production" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvVar(
                "AGENCY_ENV".to_string(),
                format!("unknown environment '{other}'"),
            )),
        }
    }
}

/// Web front-end configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub environment: Environment,
    /// Bind address (`AGENCY_HOST`)
    pub host: IpAddr,
    /// Listen port (`AGENCY_PORT`)
    pub port: u16,
    /// Public base URL of this site
    pub base_url: String,
    /// Base URL of the agency REST API
    pub api_url: String,
    /// Upper bound for a single API call
    pub api_timeout: Duration,
    /// Login form pre-fill (disabled unless configured)
    pub demo: Option<DemoCredentials>,
    /// Error reporting DSN; reporting is off when unset
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent
    pub sentry_sample_rate: f32,
    /// Fraction of request transactions sent
    pub sentry_traces_sample_rate: f32,
}

/// Credentials pre-filled on the login page.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct DemoCredentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for DemoCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl DemoCredentials {
    fn from_vars(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        match (lookup("DEMO_USERNAME"), lookup("DEMO_PASSWORD")) {
            (Some(username), Some(password)) => Ok(Some(Self {
                username,
                password: SecretString::from(password),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "DEMO_*".to_string(),
                "Both DEMO_USERNAME and DEMO_PASSWORD must be set together".to_string(),
            )),
        }
    }
}

impl WebConfig {
    /// Reads configuration from the process environment.
    ///
    /// Reads `.env` (or `.env.production` when `AGENCY_ENV=production`) if
    /// present; variables already set in the process take precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or a required one is
    /// missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = get_optional_env("AGENCY_ENV")
            .as_deref()
            .unwrap_or_default()
            .parse::<Environment>()?;

        // Load the dotenv file if present (ignore errors if not found)
        let _ = dotenvy::from_filename(environment.dotenv_file());

        Self::from_vars(|key| get_optional_env(key))
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or a required one is
    /// missing.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = lookup("AGENCY_ENV")
            .as_deref()
            .unwrap_or_default()
            .parse::<Environment>()?;

        let host = lookup("AGENCY_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("AGENCY_HOST".to_string(), e.to_string()))?;
        let port = lookup("AGENCY_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("AGENCY_PORT".to_string(), e.to_string()))?;
        let base_url = lookup("AGENCY_BASE_URL").unwrap_or_else(|| format!("http://{host}:{port}"));

        let api_url = match (lookup("AGENCY_API_URL"), environment) {
            (Some(url), _) => url,
            (None, Environment::Development) => DEFAULT_DEV_API_URL.to_string(),
            (None, Environment::Production) => {
                return Err(ConfigError::MissingEnvVar("AGENCY_API_URL".to_string()));
            }
        };
        url::Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("AGENCY_API_URL".to_string(), e.to_string()))?;

        let api_timeout = match lookup("AGENCY_API_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("AGENCY_API_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            None => DEFAULT_API_TIMEOUT_SECS,
        };

        let demo = DemoCredentials::from_vars(&lookup)?;
        let sentry_dsn = lookup("SENTRY_DSN");
        let sentry_environment = lookup("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = lookup("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = lookup("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            environment,
            host,
            port,
            base_url,
            api_url,
            api_timeout: Duration::from_secs(api_timeout),
            demo,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Address the listener binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (enables secure cookies).
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional, non-empty environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<WebConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        WebConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.api_url, DEFAULT_DEV_API_URL);
        assert_eq!(config.api_timeout, Duration::from_secs(10));
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
        assert!(config.demo.is_none());
        assert!(!config.is_https());
    }

    #[test]
    fn test_production_requires_api_url() {
        let result = load(&[("AGENCY_ENV", "production")]);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "AGENCY_API_URL"));

        let config = load(&[
            ("AGENCY_ENV", "production"),
            ("AGENCY_API_URL", "https://api.example.com/api/v1"),
            ("AGENCY_BASE_URL", "https://example.com"),
        ])
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert!(config.is_https());
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("AGENCY_PORT", "not-a-port")]).is_err());
        assert!(load(&[("AGENCY_HOST", "localhost:3000")]).is_err());
        assert!(load(&[("AGENCY_API_URL", "/api/v1")]).is_err());
        assert!(load(&[("AGENCY_API_TIMEOUT_SECS", "ten")]).is_err());
        assert!(load(&[("AGENCY_ENV", "staging")]).is_err());
    }

    #[test]
    fn test_demo_credentials_must_be_paired() {
        assert!(load(&[("DEMO_USERNAME", "admin")]).is_err());

        let config = load(&[("DEMO_USERNAME", "admin"), ("DEMO_PASSWORD", "admin123")]).unwrap();
        let demo = config.demo.unwrap();
        assert_eq!(demo.username, "admin");

        let debug_output = format!("{demo:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("admin123"));
    }

    #[test]
    fn test_socket_addr() {
        let config = load(&[("AGENCY_HOST", "0.0.0.0"), ("AGENCY_PORT", "8080")]).unwrap();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
    }
}
