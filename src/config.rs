//! Configuration module for devlink.

use serde::Deserialize;
use std::path::Path;

use crate::{DevlinkError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/devlink.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Authentication configuration.
///
/// The two token secrets must be set and must differ from each other;
/// [`AuthConfig::validate`] is called at startup and refuses to run
/// otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret key for signing access tokens.
    #[serde(default)]
    pub access_token_secret: String,
    /// Secret key for signing refresh tokens.
    #[serde(default)]
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry_secs: i64,
    /// Refresh token lifetime in days.
    #[serde(default = "default_refresh_expiry")]
    pub refresh_token_expiry_days: i64,
    /// Failed login attempts before the account is locked.
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: i64,
    /// Lockout window in minutes.
    #[serde(default = "default_lockout_minutes")]
    pub lockout_minutes: i64,
    /// JWT issuer claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// JWT audience claim for access tokens.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Whether the refresh cookie is marked Secure (HTTPS only).
    ///
    /// Also selects SameSite: Strict when secure, Lax in development.
    #[serde(default)]
    pub cookie_secure: bool,
}

fn default_access_expiry() -> i64 {
    15 * 60
}

fn default_refresh_expiry() -> i64 {
    7
}

fn default_max_login_attempts() -> i64 {
    5
}

fn default_lockout_minutes() -> i64 {
    30
}

fn default_issuer() -> String {
    "devlink".to_string()
}

fn default_audience() -> String {
    "devlink-api".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_expiry_secs: default_access_expiry(),
            refresh_token_expiry_days: default_refresh_expiry(),
            max_login_attempts: default_max_login_attempts(),
            lockout_minutes: default_lockout_minutes(),
            issuer: default_issuer(),
            audience: default_audience(),
            cookie_secure: false,
        }
    }
}

impl AuthConfig {
    /// Validate the auth configuration.
    ///
    /// A shared signing key would let a refresh token masquerade as an
    /// access token, so equal secrets are rejected at startup.
    pub fn validate(&self) -> Result<()> {
        if self.access_token_secret.is_empty() {
            return Err(DevlinkError::Config(
                "auth.access_token_secret is not set".to_string(),
            ));
        }
        if self.refresh_token_secret.is_empty() {
            return Err(DevlinkError::Config(
                "auth.refresh_token_secret is not set".to_string(),
            ));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(DevlinkError::Config(
                "auth.access_token_secret and auth.refresh_token_secret must differ".to_string(),
            ));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path (empty for console-only logging).
    #[serde(default)]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config =
            toml::from_str(&content).map_err(|e| DevlinkError::Config(e.to_string()))?;
        Ok(config)
    }
}
