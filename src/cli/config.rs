//! Configuration file and environment overrides.
//!
//! Precedence, lowest first: built-in defaults, the JSON config file,
//! environment variables (a `.env` file is loaded into the environment at
//! startup), then command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use super::errors::{CliError, CliResult};
use crate::auth::{AuthConfig, EmailConfig};
use crate::http_server::HttpServerConfig;
use crate::observability::LogConfig;

/// Placeholder secret; refused in production
const DEFAULT_SECRET: &str = "CHANGE_THIS_SECRET_IN_PRODUCTION";

const MIN_PRODUCTION_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Where collections are persisted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// None keeps everything in memory
    pub data_dir: Option<PathBuf>,
}

/// Configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: HttpServerConfig,

    pub auth: AuthConfig,

    /// SMTP settings; reset emails are only kept in memory without them
    pub email: Option<EmailConfig>,

    pub storage: StorageConfig,

    pub logging: LogConfig,

    pub environment: Environment,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    /// File (or defaults), then process environment, then validation
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from environment variables looked up through `var`
    pub fn apply_env<F>(&mut self, var: F) -> CliResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = var("PORT") {
            self.server.port = parse_var("PORT", &port)?;
        }
        if let Some(secret) = var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(days) = var("JWT_EXPIRATION_DAYS") {
            self.auth.jwt_expiration_days = parse_var("JWT_EXPIRATION_DAYS", &days)?;
        }
        if let Some(days) = var("JWT_COOKIE_EXPIRATION_DAYS") {
            self.auth.cookie_expiration_days = parse_var("JWT_COOKIE_EXPIRATION_DAYS", &days)?;
        }
        if let Some(url) = var("PUBLIC_URL") {
            self.auth.public_url = Some(url);
        }

        if let Some(host) = var("EMAIL_HOST") {
            self.email.get_or_insert_with(EmailConfig::default).smtp_host = host;
        }
        if let Some(email) = self.email.as_mut() {
            if let Some(port) = var("EMAIL_PORT") {
                email.smtp_port = parse_var("EMAIL_PORT", &port)?;
            }
            if let Some(user) = var("EMAIL_USERNAME") {
                email.smtp_user = user;
            }
            if let Some(password) = var("EMAIL_PASSWORD") {
                email.smtp_password = password;
            }
        }

        if let Some(dir) = var("DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(env) = var("APP_ENV") {
            self.environment = match env.to_lowercase().as_str() {
                "production" | "prod" => Environment::Production,
                "development" | "dev" => Environment::Development,
                other => {
                    return Err(CliError::config_error(format!(
                        "Invalid APP_ENV: '{}'. Expected 'development' or 'production'.",
                        other
                    )))
                }
            };
        }
        if self.environment == Environment::Production {
            self.auth.secure_cookies = true;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(CliError::config_error("auth.jwt_secret must not be empty"));
        }
        if self.environment == Environment::Production
            && (self.auth.jwt_secret == DEFAULT_SECRET
                || self.auth.jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN)
        {
            return Err(CliError::config_error(format!(
                "Production requires a JWT_SECRET of at least {} characters",
                MIN_PRODUCTION_SECRET_LEN
            )));
        }
        if self.auth.jwt_expiration_days <= 0 || self.auth.cookie_expiration_days <= 0 {
            return Err(CliError::config_error("Token and cookie lifetimes must be > 0 days"));
        }
        if self.auth.reset_token_ttl_minutes <= 0 {
            return Err(CliError::config_error("auth.reset_token_ttl_minutes must be > 0"));
        }
        if self.auth.min_password_length == 0 {
            return Err(CliError::config_error("auth.min_password_length must be > 0"));
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> CliResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::config_error(format!("Invalid value for {}: '{}'", key, value)))
}
