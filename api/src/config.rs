//! API Configuration Module
//!
//! Handles configuration loading for the folio API server. Supports
//! environment variables (prefix `FOLIO_`), an optional `folio.toml`
//! configuration file, and validated defaults.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "development-only-jwt-secret-change-me";

/// Server configuration for the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server bind address and port
    pub bind_address: SocketAddr,

    /// Database connection URL
    pub database_url: String,

    /// JWT signing secret for access tokens
    pub jwt_secret: String,

    /// Quote vendor endpoint root
    pub quote_base_url: String,

    /// Quote vendor API token
    pub quote_api_token: String,

    /// Serve fixed sandbox quotes instead of calling the vendor
    pub sandbox: bool,

    /// Server environment (development, staging, production)
    pub environment: String,

    /// Log filter (e.g. "info", "folio=debug,sqlx=warn")
    pub log_filter: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), 8080),
            database_url: "postgresql://localhost:5432/folio".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            quote_base_url: quote_client::http::DEFAULT_BASE_URL.to_string(),
            quote_api_token: String::new(),
            sandbox: false,
            environment: "development".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment variables and config files
    pub fn from_env() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("folio.toml").required(false))
            .add_source(File::with_name("config/folio.toml").required(false))
            .add_source(Environment::with_prefix("FOLIO").try_parsing(true))
            .set_override_option("database_url", std::env::var("DATABASE_URL").ok())?;

        let config = builder.build()?;
        let api_config: ApiConfig = config.try_deserialize()?;

        // Validate configuration
        api_config.validate()?;

        // Log configuration (without sensitive data)
        info!("API configuration loaded:");
        info!("  Environment: {}", api_config.environment);
        info!("  Bind address: {}", api_config.bind_address);
        info!("  Database: [REDACTED]");
        info!("  Sandbox quotes: {}", api_config.sandbox);

        if api_config.jwt_secret == DEFAULT_JWT_SECRET && !api_config.is_development() {
            warn!("Using the default JWT secret outside development! Set FOLIO_JWT_SECRET.");
        }

        Ok(api_config)
    }

    /// Validates the configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.is_empty() {
            return Err(ConfigError::Message(
                "Database URL cannot be empty".to_string(),
            ));
        }

        if self.jwt_secret.is_empty() {
            return Err(ConfigError::Message(
                "JWT secret cannot be empty".to_string(),
            ));
        }

        if !self.sandbox && self.quote_api_token.is_empty() {
            return Err(ConfigError::Message(
                "Quote API token must be set unless sandbox mode is enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns true if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Returns true if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.environment, "development");
        assert!(config.is_development());
        assert!(!config.is_production());
    }

    #[test]
    fn test_validation_requires_quote_token_outside_sandbox() {
        let mut config = ApiConfig::default();
        config.quote_api_token = String::new();
        config.sandbox = false;
        assert!(config.validate().is_err());

        config.sandbox = true;
        assert!(config.validate().is_ok());

        config.sandbox = false;
        config.quote_api_token = "pk_test".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_secrets() {
        let mut config = ApiConfig::default();
        config.sandbox = true;
        config.jwt_secret = String::new();
        assert!(config.validate().is_err());

        config.jwt_secret = "secret".to_string();
        config.database_url = String::new();
        assert!(config.validate().is_err());
    }
}
