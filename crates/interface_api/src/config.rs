//! API configuration
//!
//! Environment-driven configuration for the claims API. Every knob has a
//! development default, so a bare `claims-api` starts against a local
//! database; production deployments override via `API_*` variables.

use serde::Deserialize;

/// Claims API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server bind host
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Secret used to verify bearer tokens (set in production)
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Lifetime of tokens minted against this secret, in seconds
    #[serde(default = "default_jwt_expiration_secs")]
    pub jwt_expiration_secs: u64,
    /// PostgreSQL connection string for the claims schema
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Log level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_jwt_expiration_secs() -> u64 {
    3600
}

fn default_database_url() -> String {
    "postgres://localhost/claims".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            jwt_secret: default_jwt_secret(),
            jwt_expiration_secs: default_jwt_expiration_secs(),
            database_url: default_database_url(),
            log_level: default_log_level(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables; unset
    /// variables keep their defaults. A bare `DATABASE_URL` (the
    /// convention sqlx tooling expects) also wins over the default.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let mut cfg: ApiConfig = config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            cfg.database_url = url;
        }
        Ok(cfg)
    }

    /// Returns the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_local_claims_database() {
        let config = ApiConfig::default();
        assert_eq!(config.database_url, "postgres://localhost/claims");
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.jwt_expiration_secs, 3600);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: ApiConfig = serde_json::from_str(r#"{ "port": 9090 }"#).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.log_level, "info");
    }
}
