//! Environment-driven configuration for the registry.

mod bundle_limits;
mod database;
mod helpers;
mod storage;

use std::net::SocketAddr;

pub use bundle_limits::BundleLimits;
pub use database::{DatabaseConfig, SslMode};
pub use helpers::{optional_env, parse_optional_env, required_env};
pub use storage::StorageConfig;

use crate::error::ConfigError;

/// Top-level configuration, resolved once at process start.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub bundle_limits: BundleLimits,
    pub api_prefix: String,
    pub cors_origins: Vec<String>,
    pub bind_addr: SocketAddr,
}

impl RegistryConfig {
    /// Load configuration from the environment, loading a `.env` file first
    /// if one is present (non-fatal if it is not).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_prefix = optional_env("API_PREFIX")?.unwrap_or_else(|| "/v1".to_string());

        let cors_origins = optional_env("CORS_ORIGINS")?
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let bind_addr: SocketAddr = match optional_env("BIND_ADDR")? {
            Some(raw) => raw.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidValue {
                    key: "BIND_ADDR".to_string(),
                    message: e.to_string(),
                }
            })?,
            None => ([0, 0, 0, 0], 8080).into(),
        };

        Ok(Self {
            database: DatabaseConfig::resolve()?,
            storage: StorageConfig::resolve()?,
            bundle_limits: BundleLimits::resolve()?,
            api_prefix,
            cors_origins,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_prefix_defaults_to_v1() {
        unsafe {
            std::env::remove_var("API_PREFIX");
        }
        let value = optional_env("API_PREFIX").unwrap().unwrap_or_else(|| "/v1".to_string());
        assert_eq!(value, "/v1");
    }

    #[test]
    fn cors_origins_splits_and_trims() {
        unsafe {
            std::env::set_var("CLAWHUB_TEST_CORS", "https://a.test, https://b.test ,");
        }
        let raw = optional_env("CLAWHUB_TEST_CORS").unwrap().unwrap();
        let origins: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        assert_eq!(origins, vec!["https://a.test", "https://b.test"]);
        unsafe {
            std::env::remove_var("CLAWHUB_TEST_CORS");
        }
    }
}
