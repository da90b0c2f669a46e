//! Object storage configuration (S3-compatible, MinIO-friendly).

use secrecy::{ExposeSecret, SecretString};

use crate::config::helpers::{optional_env, required_env};
use crate::error::ConfigError;

/// Connection details for the S3-compatible object store backing the
/// Storage Adapter (§4.5 of the registry's put/get blob interface).
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: SecretString,
    pub bucket: String,
    pub region: String,
}

impl StorageConfig {
    pub fn resolve() -> Result<Self, ConfigError> {
        let endpoint = required_env(
            "S3_ENDPOINT",
            "Set S3_ENDPOINT to the object store's HTTP(S) endpoint",
        )?;
        let access_key = required_env("S3_ACCESS_KEY", "Set S3_ACCESS_KEY")?;
        let secret_key = required_env("S3_SECRET_KEY", "Set S3_SECRET_KEY")?;
        let bucket = required_env("S3_BUCKET", "Set S3_BUCKET to the bundle storage bucket")?;
        let region = optional_env("S3_REGION")?.unwrap_or_else(|| "us-east-1".to_string());

        Ok(Self {
            endpoint,
            access_key,
            secret_key: SecretString::from(secret_key),
            bucket,
            region,
        })
    }

    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_reports_missing_required_key() {
        for key in ["S3_ENDPOINT", "S3_ACCESS_KEY", "S3_SECRET_KEY", "S3_BUCKET"] {
            unsafe {
                std::env::remove_var(key);
            }
        }
        let err = StorageConfig::resolve().unwrap_err();
        assert!(err.to_string().contains("S3_ENDPOINT"));
    }
}
