use secrecy::{ExposeSecret, SecretString};

use crate::config::helpers::{optional_env, parse_optional_env};
use crate::error::ConfigError;

/// PostgreSQL SSL/TLS mode, matching libpq semantics for the common cases.
///
/// Default is `Prefer`: attempt TLS, fall back to plaintext. Local Postgres
/// without TLS keeps working while managed providers (Neon, Supabase, RDS)
/// automatically get TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    Disable,
    #[default]
    Prefer,
    Require,
}

impl std::fmt::Display for SslMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disable => write!(f, "disable"),
            Self::Prefer => write!(f, "prefer"),
            Self::Require => write!(f, "require"),
        }
    }
}

impl std::str::FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disable" => Ok(Self::Disable),
            "prefer" => Ok(Self::Prefer),
            "require" => Ok(Self::Require),
            _ => Err(format!(
                "invalid DATABASE_SSLMODE '{}', expected 'disable', 'prefer', or 'require'",
                s
            )),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: SecretString,
    pub pool_size: usize,
    pub ssl_mode: SslMode,
}

impl DatabaseConfig {
    pub fn resolve() -> Result<Self, ConfigError> {
        let url = optional_env("DATABASE_URL")?.ok_or_else(|| ConfigError::MissingRequired {
            key: "DATABASE_URL".to_string(),
            hint: "Set DATABASE_URL to a PostgreSQL connection string".to_string(),
        })?;

        let pool_size = parse_optional_env("DATABASE_POOL_SIZE", 10)?;

        let ssl_mode: SslMode = if let Some(s) = optional_env("DATABASE_SSLMODE")? {
            s.parse().map_err(|e| ConfigError::InvalidValue {
                key: "DATABASE_SSLMODE".to_string(),
                message: e,
            })?
        } else {
            SslMode::default()
        };

        Ok(Self {
            url: SecretString::from(url),
            pool_size,
            ssl_mode,
        })
    }

    pub fn url(&self) -> &str {
        self.url.expose_secret()
    }

    /// Build a config directly from a connection string, bypassing the
    /// environment. Used by integration tests pointed at an ephemeral
    /// `testcontainers` Postgres instance.
    #[cfg(any(test, feature = "integration"))]
    pub fn for_test(url: impl Into<String>, ssl_mode: SslMode) -> Self {
        Self {
            url: SecretString::from(url.into()),
            pool_size: 5,
            ssl_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssl_mode_default_is_prefer() {
        assert_eq!(SslMode::default(), SslMode::Prefer);
    }

    #[test]
    fn ssl_mode_parse_roundtrip() {
        for mode in [SslMode::Disable, SslMode::Prefer, SslMode::Require] {
            let s = mode.to_string();
            let parsed: SslMode = s.parse().expect("should parse");
            assert_eq!(parsed, mode);
        }
    }

    #[test]
    fn ssl_mode_parse_case_insensitive() {
        assert_eq!("DISABLE".parse::<SslMode>().unwrap(), SslMode::Disable);
        assert_eq!("Prefer".parse::<SslMode>().unwrap(), SslMode::Prefer);
    }

    #[test]
    fn ssl_mode_parse_invalid() {
        assert!("invalid".parse::<SslMode>().is_err());
    }
}
