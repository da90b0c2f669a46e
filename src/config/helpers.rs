//! Small helpers for environment-var-driven configuration resolution.

use std::str::FromStr;

use crate::error::ConfigError;

/// Read an optional environment variable. `Ok(None)` when unset.
///
/// Treats a variable set but containing invalid Unicode as a config error
/// rather than silently dropping it.
pub fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "value is not valid UTF-8".to_string(),
        }),
    }
}

/// Read and parse an optional environment variable, falling back to `default`.
pub fn parse_optional_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key)? {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Read a required environment variable, producing an actionable hint on failure.
pub fn required_env(key: &str, hint: &str) -> Result<String, ConfigError> {
    optional_env(key)?.ok_or_else(|| ConfigError::MissingRequired {
        key: key.to_string(),
        hint: hint.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_optional_env_falls_back_to_default() {
        // SAFETY: test-only env mutation, single-threaded test.
        unsafe {
            std::env::remove_var("CLAWHUB_TEST_MISSING_VAR");
        }
        let value: usize = parse_optional_env("CLAWHUB_TEST_MISSING_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn parse_optional_env_reports_invalid_value() {
        // SAFETY: test-only env mutation, single-threaded test.
        unsafe {
            std::env::set_var("CLAWHUB_TEST_BAD_NUMBER", "not-a-number");
        }
        let result: Result<usize, ConfigError> =
            parse_optional_env("CLAWHUB_TEST_BAD_NUMBER", 1);
        assert!(result.is_err());
        unsafe {
            std::env::remove_var("CLAWHUB_TEST_BAD_NUMBER");
        }
    }

    #[test]
    fn required_env_missing_carries_hint() {
        unsafe {
            std::env::remove_var("CLAWHUB_TEST_REQUIRED");
        }
        let err = required_env("CLAWHUB_TEST_REQUIRED", "set it please").unwrap_err();
        assert!(err.to_string().contains("set it please"));
    }
}
