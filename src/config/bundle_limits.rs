//! Resource limits for the Bundle Extractor (§4.2).

use crate::config::helpers::parse_optional_env;
use crate::error::ConfigError;

const DEFAULT_MAX_COMPRESSED: u64 = 50 * 1024 * 1024;
const DEFAULT_MAX_DECOMPRESSED: u64 = 200 * 1024 * 1024;

/// Size limits enforced before and during tar extraction.
#[derive(Debug, Clone, Copy)]
pub struct BundleLimits {
    /// Maximum size of the raw upload, enforced at the HTTP layer.
    pub max_compressed: u64,
    /// Maximum cumulative size of extracted file contents.
    pub max_decompressed: u64,
}

impl BundleLimits {
    pub fn resolve() -> Result<Self, ConfigError> {
        Ok(Self {
            max_compressed: parse_optional_env("MAX_BUNDLE_SIZE", DEFAULT_MAX_COMPRESSED)?,
            max_decompressed: parse_optional_env(
                "MAX_DECOMPRESSED_SIZE",
                DEFAULT_MAX_DECOMPRESSED,
            )?,
        })
    }
}

impl Default for BundleLimits {
    fn default() -> Self {
        Self {
            max_compressed: DEFAULT_MAX_COMPRESSED,
            max_decompressed: DEFAULT_MAX_DECOMPRESSED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        unsafe {
            std::env::remove_var("MAX_BUNDLE_SIZE");
            std::env::remove_var("MAX_DECOMPRESSED_SIZE");
        }
        let limits = BundleLimits::resolve().unwrap();
        assert_eq!(limits.max_compressed, 52_428_800);
        assert_eq!(limits.max_decompressed, 209_715_200);
    }
}
