//! Kernel configuration.
//!
//! ## Configuration
//!
//! All settings can be configured via environment variables:
//! - `KERNEL_ID_BLOCK_SIZE`: IDs reserved per counter increment (default: 1000)
//! - `KERNEL_PUBLISHED_MAX_LEVEL`: Depth of archived bundles (default: 10)
//! - `KERNEL_DOI_ENABLED`: Register DOIs on request (default: false)
//! - `KERNEL_DOI_FAILURE_FATAL`: Abort publishing if registration fails (default: false)
//! - `KERNEL_PUBLISH_BASE_URI`: Landing page prefix for DOI metadata
//! - `KERNEL_PUBLISHED_CACHE_CAPACITY`: Cached published bundles (default: 256)

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::ids::DEFAULT_BLOCK_SIZE;
use crate::policy::BundleConfiguration;

/// Error type for invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A setting is out of range.
    #[error("Invalid setting {name}: {reason}")]
    Invalid {
        /// Setting name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// DOI registration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoiSettings {
    /// Whether publish requests may register DOIs.
    pub enabled: bool,
    /// Whether a registrar failure aborts the publish.
    pub failure_is_fatal: bool,
    /// Landing page prefix; the version ID is appended.
    pub publish_base_uri: String,
}

impl Default for DoiSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            failure_is_fatal: false,
            publish_base_uri: "https://example.org/literature-lists/".to_string(),
        }
    }
}

/// Configuration of the content kernel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// IDs reserved per remote counter increment.
    pub id_block_size: u64,
    /// Traversal used when archiving published versions.
    pub published_bundle: BundleConfiguration,
    /// DOI registration settings.
    pub doi: DoiSettings,
    /// Capacity of the published bundle cache.
    pub published_cache_capacity: usize,
}

impl KernelConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_level = env_parse("KERNEL_PUBLISHED_MAX_LEVEL")
            .or(defaults.published_bundle.max_level);
        Self {
            id_block_size: env_parse("KERNEL_ID_BLOCK_SIZE").unwrap_or(defaults.id_block_size),
            published_bundle: BundleConfiguration {
                max_level,
                ..defaults.published_bundle
            },
            doi: DoiSettings {
                enabled: env_parse("KERNEL_DOI_ENABLED").unwrap_or(defaults.doi.enabled),
                failure_is_fatal: env_parse("KERNEL_DOI_FAILURE_FATAL")
                    .unwrap_or(defaults.doi.failure_is_fatal),
                publish_base_uri: std::env::var("KERNEL_PUBLISH_BASE_URI")
                    .unwrap_or(defaults.doi.publish_base_uri),
            },
            published_cache_capacity: env_parse("KERNEL_PUBLISHED_CACHE_CAPACITY")
                .unwrap_or(defaults.published_cache_capacity),
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id_block_size == 0 {
            return Err(ConfigError::Invalid {
                name: "id_block_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.published_bundle.max_level == Some(0) {
            return Err(ConfigError::Invalid {
                name: "published_bundle.max_level",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.published_cache_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: "published_cache_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Cache capacity as required by the LRU cache. Zero is treated as one.
    pub fn cache_capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.published_cache_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            id_block_size: DEFAULT_BLOCK_SIZE,
            published_bundle: BundleConfiguration::published(),
            doi: DoiSettings::default(),
            published_cache_capacity: 256,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = KernelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.id_block_size, 1000);
        assert_eq!(config.published_bundle.max_level, Some(10));
        assert!(!config.doi.failure_is_fatal);
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = KernelConfig {
            id_block_size: 0,
            ..KernelConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { name: "id_block_size", .. })
        ));
    }

    #[test]
    fn test_serde_round_trip() {
        let config = KernelConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: KernelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
