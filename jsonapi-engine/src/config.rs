//! Configuration management using Figment
//!
//! Configuration is loaded from the following sources, highest precedence first:
//! 1. Environment variables (prefix: `JSONAPI_`, nested keys separated by `__`)
//! 2. A TOML file (`./jsonapi.toml` for [`Config::load`], or an explicit path)
//! 3. Default values
//!
//! Nothing here is process-global: callers hold a [`Config`] and pass the
//! relevant section (`&PaginationConfig`, `&MediaTypeConfig`) to the code that
//! needs it.
//!
//! # Example
//!
//! ```rust
//! use jsonapi_engine::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.pagination.default_page_size, 10);
//! assert_eq!(config.pagination.maximum_page_size, 20);
//! assert_eq!(config.media_type.media_type, "application/vnd.api+json");
//! ```

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::media_type::JSON_API_MEDIA_TYPE;

/// Default configuration file looked up by [`Config::load`]
pub const DEFAULT_CONFIG_FILE: &str = "jsonapi.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Service identity and logging
    #[serde(default)]
    pub service: ServiceConfig,

    /// Page window bounds
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Content negotiation
    #[serde(default)]
    pub media_type: MediaTypeConfig,
}

/// Service identity and logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name, reported when tracing starts
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Log filter directive (`info`, `jsonapi_engine=debug`, ...)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Base URL prepended to every generated link
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Page window bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when `page[size]` is absent or unparseable
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,

    /// Largest accepted `page[size]`
    #[serde(default = "default_maximum_page_size")]
    pub maximum_page_size: i64,

    /// Page size used when embedding to-many linkage in a resource object
    #[serde(default = "default_linkage_page_size")]
    pub linkage_page_size: i64,
}

/// Content negotiation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTypeConfig {
    /// Required `Content-Type` for writes and required `Accept` entry for all requests
    #[serde(default = "default_media_type")]
    pub media_type: String,
}

fn default_service_name() -> String {
    "jsonapi-engine".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_page_size() -> i64 {
    10
}

fn default_maximum_page_size() -> i64 {
    20
}

fn default_linkage_page_size() -> i64 {
    50
}

fn default_media_type() -> String {
    JSON_API_MEDIA_TYPE.to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            base_url: default_base_url(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            maximum_page_size: default_maximum_page_size(),
            linkage_page_size: default_linkage_page_size(),
        }
    }
}

impl Default for MediaTypeConfig {
    fn default() -> Self {
        Self {
            media_type: default_media_type(),
        }
    }
}

impl PaginationConfig {
    /// Check that the bounds describe at least one valid page size
    ///
    /// # Example
    ///
    /// ```rust
    /// use jsonapi_engine::config::PaginationConfig;
    ///
    /// let config = PaginationConfig {
    ///     default_page_size: 30,
    ///     maximum_page_size: 20,
    ///     linkage_page_size: 50,
    /// };
    /// assert!(config.validate().is_err());
    /// assert!(PaginationConfig::default().validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.default_page_size < 1 {
            return Err(Error::InvalidConfig(
                "pagination.default_page_size must be at least 1".to_string(),
            ));
        }
        if self.maximum_page_size < 1 {
            return Err(Error::InvalidConfig(
                "pagination.maximum_page_size must be at least 1".to_string(),
            ));
        }
        if self.default_page_size > self.maximum_page_size {
            return Err(Error::InvalidConfig(format!(
                "pagination.default_page_size ({}) exceeds pagination.maximum_page_size ({})",
                self.default_page_size, self.maximum_page_size
            )));
        }
        if self.linkage_page_size < 1 {
            return Err(Error::InvalidConfig(
                "pagination.linkage_page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from `./jsonapi.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file is not an error; defaults and environment variables
    /// still apply. The result is validated before it is returned.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
        } else {
            tracing::debug!("No configuration file at {}, using defaults", path.display());
        }

        let config: Config = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("JSONAPI_").split("__"))
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.pagination.validate()?;
        if self.media_type.media_type.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "media_type.media_type must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.service.base_url, "http://localhost:8080");
        assert_eq!(config.pagination.default_page_size, 10);
        assert_eq!(config.pagination.maximum_page_size, 20);
        assert_eq!(config.pagination.linkage_page_size, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.pagination, PaginationConfig::default());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "articles"
base_url = "https://api.example.com"

[pagination]
default_page_size = 5
maximum_page_size = 100
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.service.name, "articles");
        assert_eq!(config.service.base_url, "https://api.example.com");
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.pagination.default_page_size, 5);
        assert_eq!(config.pagination.maximum_page_size, 100);
        assert_eq!(config.pagination.linkage_page_size, 50);
    }

    #[test]
    fn test_load_from_rejects_inconsistent_bounds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[pagination]\ndefault_page_size = 50\nmaximum_page_size = 20"
        )
        .unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_load_from_malformed_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pagination]\ndefault_page_size = \"ten\"").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_pagination_validate_rejects_zero() {
        let config = PaginationConfig {
            maximum_page_size: 0,
            ..PaginationConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PaginationConfig {
            linkage_page_size: 0,
            ..PaginationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_media_type_is_invalid() {
        let mut config = Config::default();
        config.media_type.media_type = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
