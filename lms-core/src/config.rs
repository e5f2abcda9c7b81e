//! Configuration management

use crate::error::{ErrorContext, LmsError, LmsResult};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `api.base_url`
pub const API_URL_ENV: &str = "LMS_API_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LmsConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root of the LMS REST API, without the `/api` prefix
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_seconds: 30,
            user_agent: format!("lms-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Key-value storage file; defaults to `<data_dir>/lms/storage.json`
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("lms")
                .join("storage.json")
        })
    }
}

impl LmsConfig {
    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lms")
            .join("config.toml")
    }

    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> LmsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LmsError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: LmsConfig = toml::from_str(&content).map_err(|e| LmsError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Load from `path`, or the default location; a missing default file
    /// yields the defaults. Applies environment overrides and validates.
    pub fn load(path: Option<&Path>) -> LmsResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(base_url) = std::env::var(API_URL_ENV) {
            if !base_url.is_empty() {
                config.api.base_url = base_url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> LmsResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| LmsError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| LmsError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> LmsResult<()> {
        let parsed = url::Url::parse(&self.api.base_url).map_err(|e| LmsError::Config {
            message: format!("Invalid api.base_url '{}': {}", self.api.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Use an absolute URL such as http://localhost:3000"),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LmsError::Config {
                message: format!("Unsupported URL scheme: {}", parsed.scheme()),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.base_url to an http or https URL"),
            });
        }

        if self.api.timeout_seconds == 0 {
            return Err(LmsError::Config {
                message: "api.timeout_seconds must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.timeout_seconds to a positive value"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LmsConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = LmsConfig::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "https://lms.example.com".to_string();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = LmsConfig::default();
        config.api.base_url = "https://lms.example.com".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = LmsConfig::from_file(&path).unwrap();
        assert_eq!(loaded.api.base_url, "https://lms.example.com");

        let partial = dir.path().join("partial.toml");
        std::fs::write(&partial, "[api]\ntimeout_seconds = 5\n").unwrap();
        let loaded = LmsConfig::from_file(&partial).unwrap();
        assert_eq!(loaded.api.timeout_seconds, 5);
        assert_eq!(loaded.api.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\n").unwrap();
        assert!(matches!(
            LmsConfig::from_file(&path),
            Err(LmsError::Config { .. })
        ));
    }
}
