//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TRAZA` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use traza::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! let codec = config.identity.codec();
//! ```

mod error;
mod identity;
mod lineage;
mod logging;

pub use error::{ConfigError, ValidationError};
pub use identity::IdentityConfig;
pub use lineage::LineageConfig;
pub use logging::LoggingConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// configuration. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Identity codec configuration (app tag, format version)
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Logging configuration (filter, output format)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Lineage resolution settings
    #[serde(default)]
    pub lineage: LineageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TRAZA` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TRAZA__IDENTITY__APP_TAG=PackingSur` -> `identity.app_tag = PackingSur`
    /// - `TRAZA__LOGGING__JSON=true` -> `logging.json = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TRAZA")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.identity.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("TRAZA__IDENTITY__APP_TAG");
        env::remove_var("TRAZA__IDENTITY__FORMAT_VERSION");
        env::remove_var("TRAZA__LOGGING__LEVEL");
        env::remove_var("TRAZA__LOGGING__JSON");
        env::remove_var("TRAZA__LINEAGE__WARN_ON_BOX_MISMATCH");
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.identity.app_tag, "TrazaPack");
        assert!(config.lineage.warn_on_box_mismatch);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TRAZA__IDENTITY__APP_TAG", "PackingSur");
        env::set_var("TRAZA__LOGGING__JSON", "true");
        env::set_var("TRAZA__LINEAGE__WARN_ON_BOX_MISMATCH", "false");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.identity.app_tag, "PackingSur");
        assert_eq!(config.identity.format_version, "1.0");
        assert!(config.logging.json);
        assert!(!config.lineage.warn_on_box_mismatch);
    }

    #[test]
    fn test_validate_rejects_bad_format_version() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TRAZA__IDENTITY__FORMAT_VERSION", "9.9");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::UnsupportedFormatVersion(_))
        ));
    }
}
