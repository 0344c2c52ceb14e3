//! Identity codec configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::identity::{IdentityCodec, CURRENT_FORMAT_VERSION, DEFAULT_APP_TAG};

/// Format versions this build can write.
const SUPPORTED_FORMAT_VERSIONS: &[&str] = &["1.0"];

/// Identity codec configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Tag of the issuing application; envelopes with another tag are refused
    #[serde(default = "default_app_tag")]
    pub app_tag: String,

    /// Envelope format version written on encode
    #[serde(default = "default_format_version")]
    pub format_version: String,
}

impl IdentityConfig {
    /// Build the codec this configuration describes
    pub fn codec(&self) -> IdentityCodec {
        IdentityCodec::new(self.app_tag.clone()).with_format_version(self.format_version.clone())
    }

    /// Validate identity configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.app_tag.is_empty() {
            return Err(ValidationError::MissingRequired("identity.app_tag"));
        }
        if self.app_tag.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidAppTag);
        }
        if !SUPPORTED_FORMAT_VERSIONS.contains(&self.format_version.as_str()) {
            return Err(ValidationError::UnsupportedFormatVersion(
                self.format_version.clone(),
            ));
        }
        Ok(())
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            app_tag: default_app_tag(),
            format_version: default_format_version(),
        }
    }
}

fn default_app_tag() -> String {
    DEFAULT_APP_TAG.to_string()
}

fn default_format_version() -> String {
    CURRENT_FORMAT_VERSION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_config_defaults() {
        let config = IdentityConfig::default();
        assert_eq!(config.app_tag, "TrazaPack");
        assert_eq!(config.format_version, "1.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_codec_uses_configured_tag() {
        let config = IdentityConfig {
            app_tag: "PackingSur".to_string(),
            ..Default::default()
        };
        assert_eq!(config.codec().app_tag(), "PackingSur");
    }

    #[test]
    fn test_empty_app_tag_rejected() {
        let config = IdentityConfig {
            app_tag: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_whitespace_app_tag_rejected() {
        let config = IdentityConfig {
            app_tag: "Traza Pack".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidAppTag)));
    }

    #[test]
    fn test_unknown_format_version_rejected() {
        let config = IdentityConfig {
            format_version: "2.0".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::UnsupportedFormatVersion(_))
        ));
    }
}
