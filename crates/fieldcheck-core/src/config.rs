use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::directive::Separator;
use crate::error::ConfigError;

/// Validator settings, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Top-level directive separator.
    pub separator: Separator,
    /// Default for presence-aware skipping of unset fields.
    pub track_presence: bool,
    /// Default for direct-field-only validation.
    pub shallow: bool,
    /// Optional recursion guard for deeply nested values.
    pub max_depth: Option<usize>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            separator: Separator::Comma,
            track_presence: false,
            shallow: false,
            max_depth: None,
        }
    }
}

impl ValidatorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = ValidatorConfig::from_toml_str("shallow = true\n").expect("parses");
        assert!(config.shallow);
        assert_eq!(config.separator, Separator::Comma);
        assert_eq!(config.max_depth, None);
    }

    #[test]
    fn parses_every_key() {
        let config = ValidatorConfig::from_toml_str(
            "separator = \"pipe\"\ntrack_presence = true\nshallow = false\nmax_depth = 16\n",
        )
        .expect("parses");
        assert_eq!(config.separator, Separator::Pipe);
        assert!(config.track_presence);
        assert_eq!(config.max_depth, Some(16));
    }

    #[test]
    fn unknown_separator_is_rejected() {
        let err = ValidatorConfig::from_toml_str("separator = \"semicolon\"\n").expect_err("invalid");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn encodes_and_reloads() {
        let config = ValidatorConfig {
            separator: Separator::Pipe,
            max_depth: Some(4),
            ..ValidatorConfig::default()
        };
        let encoded = config.to_toml_string().expect("encodes");
        assert_eq!(ValidatorConfig::from_toml_str(&encoded).expect("parses"), config);
    }
}
