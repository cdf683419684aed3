//! Configuration from docnav.toml

use crate::code::HighlightOptions;
use crate::tracker::TrackerOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in a document directory
pub const CONFIG_FILE_NAME: &str = "docnav.toml";

/// Settings shared by every command
///
/// All tables and keys are optional:
///
/// ```toml
/// [highlight]
/// ignore_missing_grammar = true
/// class_prefix = ""
///
/// [tracker]
/// offset = 0.0
/// scroll_bias = "ceil"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Code highlighting
    pub highlight: HighlightOptions,

    /// Active-section tracking
    pub tracker: TrackerOptions,
}

impl Config {
    /// Load configuration from a docnav.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded configuration
    /// * `Err(ConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(ConfigError::IoError)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::ParseError)
    }

    /// Load `docnav.toml` from `dir`, or the defaults when the file is absent
    pub fn load_or_default<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if !path.is_file() {
            log::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.as_ref().display());
            return Ok(Self::default());
        }

        log::info!("Loading config from {}", path.display());
        Self::load(path)
    }
}

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
    /// IO error when reading the file
    #[error("IO error: {0}")]
    IoError(#[source] std::io::Error),

    /// Error parsing TOML
    #[error("TOML parse error: {0}")]
    ParseError(#[source] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::ScrollBias;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();

        assert_eq!(config, Config::default());
        assert!(config.highlight.ignore_missing_grammar);
        assert_eq!(config.tracker.scroll_bias, ScrollBias::Ceil);
        assert_eq!(config.tracker.offset, 0.0);
    }

    #[test]
    fn test_full_config() {
        let toml_str = r#"
[highlight]
ignore_missing_grammar = false
class_prefix = "hl-"

[tracker]
offset = 64.0
scroll_bias = "exact"
"#;

        let config = Config::from_toml(toml_str).unwrap();

        assert!(!config.highlight.ignore_missing_grammar);
        assert_eq!(config.highlight.class_prefix, "hl-");
        assert_eq!(config.tracker.offset, 64.0);
        assert_eq!(config.tracker.scroll_bias, ScrollBias::Exact);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = Config::from_toml("[tracker]\nscroll_bias = \"sideways\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().starts_with("TOML parse error"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/docnav.toml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
        assert!(err.to_string().starts_with("IO error"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_or_default(dir.path()).unwrap(), Config::default());

        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[tracker]\noffset = 12.5\n",
        )
        .unwrap();
        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config.tracker.offset, 12.5);
    }
}
