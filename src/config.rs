//! Configuration management for fprettier-lex.
//!
//! The [`Config`] struct controls how physical lines are read and how strictly
//! the dump/check front end treats questionable input. It is loaded from a
//! TOML file (`fprettier-lex.toml`) and overridden by CLI arguments.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Config file name looked up in the current directory when `--config` is absent
pub const CONFIG_FILE_NAME: &str = "fprettier-lex.toml";

fn default_tab_width() -> usize {
    8
}
fn default_max_continuation_lines() -> usize {
    10_000
}

/// Main configuration struct for fprettier-lex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Spaces substituted for each tab character (default: 8)
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,

    /// Physical lines allowed in one logical line before the input is
    /// rejected (default: 10000)
    #[serde(default = "default_max_continuation_lines")]
    pub max_continuation_lines: usize,

    /// Treat a continuation left open at end of file, or a failed
    /// round-trip, as an error (default: false)
    #[serde(default)]
    pub strict: bool,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    pub tab_width: Option<usize>,
    pub max_continuation_lines: Option<usize>,
    pub strict: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tab_width: default_tab_width(),
            max_continuation_lines: default_max_continuation_lines(),
            strict: false,
        }
    }
}

impl Config {
    /// Maximum reasonable tab width
    const MAX_TAB_WIDTH: usize = 16;

    /// Validate configuration values are within reasonable bounds
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.tab_width == 0 {
            return Some("tab_width must be at least 1".to_string());
        }
        if self.tab_width > Self::MAX_TAB_WIDTH {
            return Some(format!(
                "tab_width {} exceeds maximum of {}",
                self.tab_width,
                Self::MAX_TAB_WIDTH
            ));
        }
        if self.max_continuation_lines == 0 {
            return Some("max_continuation_lines must be at least 1".to_string());
        }
        None
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text, defaults for missing keys
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let partial: PartialConfig = toml::from_str(contents)?;
        let mut config = Self::default();
        config.apply_partial(&partial);
        Ok(config)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: &PartialConfig) {
        if let Some(v) = partial.tab_width {
            self.tab_width = v;
        }
        if let Some(v) = partial.max_continuation_lines {
            self.max_continuation_lines = v;
        }
        if let Some(v) = partial.strict {
            self.strict = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tab_width, 8);
        assert_eq!(config.max_continuation_lines, 10_000);
        assert!(!config.strict);
        assert!(config.validate().is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("tab_width = 4\n").unwrap();
        assert_eq!(config.tab_width, 4);
        assert_eq!(config.max_continuation_lines, 10_000);
        assert!(!config.strict);
    }

    #[test]
    fn test_full_toml() {
        let config =
            Config::from_toml_str("tab_width = 2\nmax_continuation_lines = 255\nstrict = true\n")
                .unwrap();
        assert_eq!(
            config,
            Config {
                tab_width: 2,
                max_continuation_lines: 255,
                strict: true,
            }
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_toml_str("indent = 3\n").is_err());
    }

    #[test]
    fn test_validate_bounds() {
        let mut config = Config {
            tab_width: 0,
            ..Config::default()
        };
        assert!(config.validate().is_some());
        config.tab_width = 17;
        assert!(config.validate().unwrap().contains("exceeds maximum"));
        config.tab_width = 8;
        config.max_continuation_lines = 0;
        assert!(config.validate().is_some());
    }

    #[test]
    fn test_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "fprettier-lex-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "strict = true\n").unwrap();
        let config = Config::from_toml_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(config.strict);
        assert_eq!(config.tab_width, 8);
    }
}
