//! Configuration loading
//!
//! Configuration is read from `$XDG_CONFIG_HOME/tf-profile/config.toml`
//! (`~/.config/tf-profile/config.toml` when unset). Every key is optional;
//! command-line flags take precedence over the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default ordering of the resource table
pub const DEFAULT_SORT: &str = "tot_time=desc,resource=asc";

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub table: TableConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct TableConfig {
    /// Sort specification, e.g. `tot_time=desc,n=asc`
    #[serde(default = "default_sort")]
    pub sort: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            sort: default_sort(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Color tables when stdout is a terminal
    #[serde(default = "default_true")]
    pub color: bool,

    /// Echo the input log while parsing
    #[serde(default)]
    pub tee: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            tee: false,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Filter directive for diagnostics on stderr; `RUST_LOG` overrides it
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_sort() -> String {
    DEFAULT_SORT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Default config file location
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("tf-profile").join("config.toml")
    }

    /// Load from an explicit path, or from the default location
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.table.sort, DEFAULT_SORT);
        assert!(config.output.color);
        assert!(!config.output.tee);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_overrides() {
        let config = Config::from_toml(
            r#"
            [table]
            sort = "n=desc"

            [output]
            tee = true
            "#,
        )
        .unwrap();
        assert_eq!(config.table.sort, "n=desc");
        assert!(config.output.tee);
        assert!(config.output.color);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml("[output]\ncolor = \"maybe\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_config_path_file_name() {
        assert!(Config::config_path().ends_with("tf-profile/config.toml"));
    }
}
