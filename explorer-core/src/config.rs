//! src/config.rs
//! ============================================================================
//! # Config: Explorer Configuration Loader and Saver
//!
//! Loads and saves settings as TOML from the proper cross-platform config path
//! using the [`directories`](https://docs.rs/directories) crate.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use tokio::fs as TokioFs;

use crate::logging::LoggerConfig;

/// Process-wide color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,

    Dark,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// Display mode of the content panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    #[default]
    List,

    Preview,
}

impl std::fmt::Display for ViewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Preview => write!(f, "preview"),
        }
    }
}

/// Order in which a fork's children are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChildOrdering {
    /// Directories before files, each group by case-insensitive name
    #[default]
    DirsFirst,

    /// Case-insensitive name only
    Lexical,
}

/// Directory enumeration settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScanConfig {
    pub show_hidden: bool,

    pub ordering: ChildOrdering,
}

/// Main configuration struct for the explorer core.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,

    pub view_type: ViewType,

    pub scan: ScanConfig,

    pub logging: LoggerConfig,
}

impl Config {
    /// Loads config from TOML file at the XDG-compliant app config dir, or returns defaults.
    ///
    /// The config is expected at `$XDG_CONFIG_HOME/Explorer/config.toml`
    /// (Linux), or equivalent on Windows/macOS.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(&path).await?;

            Self::from_toml(&text)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save().await?;

            Ok(default_config)
        }
    }

    /// Parse a config document; absent sections fall back to defaults.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Saves config to TOML file at the XDG-compliant app config dir.
    pub async fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;

        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(&path, toml_str).await?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "defaulty", "Explorer")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_uses_defaults() {
        let cfg = Config::from_toml("theme = \"dark\"\n[scan]\nshow_hidden = true\n").unwrap();

        assert_eq!(cfg.theme, Theme::Dark);
        assert_eq!(cfg.view_type, ViewType::List);
        assert!(cfg.scan.show_hidden);
        assert_eq!(cfg.scan.ordering, ChildOrdering::DirsFirst);
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let cfg = Config::from_toml(&text).unwrap();

        assert_eq!(cfg.theme, Theme::Light);
        assert_eq!(cfg.scan.ordering, ChildOrdering::DirsFirst);
    }

    #[test]
    fn test_unknown_theme_is_rejected() {
        assert!(Config::from_toml("theme = \"solarized\"").is_err());
    }
}
