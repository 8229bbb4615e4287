//! User-level settings
//!
//! Settings are stored in TOML format at `<config dir>/knightos/config.toml`
//! (for example `~/.config/knightos/config.toml` on Linux). They are kept out
//! of the home directory itself so that the upward project-root walk never
//! mistakes them for a project's `.knightos` directory.
//!
//! # Examples
//!
//! ```no_run
//! use knightos::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! println!("Registry URL: {}", config.registry.url);
//! println!("kpack: {}", config.tools.kpack);
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default package registry
pub const DEFAULT_REGISTRY_URL: &str = "https://packages.knightos.org";

/// User configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// External tools
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Generated manifest settings
    #[serde(default)]
    pub manifest: ManifestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the package registry
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Request timeout in seconds (0 = wait forever)
    #[serde(default)]
    pub timeout_seconds: u64,
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            timeout_seconds: 0,
        }
    }
}

impl RegistryConfig {
    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path or name of the kpack executable used for extraction
    #[serde(default = "default_kpack")]
    pub kpack: String,
}

fn default_kpack() -> String {
    "kpack".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            kpack: default_kpack(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Alternate `packages.make` template. `~` and environment variables are expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl ManifestConfig {
    /// Expanded path of the template override, if any
    pub fn template_path(&self) -> Option<PathBuf> {
        self.template.as_deref().map(|t| {
            let expanded = shellexpand::full(t)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| t.to_string());
            PathBuf::from(expanded)
        })
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// Uses KNIGHTOS_CONFIG_DIR if set, otherwise the platform config directory
    pub fn default_path() -> Result<PathBuf> {
        // Check for custom config directory (useful for testing)
        if let Ok(config_dir) = std::env::var("KNIGHTOS_CONFIG_DIR") {
            return Ok(PathBuf::from(config_dir).join("config.toml"));
        }

        let base = dirs::config_dir()
            .ok_or_else(|| Error::Other("Could not find configuration directory".to_string()))?;

        Ok(base.join("knightos").join("config.toml"))
    }

    /// Load config from file, or use defaults if it doesn't exist
    ///
    /// Environment variable overrides:
    /// - `KNIGHTOS_REGISTRY`: Overrides `registry.url`
    /// - `KNIGHTOS_CONFIG_DIR`: Overrides the config directory location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;

        let mut config = if !path.exists() {
            Self::default()
        } else {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        };

        if let Ok(url) = std::env::var("KNIGHTOS_REGISTRY") {
            if !url.is_empty() {
                config.registry.url = url;
            }
        }

        Ok(config)
    }
}
