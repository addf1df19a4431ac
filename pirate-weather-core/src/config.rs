use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    request::ForecastOptions,
    types::{Language, Units},
};

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "PIRATE_WEATHER_API_KEY";

/// User configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// gzip = true
/// units = "si"
/// lang = "en"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,

    #[serde(default = "default_gzip")]
    pub gzip: bool,

    #[serde(default)]
    pub units: Units,

    #[serde(default)]
    pub lang: Language,
}

fn default_gzip() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self { api_key: None, gzip: default_gzip(), units: Units::default(), lang: Language::default() }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = self.to_toml()?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("net", "pirateweather", "pirate-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// API key from the environment, falling back to the stored one.
    pub fn api_key(&self) -> Result<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key(&self, from_env: Option<String>) -> Result<String> {
        from_env
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
            .ok_or_else(|| {
                anyhow!(
                    "No Pirate Weather API key configured.\n\
                     Hint: run `pirate-weather configure` or set {API_KEY_ENV}."
                )
            })
    }

    /// Request options seeded with the stored units and language.
    pub fn forecast_options(&self) -> ForecastOptions {
        ForecastOptions::new().units(self.units).lang(self.lang)
    }
}
