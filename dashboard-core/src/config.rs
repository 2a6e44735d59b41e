use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{error::WeatherError, gateway::Endpoint};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_PREVIEW_TTL_SECS: u64 = 30;
pub const API_KEY_ENV: &str = "OPENWEATHER_KEY";

/// How the dashboard reaches the weather API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    /// Call OpenWeather directly with a client-side API key.
    #[default]
    Direct,
    /// Call a pass-through proxy that holds the key.
    Proxy,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// mode = "proxy"
/// proxy_url = "http://127.0.0.1:8888/"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: GatewayMode,
    pub api_key: Option<String>,
    pub base_url: String,
    pub proxy_url: Option<String>,
    /// How long a favorites hover preview is reused before refetching.
    pub preview_ttl_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: GatewayMode::Direct,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy_url: None,
            preview_ttl_secs: DEFAULT_PREVIEW_TTL_SECS,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "weather-dash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn preview_ttl(&self) -> Duration {
        Duration::from_secs(self.preview_ttl_secs)
    }

    /// API key from `OPENWEATHER_KEY`, falling back to the configured one.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key_with_override(std::env::var(API_KEY_ENV).ok())
    }

    /// Build the gateway endpoint described by this config.
    pub fn endpoint(&self) -> Result<Endpoint, WeatherError> {
        self.endpoint_with_key(self.resolved_api_key())
    }

    fn api_key_with_override(&self, env_key: Option<String>) -> Option<String> {
        env_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
            .filter(|key| !key.trim().is_empty())
    }

    fn endpoint_with_key(&self, api_key: Option<String>) -> Result<Endpoint, WeatherError> {
        match self.mode {
            GatewayMode::Direct => {
                let api_key = api_key.ok_or_else(|| {
                    WeatherError::Config(format!(
                        "No OpenWeather API key configured.\n\
                         Hint: run `weather-dash configure --api-key <KEY>` or set {API_KEY_ENV}."
                    ))
                })?;
                Ok(Endpoint::Direct { api_key, base_url: self.base_url.clone() })
            }
            GatewayMode::Proxy => {
                let url = self.proxy_url.clone().ok_or_else(|| {
                    WeatherError::Config(
                        "Proxy mode selected but no proxy_url configured.\n\
                         Hint: run `weather-dash configure --mode proxy --proxy-url <URL>`."
                            .to_string(),
                    )
                })?;
                Ok(Endpoint::Proxy { url })
            }
        }
    }
}
