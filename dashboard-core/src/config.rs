use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_CITY: &str = "Accra";

/// Environment variable overriding the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
/// Environment variable overriding the provider base URL.
pub const BASE_URL_ENV: &str = "OPENWEATHER_BASE";

/// Top-level configuration stored on disk, with environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key. A missing key does not block startup; requests
    /// fail at call time instead.
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// City shown when the dashboard starts.
    #[serde(default = "default_city")]
    pub default_city: String,

    /// Optional fixed device position, used for "current location".
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_city: default_city(),
            latitude: None,
            longitude: None,
        }
    }
}

impl Config {
    /// Load config from disk (empty default if the file doesn't exist yet),
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(key) = env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            cfg.api_key = Some(key);
        }
        if let Ok(base) = env::var(BASE_URL_ENV)
            && !base.is_empty()
        {
            cfg.base_url = base;
        }

        if cfg.api_key.is_none() {
            tracing::warn!(
                "no OpenWeather API key configured; run `weather-dash configure` or set {API_KEY_ENV}"
            );
        }

        Ok(cfg)
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

    /// Fixed device position, if both coordinates are configured.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_openweather_and_accra() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.default_city, "Accra");
        assert!(cfg.api_key.is_none());
        assert!(cfg.position().is_none());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = Config::from_toml("api_key = \"KEY\"").expect("parse");
        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.default_city, "Accra");
    }

    #[test]
    fn position_requires_both_coordinates() {
        let cfg = Config::from_toml("latitude = 5.56").expect("parse");
        assert!(cfg.position().is_none());

        let cfg = Config::from_toml("latitude = 5.56\nlongitude = -0.2").expect("parse");
        assert_eq!(cfg.position(), Some((5.56, -0.2)));
    }

    #[test]
    fn toml_roundtrip_keeps_fields() {
        let mut cfg = Config::default();
        cfg.api_key = Some("KEY".into());
        cfg.default_city = "Lagos".into();

        let raw = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed = Config::from_toml(&raw).expect("parse");

        assert_eq!(parsed.api_key.as_deref(), Some("KEY"));
        assert_eq!(parsed.default_city, "Lagos");
    }
}
