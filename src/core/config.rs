use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: "https://api.ratesapi.dev".to_string(),
        }
    }
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_animation_millis() -> u64 {
    750
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Currency all fetched rates are quoted against.
    pub base_currency: String,

    /// Currencies pinned to the top of the rates table.
    #[serde(default)]
    pub watchlist: Vec<String>,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_animation_millis")]
    pub animation_millis: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "ratewatch", "ratewatch")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
base_currency: "USD"
watchlist:
  - "EUR"
  - "GBP"
provider:
  base_url: "http://example.com/rates"
refresh_interval_secs: 30
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.base_currency, "USD");
        assert_eq!(config.watchlist, vec!["EUR", "GBP"]);
        assert_eq!(config.provider.base_url, "http://example.com/rates");
        assert_eq!(config.refresh_interval_secs, 30);
        // Not set in the yaml, falls back to the default
        assert_eq!(config.animation_millis, 750);
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str(r#"base_currency: "EUR""#).unwrap();
        assert_eq!(config.base_currency, "EUR");
        assert!(config.watchlist.is_empty());
        assert_eq!(config.provider.base_url, "https://api.ratesapi.dev");
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.animation_duration(), Duration::from_millis(750));
    }

    #[test]
    fn test_config_missing_base_currency_is_an_error() {
        let result = serde_yaml::from_str::<AppConfig>("watchlist: []");
        assert!(result.is_err());
    }
}
