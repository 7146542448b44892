use crate::core::metal::Metal;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SpotProviderConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub spot: Option<SpotProviderConfig>,
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            spot: Some(SpotProviderConfig {
                url: "https://www.metalsdaily.com/live-prices/pgms/".to_string(),
            }),
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
        }
    }
}

fn default_metals() -> Vec<Metal> {
    Metal::ALL.to_vec()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Metals the dashboard tracks; every refresh resolves exactly these.
    #[serde(default = "default_metals")]
    pub metals: Vec<Metal>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Overrides for the historical-series ticker per metal.
    #[serde(default)]
    pub tickers: HashMap<Metal, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            metals: default_metals(),
            providers: ProvidersConfig::default(),
            tickers: HashMap::new(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(AppConfig::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "karat", "karat")
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

    pub fn ticker(&self, metal: Metal) -> String {
        self.tickers
            .get(&metal)
            .cloned()
            .unwrap_or_else(|| metal.default_ticker().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
metals:
  - gold
  - silver
providers:
  spot:
    url: "http://example.com/live-prices"
  yahoo:
    base_url: "http://example.com/yahoo"
tickers:
  gold: "XAUUSD=X"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.metals, vec![Metal::Gold, Metal::Silver]);
        assert_eq!(
            config.providers.spot.as_ref().unwrap().url,
            "http://example.com/live-prices"
        );
        assert_eq!(
            config.providers.yahoo.as_ref().unwrap().base_url,
            "http://example.com/yahoo"
        );
        assert_eq!(config.ticker(Metal::Gold), "XAUUSD=X");
        // No override falls back to the built-in futures symbol
        assert_eq!(config.ticker(Metal::Silver), "SI=F");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.metals, Metal::ALL.to_vec());
        assert!(config.providers.spot.is_some());
        assert!(config.providers.yahoo.is_some());
        assert_eq!(config.ticker(Metal::Palladium), "PA=F");
    }
}
