use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::settings::{Settings, SettingsStore};

const CONFIG_DIR_VAR: &str = "DASHBOARD_CONFIG_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    // External APIs
    pub fred_api_key: String,
    pub alpha_vantage_key: Option<String>,
    pub http_rate_limit: usize, // requests per minute

    // Feature flags
    pub enable_macro_analysis: bool,
    pub enable_stock_analysis: bool,

    // Local files
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
}

/// Settings file location; `DASHBOARD_CONFIG_DIR` or `./config`.
pub fn config_dir_from_env() -> PathBuf {
    PathBuf::from(env::var(CONFIG_DIR_VAR).unwrap_or_else(|_| "config".to_string()))
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        let config_dir = config_dir_from_env();
        let settings = SettingsStore::new(&config_dir)
            .load()
            .with_context(|| format!("loading settings from {}", config_dir.display()))?;
        Self::from_lookup(&settings, |key| env::var(key).ok())
    }

    /// Saved settings overlaid with any key lookup; `from_env` passes the
    /// process environment. Empty variables fall back to the saved value.
    pub fn from_lookup<F>(settings: &Settings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let flag = |key: &str, saved: bool| -> Result<bool> {
            match lookup(key) {
                Some(v) => v.parse().with_context(|| format!("{} must be true or false", key)),
                None => Ok(saved),
            }
        };
        let keys = &settings.api_keys;

        let config = Self {
            fred_api_key: lookup("STOCK_ANALYZER_FRED_API_KEY").unwrap_or_else(|| keys.fred_api_key.clone()),
            alpha_vantage_key: lookup("STOCK_ANALYZER_ALPHA_VANTAGE_KEY")
                .or_else(|| Some(keys.alpha_vantage_key.clone()))
                .filter(|k| !k.is_empty()),
            http_rate_limit: var("HTTP_RATE_LIMIT", "120")
                .parse()
                .context("HTTP_RATE_LIMIT must be a positive integer")?,

            enable_macro_analysis: flag("ENABLE_MACRO_ANALYSIS", settings.features.enable_macro_analysis)?,
            enable_stock_analysis: flag("ENABLE_STOCK_ANALYSIS", settings.features.enable_stock_analysis)?,

            config_dir: PathBuf::from(var(CONFIG_DIR_VAR, "config")),
            data_dir: PathBuf::from(var("DASHBOARD_DATA_DIR", "data")),
            export_dir: PathBuf::from(var("DASHBOARD_EXPORT_DIR", "exports")),
        };

        config.validate()?;
        Ok(config)
    }

    /// Names of the API keys that are set neither in the environment nor in the settings file.
    pub fn missing_api_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.fred_api_key.is_empty() {
            missing.push("fred_api_key");
        }
        if self.alpha_vantage_key.is_none() {
            missing.push("alpha_vantage_key");
        }
        missing
    }

    fn validate(&self) -> Result<()> {
        if self.http_rate_limit == 0 {
            anyhow::bail!("HTTP_RATE_LIMIT must be greater than 0");
        }
        let missing = self.missing_api_keys();
        if !missing.is_empty() {
            tracing::warn!(
                "Please configure your API keys ({}): `dashboard config set-key` or STOCK_ANALYZER_* variables",
                missing.join(", ")
            );
        }
        if self.enable_macro_analysis && self.fred_api_key.is_empty() {
            tracing::warn!("No FRED API key; macro analysis will be unavailable");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(settings: &Settings, pairs: &[(&str, &str)]) -> Result<DashboardConfig> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        DashboardConfig::from_lookup(settings, |key| vars.get(key).cloned())
    }

    fn config_from(pairs: &[(&str, &str)]) -> Result<DashboardConfig> {
        config_with(&Settings::default(), pairs)
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert!(config.enable_macro_analysis);
        assert!(config.enable_stock_analysis);
        assert_eq!(config.http_rate_limit, 120);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.export_dir, PathBuf::from("exports"));
        assert_eq!(config.config_dir, PathBuf::from("config"));
        assert!(config.fred_api_key.is_empty());
        assert!(config.alpha_vantage_key.is_none());
        assert_eq!(config.missing_api_keys(), vec!["fred_api_key", "alpha_vantage_key"]);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("STOCK_ANALYZER_FRED_API_KEY", "abc123"),
            ("ENABLE_MACRO_ANALYSIS", "false"),
            ("DASHBOARD_DATA_DIR", "/tmp/dash"),
            ("HTTP_RATE_LIMIT", "30"),
        ])
        .unwrap();
        assert_eq!(config.fred_api_key, "abc123");
        assert!(!config.enable_macro_analysis);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/dash"));
        assert_eq!(config.http_rate_limit, 30);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("ENABLE_STOCK_ANALYSIS", "yes")]).is_err());
        assert!(config_from(&[("HTTP_RATE_LIMIT", "0")]).is_err());
        assert!(config_from(&[("HTTP_RATE_LIMIT", "fast")]).is_err());
    }

    #[test]
    fn test_saved_settings_apply_without_env() {
        let mut settings = Settings::default();
        settings.api_keys.fred_api_key = "saved-fred".to_string();
        settings.api_keys.alpha_vantage_key = "saved-av".to_string();
        settings.features.enable_stock_analysis = false;

        let config = config_with(&settings, &[]).unwrap();

        assert_eq!(config.fred_api_key, "saved-fred");
        assert_eq!(config.alpha_vantage_key.as_deref(), Some("saved-av"));
        assert!(!config.enable_stock_analysis);
        assert!(config.missing_api_keys().is_empty());
    }

    #[test]
    fn test_env_takes_precedence_over_saved_settings() {
        let mut settings = Settings::default();
        settings.api_keys.fred_api_key = "saved-fred".to_string();
        settings.features.enable_macro_analysis = false;

        let config = config_with(
            &settings,
            &[
                ("STOCK_ANALYZER_FRED_API_KEY", "env-fred"),
                ("ENABLE_MACRO_ANALYSIS", "true"),
                ("STOCK_ANALYZER_ALPHA_VANTAGE_KEY", ""),
            ],
        )
        .unwrap();

        assert_eq!(config.fred_api_key, "env-fred");
        assert!(config.enable_macro_analysis);
        assert!(config.alpha_vantage_key.is_none());
        assert_eq!(config.missing_api_keys(), vec!["alpha_vantage_key"]);
    }
}
