//! Saved settings: API keys and feature flags kept under the config directory
//! as `config.yaml`, mirrored to `config.json`.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const YAML_FILE: &str = "config.yaml";
const JSON_FILE: &str = "config.json";

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(default)]
    pub fred_api_key: String,
    #[serde(default)]
    pub alpha_vantage_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    #[serde(default = "enabled")]
    pub enable_macro_analysis: bool,
    #[serde(default = "enabled")]
    pub enable_stock_analysis: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self { enable_macro_analysis: true, enable_stock_analysis: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_keys: ApiKeys,
    #[serde(default)]
    pub features: Features,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ApiKeyName {
    Fred,
    AlphaVantage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Feature {
    Macro,
    Stock,
}

impl Feature {
    pub fn label(self) -> &'static str {
        match self {
            Feature::Macro => "macro analysis",
            Feature::Stock => "stock analysis",
        }
    }
}

/// Reads and writes [`Settings`] in one directory.
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn yaml_path(&self) -> PathBuf {
        self.dir.join(YAML_FILE)
    }

    pub fn json_path(&self) -> PathBuf {
        self.dir.join(JSON_FILE)
    }

    /// YAML first, JSON second; with neither present the defaults are written out.
    pub fn load(&self) -> Result<Settings> {
        let yaml = self.yaml_path();
        if yaml.exists() {
            let text = read(&yaml)?;
            return serde_yaml::from_str(&text).with_context(|| format!("parsing {}", yaml.display()));
        }

        let json = self.json_path();
        if json.exists() {
            let text = read(&json)?;
            return serde_json::from_str(&text).with_context(|| format!("parsing {}", json.display()));
        }

        tracing::info!("No settings in {}, writing defaults", self.dir.display());
        let settings = Settings::default();
        self.save(&settings)?;
        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("creating {}", self.dir.display()))?;

        let yaml = serde_yaml::to_string(settings).context("serializing settings to YAML")?;
        write(&self.yaml_path(), &yaml)?;
        let json = serde_json::to_string_pretty(settings).context("serializing settings to JSON")?;
        write(&self.json_path(), &json)?;

        tracing::debug!("Saved settings to {}", self.dir.display());
        Ok(())
    }

    pub fn update_api_key(&self, name: ApiKeyName, key: &str) -> Result<Settings> {
        let mut settings = self.load()?;
        let slot = match name {
            ApiKeyName::Fred => &mut settings.api_keys.fred_api_key,
            ApiKeyName::AlphaVantage => &mut settings.api_keys.alpha_vantage_key,
        };
        *slot = key.trim().to_string();
        self.save(&settings)?;
        Ok(settings)
    }

    pub fn update_feature_flag(&self, feature: Feature, enabled: bool) -> Result<Settings> {
        let mut settings = self.load()?;
        match feature {
            Feature::Macro => settings.features.enable_macro_analysis = enabled,
            Feature::Stock => settings.features.enable_stock_analysis = enabled,
        }
        self.save(&settings)?;
        Ok(settings)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn write(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}
