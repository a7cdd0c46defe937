// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration for pagebot

use crate::error::{PagebotError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `pagespeed.api_key`
pub const API_KEY_ENV: &str = "PAGESPEED_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pagespeed: PageSpeedConfig,
    pub contrast: ContrastConfig,
    pub palette: PaletteConfig,
    pub compliance: ComplianceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpeedConfig {
    /// runPagespeed endpoint
    pub endpoint: String,
    /// API key; never logged
    pub api_key: Option<String>,
    pub strategy: Strategy,
    pub categories: Vec<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastConfig {
    /// Pairs below this ratio are reported (WCAG AA body text)
    pub min_ratio: f64,
}

/// Tier boundaries for color frequency grouping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub most_used_percent: u8,
    pub supporting_percent: u8,
    /// "Most Used" never holds fewer than this many entries when available
    pub min_most_used: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    pub fail_below_performance: f64,
    pub fail_below_security: f64,
    pub pass_performance: f64,
    pub pass_seo: f64,
    pub pass_security: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pagespeed: PageSpeedConfig::default(),
            contrast: ContrastConfig::default(),
            palette: PaletteConfig::default(),
            compliance: ComplianceConfig::default(),
        }
    }
}

impl Default for PageSpeedConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.googleapis.com/pagespeedonline/v5/runPagespeed".to_string(),
            api_key: None,
            strategy: Strategy::Mobile,
            categories: vec![
                "performance".to_string(),
                "accessibility".to_string(),
                "seo".to_string(),
            ],
            timeout_secs: 60,
            user_agent: format!("pagebot/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self { min_ratio: 4.5 }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            most_used_percent: 40,
            supporting_percent: 30,
            min_most_used: 3,
        }
    }
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            fail_below_performance: 0.5,
            fail_below_security: 0.4,
            pass_performance: 0.9,
            pass_seo: 0.9,
            pass_security: 0.8,
        }
    }
}

impl PageSpeedConfig {
    /// API key from the environment, falling back to the config file
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pagebot")
        .join("config.yml")
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        toml::from_str(&content)
            .map_err(|e| PagebotError::Config(format!("TOML parse error: {}", e)))
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| PagebotError::Config(format!("YAML parse error: {}", e)))
    }
}

pub fn write_default_config(path: &Path) -> Result<()> {
    let config = Config::default();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        toml::to_string_pretty(&config)
            .map_err(|e| PagebotError::Config(format!("TOML serialize error: {}", e)))?
    } else {
        serde_yaml::to_string(&config)?
    };

    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("absent.yml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        write_default_config(&path).unwrap();
        assert_eq!(load_config(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        write_default_config(&path).unwrap();
        assert_eq!(load_config(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "contrast:\n  min_ratio: 7.0\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.contrast.min_ratio, 7.0);
        assert_eq!(config.palette, PaletteConfig::default());
        assert_eq!(config.pagespeed.strategy, Strategy::Mobile);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "contrast: [unclosed").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, PagebotError::Config(_)));
    }
}
