//! Engine Configuration - business parameters as TOML values
//!
//! ## Loading Order
//!
//! 1. `STRATFORGE_CONFIG` environment variable (path to TOML file)
//! 2. `stratforge.toml` in the current working directory
//! 3. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const CONFIG_ENV_VAR: &str = "STRATFORGE_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "stratforge.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({0}): {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Config parse error ({0}): {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Share of the total budget held back as contingency, in percent.
    pub contingency_percent: f64,
    /// Budgets at or above this get doubled numeric KPI targets and the
    /// large-budget recommendations.
    pub high_budget_threshold: u64,
    pub daily_content_threshold: u64,
    pub weekly_content_threshold: u64,
    pub max_recommendations: usize,
    pub max_kpis: usize,
    /// Directory of JSON industry profiles layered over the built-in catalog.
    pub catalog_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            contingency_percent: 10.0,
            high_budget_threshold: 100_000,
            daily_content_threshold: 50_000,
            weekly_content_threshold: 20_000,
            max_recommendations: 8,
            max_kpis: 8,
            catalog_dir: None,
        }
    }
}

impl EngineConfig {
    /// Load using the standard search order, falling back to defaults on
    /// any missing or invalid file.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded engine config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load engine config, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded engine config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        Self::default()
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = vec![];

        if !self.contingency_percent.is_finite()
            || !(0.0..=100.0).contains(&self.contingency_percent)
        {
            errors.push(format!(
                "contingency_percent must be within 0..=100, got {}",
                self.contingency_percent
            ));
        }
        if self.weekly_content_threshold > self.daily_content_threshold {
            errors.push("weekly_content_threshold must not exceed daily_content_threshold".to_string());
        }
        if self.max_recommendations == 0 {
            errors.push("max_recommendations must be at least 1".to_string());
        }
        if self.max_kpis == 0 {
            errors.push("max_kpis must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "contingency_percent = 15.0").unwrap();
        let config = EngineConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.contingency_percent, 15.0);
        assert_eq!(config.max_recommendations, 8);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = EngineConfig {
            contingency_percent: 120.0,
            max_kpis: 0,
            ..EngineConfig::default()
        };
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "contingency_percent = \"lots\"").unwrap();
        let err = EngineConfig::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Config parse error"));
    }
}
