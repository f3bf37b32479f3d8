//! Service configuration loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `$BOREALIS_CONFIG` environment variable (path to TOML file)
//! 2. `survey_config.toml` in the current working directory
//! 3. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub verification: VerificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP bind address.
    pub addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the sled database.
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Magnetic reference models older than this are flagged MAG_MODEL_STALE.
    pub mag_model_max_age_days: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data/survey_db"),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            mag_model_max_age_days: 30,
        }
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            verification: VerificationConfig::default(),
        }
    }
}

impl SurveyConfig {
    /// Load configuration using the documented fallback order.
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var("BOREALIS_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from BOREALIS_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from BOREALIS_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "BOREALIS_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./survey_config.toml
        let local = PathBuf::from("survey_config.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./survey_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./survey_config.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No survey_config.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SurveyConfig::default();
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.verification.mag_model_max_age_days, 30);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: SurveyConfig =
            toml::from_str("[verification]\nmag_model_max_age_days = 90\n").unwrap();
        assert_eq!(config.verification.mag_model_max_age_days, 90);
        assert_eq!(config.server.addr, "0.0.0.0:8080");
    }
}
