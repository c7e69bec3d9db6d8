//! Application configuration

use crate::domain::taxonomy::Locale;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CONFIG_FILE: &str = "trove.json";

/// Main application configuration, persisted as JSON in the data directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config schema version
    pub version: u32,

    /// Data directory path
    pub data_dir: PathBuf,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Active UI language (two-letter code)
    #[serde(default = "default_language")]
    pub language: String,

    /// Seconds between periodic background refreshes
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,

    /// Whether the one-time legacy category normalization has run
    #[serde(default)]
    pub categories_normalized: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_sync_interval() -> u64 {
    900
}

impl AppConfig {
    /// Load the config from `data_dir`, creating a default one when none
    /// exists yet
    pub fn load_or_create(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);

        if config_path.exists() {
            info!("Loading config from {:?}", config_path);
            let json = fs::read_to_string(&config_path)?;
            let config: AppConfig = serde_json::from_str(&json)?;
            Ok(config)
        } else {
            warn!("No config found, creating default at {:?}", config_path);
            let config = Self::default_with_dir(data_dir.to_path_buf());
            config.save()?;
            Ok(config)
        }
    }

    fn default_with_dir(data_dir: PathBuf) -> Self {
        Self {
            version: 1,
            data_dir,
            log_level: default_log_level(),
            language: default_language(),
            sync_interval_secs: default_sync_interval(),
            categories_normalized: false,
        }
    }

    /// Persist the config to its data directory
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let config_path = self.data_dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(config_path, json)?;
        Ok(())
    }

    /// Active locale parsed from the language preference
    pub fn locale(&self) -> Locale {
        Locale::from_code(&self.language)
    }
}
