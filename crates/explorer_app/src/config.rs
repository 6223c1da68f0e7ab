use std::fs;
use std::path::{Path, PathBuf};

use explorer_engine::{ExplorerSettings, ProfileConfig};
use explorer_logging::LogDestination;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "explorer.ron";

/// Contents of `explorer.ron`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub profiles: Vec<ProfileConfig>,
    pub settings: ExplorerSettings,
    /// `file`, `terminal` or `both`.
    pub log_destination: String,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// Where favorites and history are kept; the working directory when unset.
    pub state_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profiles: Vec::new(),
            settings: ExplorerSettings::default(),
            log_destination: "file".to_string(),
            log_level: "info".to_string(),
            log_file: None,
            state_dir: None,
        }
    }
}

impl AppConfig {
    pub fn log_destination(&self) -> LogDestination {
        LogDestination::from_name(&self.log_destination).unwrap_or_default()
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Reads the configuration. Logging is not up yet when this runs, so problems
/// are returned as warnings for the caller to log afterwards.
pub fn load(path: &Path) -> (AppConfig, Option<String>) {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            return (
                AppConfig::default(),
                Some(format!(
                    "No configuration read from {path:?} ({err}); starting without profiles"
                )),
            );
        }
    };
    match ron::from_str::<AppConfig>(&content) {
        Ok(config) => (config, None),
        Err(err) => (
            AppConfig::default(),
            Some(format!("Failed to parse configuration {path:?}: {err}")),
        ),
    }
}
