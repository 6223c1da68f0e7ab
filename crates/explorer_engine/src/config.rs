use std::time::Duration;

use explorer_core::{TreeSettings, MAX_SEARCH_HISTORY};
use serde::{Deserialize, Serialize};

/// User settings shared by the tree, the HTTP client and persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
    /// Interval offered when polling a spool file.
    pub default_poll_interval_ms: u64,
    pub max_search_history: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// When off, favorites and history are saved empty.
    pub persistence: bool,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            default_poll_interval_ms: 5_000,
            max_search_history: MAX_SEARCH_HISTORY,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            persistence: true,
        }
    }
}

impl ExplorerSettings {
    pub fn tree_settings(&self) -> TreeSettings {
        TreeSettings {
            max_search_history: self.max_search_history,
            default_poll_interval_ms: self.default_poll_interval_ms,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Connection details of one z/OSMF profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// EMCS console used for operator commands.
    #[serde(default)]
    pub console_name: Option<String>,
}

impl ProfileConfig {
    pub fn is_authenticated(&self) -> bool {
        self.user.as_deref().is_some_and(|u| !u.is_empty()) && self.password.is_some()
    }
}
