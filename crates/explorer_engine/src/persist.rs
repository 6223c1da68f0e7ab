use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use explorer_core::JobTree;
use explorer_logging::{explorer_info, explorer_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const STATE_FILENAME: &str = ".explorer_state.ron";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("state directory missing or not writable: {0}")]
    StateDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("could not serialize tree state: {0}")]
    Serialize(String),
}

/// Ensure the state directory exists; create if missing.
pub fn ensure_state_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::StateDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
    }
    NamedTempFile::new_in(dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` through a temp file and rename.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_state_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Everything of the job tree that survives a restart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedTreeState {
    /// Favorite lines, `[profile]: label{job|server}`.
    pub favorites: Vec<String>,
    pub search_history: Vec<String>,
    pub sessions: Vec<String>,
}

impl PersistedTreeState {
    pub fn from_tree(tree: &JobTree) -> Self {
        Self {
            favorites: tree.favorite_lines(),
            search_history: tree.history().searches().to_vec(),
            sessions: tree.history().sessions().to_vec(),
        }
    }
}

/// Reads and writes [`PersistedTreeState`] as RON in a state directory.
#[derive(Debug, Clone)]
pub struct TreeStateStore {
    dir: PathBuf,
    /// When off, the state is written empty.
    enabled: bool,
}

impl TreeStateStore {
    pub fn new(dir: PathBuf, enabled: bool) -> Self {
        Self { dir, enabled }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STATE_FILENAME)
    }

    /// Missing or unreadable state yields the empty state.
    pub fn load(&self) -> PersistedTreeState {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return PersistedTreeState::default();
            }
            Err(err) => {
                explorer_warn!("Failed to read tree state from {:?}: {}", path, err);
                return PersistedTreeState::default();
            }
        };

        match ron::from_str::<PersistedTreeState>(&content) {
            Ok(state) => {
                explorer_info!(
                    "Loaded {} favorites and {} searches from {:?}",
                    state.favorites.len(),
                    state.search_history.len(),
                    path
                );
                state
            }
            Err(err) => {
                explorer_warn!("Failed to parse tree state from {:?}: {}", path, err);
                PersistedTreeState::default()
            }
        }
    }

    pub fn save(&self, state: &PersistedTreeState) -> Result<PathBuf, PersistError> {
        let state = if self.enabled {
            state.clone()
        } else {
            PersistedTreeState::default()
        };
        let content = ron::ser::to_string_pretty(&state, ron::ser::PrettyConfig::new())
            .map_err(|err| PersistError::Serialize(err.to_string()))?;
        AtomicFileWriter::new(self.dir.clone()).write(STATE_FILENAME, &content)
    }

    /// Updates only the favorites of the stored state.
    pub fn save_favorites(&self, favorites: Vec<String>) -> Result<PathBuf, PersistError> {
        let mut state = self.load();
        state.favorites = favorites;
        self.save(&state)
    }

    /// Updates only the history of the stored state.
    pub fn save_history(
        &self,
        searches: Vec<String>,
        sessions: Vec<String>,
    ) -> Result<PathBuf, PersistError> {
        let mut state = self.load();
        state.search_history = searches;
        state.sessions = sessions;
        self.save(&state)
    }
}
