/// Default number of searches kept in history.
pub const MAX_SEARCH_HISTORY: usize = 5;

/// Recent searches and known sessions, persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeHistory {
    searches: Vec<String>,
    sessions: Vec<String>,
    max_searches: usize,
}

impl Default for TreeHistory {
    fn default() -> Self {
        Self::new(MAX_SEARCH_HISTORY)
    }
}

impl TreeHistory {
    pub fn new(max_searches: usize) -> Self {
        Self {
            searches: Vec::new(),
            sessions: Vec::new(),
            max_searches,
        }
    }

    /// Most recent first.
    pub fn searches(&self) -> &[String] {
        &self.searches
    }

    pub fn sessions(&self) -> &[String] {
        &self.sessions
    }

    /// Moves `criteria` to the front, dropping equal entries and the oldest overflow.
    pub fn add_search(&mut self, criteria: &str) -> bool {
        if criteria.trim().is_empty() {
            return false;
        }
        self.searches
            .retain(|existing| existing.trim() != criteria.trim());
        self.searches.insert(0, criteria.to_string());
        self.searches.truncate(self.max_searches);
        true
    }

    pub fn remove_search(&mut self, criteria: &str) {
        self.searches.retain(|existing| existing != criteria);
    }

    pub fn reset_searches(&mut self) {
        self.searches.clear();
    }

    pub fn add_session(&mut self, profile: &str) {
        if !self.sessions.iter().any(|s| s == profile) {
            self.sessions.push(profile.to_string());
        }
    }

    pub fn remove_session(&mut self, profile: &str) {
        self.sessions.retain(|s| s != profile);
    }

    /// Restores persisted entries, keeping the configured cap.
    pub fn restore(&mut self, searches: Vec<String>, sessions: Vec<String>) {
        self.searches = Vec::with_capacity(searches.len());
        for search in searches.into_iter().rev() {
            self.add_search(&search);
        }
        self.sessions.clear();
        for session in sessions {
            self.add_session(&session);
        }
    }
}
