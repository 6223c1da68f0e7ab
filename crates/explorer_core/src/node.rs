use crate::{Job, NodeSort, SpoolEncoding, SpoolFile};

/// Arena key of a tree node. Ids are never reused.
pub type NodeId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collapsible {
    #[default]
    None,
    Collapsed,
    Expanded,
}

/// Job listing filter of a session or favorited search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFilter {
    pub owner: String,
    pub prefix: String,
    pub search_id: String,
    pub status: String,
}

impl Default for SessionFilter {
    fn default() -> Self {
        Self {
            owner: "*".to_string(),
            prefix: "*".to_string(),
            search_id: String::new(),
            status: "*".to_string(),
        }
    }
}

/// Client-side filter state of a node listing jobs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalFilter {
    /// Upper-cased query currently applied, if any.
    pub query: Option<String>,
    /// Unfiltered children, captured the first time a filter is applied.
    pub snapshot: Option<Vec<NodeId>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub profile: String,
    /// User of the profile's session; an empty owner falls back to it.
    pub user: Option<String>,
    pub filter: SessionFilter,
    pub sort: NodeSort,
    /// Set once a search has been applied; unfiltered sessions show a placeholder.
    pub filtered: bool,
    pub local_filter: LocalFilter,
}

impl SessionData {
    pub fn new(profile: impl Into<String>, user: Option<String>) -> Self {
        let filter = SessionFilter {
            owner: user.clone().unwrap_or_else(|| "*".to_string()),
            ..SessionFilter::default()
        };
        Self {
            profile: profile.into(),
            user,
            filter,
            sort: NodeSort::default(),
            filtered: false,
            local_filter: LocalFilter::default(),
        }
    }

    pub fn set_owner(&mut self, owner: &str) {
        self.filter.owner = if owner.is_empty() {
            self.user.clone().unwrap_or_else(|| "*".to_string())
        } else {
            owner.to_string()
        };
    }

    pub fn set_prefix(&mut self, prefix: &str) {
        self.filter.prefix = if prefix.is_empty() {
            "*".to_string()
        } else {
            prefix.to_string()
        };
    }

    pub fn set_status(&mut self, status: &str) {
        if !status.is_empty() {
            self.filter.status = status.to_string();
        }
    }

    pub fn set_search_id(&mut self, search_id: &str) {
        self.filter.search_id = search_id.to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobData {
    pub profile: String,
    pub job: Job,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolData {
    pub profile: String,
    pub job: Job,
    pub spool: SpoolFile,
    pub unique_name: String,
    pub encoding: Option<SpoolEncoding>,
    pub polling: bool,
}

/// Whether the profile behind a favorites group has been loaded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProfileResolution {
    #[default]
    Unresolved,
    Resolved {
        user: Option<String>,
    },
    /// The profile exists but has no usable credentials; the group shows
    /// `placeholder` instead of its favorites.
    Unauthenticated {
        placeholder: NodeId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteProfileData {
    pub profile: String,
    pub resolution: ProfileResolution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic "Favorites" root.
    FavoritesRoot,
    Session(SessionData),
    /// Favorites of one profile.
    FavoriteProfile(FavoriteProfileData),
    FavoriteSearch(SessionData),
    Job(JobData),
    FavoriteJob(JobData),
    Spool(SpoolData),
    /// Placeholder leaf carrying only a message.
    Information,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub description: Option<String>,
    pub tooltip: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub collapsible: Collapsible,
    /// Cached children are stale and must be fetched again on expansion.
    pub dirty: bool,
    pub kind: NodeKind,
}

impl Node {
    pub fn profile_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::FavoritesRoot | NodeKind::Information => None,
            NodeKind::Session(data) | NodeKind::FavoriteSearch(data) => Some(&data.profile),
            NodeKind::FavoriteProfile(data) => Some(&data.profile),
            NodeKind::Job(data) | NodeKind::FavoriteJob(data) => Some(&data.profile),
            NodeKind::Spool(data) => Some(&data.profile),
        }
    }

    /// Filter data of nodes whose children are jobs.
    pub fn session_data(&self) -> Option<&SessionData> {
        match &self.kind {
            NodeKind::Session(data) | NodeKind::FavoriteSearch(data) => Some(data),
            _ => None,
        }
    }

    pub fn session_data_mut(&mut self) -> Option<&mut SessionData> {
        match &mut self.kind {
            NodeKind::Session(data) | NodeKind::FavoriteSearch(data) => Some(data),
            _ => None,
        }
    }

    pub fn job(&self) -> Option<&Job> {
        match &self.kind {
            NodeKind::Job(data) | NodeKind::FavoriteJob(data) => Some(&data.job),
            NodeKind::Spool(data) => Some(&data.job),
            _ => None,
        }
    }

    pub fn spool(&self) -> Option<&SpoolData> {
        match &self.kind {
            NodeKind::Spool(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_session(&self) -> bool {
        matches!(self.kind, NodeKind::Session(_))
    }

    pub fn is_job(&self) -> bool {
        matches!(self.kind, NodeKind::Job(_) | NodeKind::FavoriteJob(_))
    }

    pub fn is_favorite(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::FavoriteSearch(_) | NodeKind::FavoriteJob(_)
        )
    }

    pub fn is_polling(&self) -> bool {
        self.spool().is_some_and(|spool| spool.polling)
    }
}
