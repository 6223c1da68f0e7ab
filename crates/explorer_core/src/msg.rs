use crate::{Job, JobSearchCriteria, NodeId, NodeSort, SpoolEncoding, SpoolFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A profile was added to the tree.
    SessionAdded { profile: String, user: Option<String> },
    /// User hid a session from the tree.
    SessionRemoved { node: NodeId },
    /// User expanded a node; loads its children when stale.
    Expand(NodeId),
    Collapse(NodeId),
    /// User asked for a node to be reloaded.
    Refresh(NodeId),
    /// Engine listing for a session or favorited search.
    JobsLoaded { node: NodeId, jobs: Vec<Job> },
    /// Engine listing of a job's spool files.
    SpoolsLoaded { node: NodeId, spools: Vec<SpoolFile> },
    /// A listing request failed; the node keeps its children.
    LoadFailed { node: NodeId, error: String },
    /// User completed the search prompt on a session.
    SearchSubmitted {
        node: NodeId,
        criteria: JobSearchCriteria,
    },
    /// User clicked a favorited search.
    FavoriteSearchOpened { node: NodeId },
    SortChanged { node: NodeId, sort: NodeSort },
    FavoriteAdded { node: NodeId },
    FavoriteRemoved { node: NodeId },
    /// Removal of a whole favorites group; user-initiated removals are confirmed first.
    FavoriteProfileRemoved { profile: String, user_selected: bool },
    FavoriteProfileRemovalConfirmed { profile: String },
    /// Persisted favorites lines read at startup.
    FavoritesRestored(Vec<String>),
    /// Persisted search and session history read at startup.
    HistoryRestored {
        searches: Vec<String>,
        sessions: Vec<String>,
    },
    SearchHistoryRemoved(String),
    SearchHistoryReset,
    /// The profile behind a favorites group loaded.
    ProfileResolved { node: NodeId, user: Option<String> },
    /// The profile loaded but cannot authenticate.
    ProfileUnauthenticated { node: NodeId },
    /// No profile with the group's name exists any more.
    ProfileMissing { node: NodeId },
    LocalFilterChanged { node: NodeId, query: String },
    LocalFilterCleared { node: NodeId },
    /// User toggled polling on a spool file.
    PollToggled { node: NodeId },
    /// User picked an interval after [`crate::Effect::PromptPollInterval`].
    PollIntervalChosen { node: NodeId, interval_ms: u64 },
    SpoolEncodingChanged {
        node: NodeId,
        encoding: SpoolEncoding,
    },
    /// The job was deleted remotely.
    JobDeleted { node: NodeId },
}
