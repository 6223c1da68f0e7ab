use crate::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// List jobs matching a session's filter.
    FetchJobs {
        node: NodeId,
        profile: String,
        owner: String,
        prefix: String,
        status: String,
    },
    /// Look up a single job by id.
    FetchJob {
        node: NodeId,
        profile: String,
        job_id: String,
    },
    FetchSpools {
        node: NodeId,
        profile: String,
        jobname: String,
        jobid: String,
    },
    /// Load the profile behind a favorites group.
    ResolveProfile { node: NodeId, profile: String },
    /// Make sure a session exists for a favorite's profile.
    EnsureSession { profile: String },
    PersistFavorites(Vec<String>),
    PersistHistory {
        searches: Vec<String>,
        sessions: Vec<String>,
    },
    PromptPollInterval {
        node: NodeId,
        path: String,
        default_interval_ms: u64,
    },
    StartPolling {
        node: NodeId,
        path: String,
        interval_ms: u64,
    },
    StopPolling { path: String },
    ConfirmRemoveFavoriteProfile { profile: String },
    /// Offer to drop favorites whose profile no longer exists.
    OfferRemoveMissingProfile { profile: String },
    ReportApiError {
        profile: String,
        context: String,
        error: String,
    },
    ShowMessage(String),
    /// Ask the view to re-render `node`, or everything.
    Refresh(Option<NodeId>),
}
