//! Explorer core: the job tree state machine, search DSL and favorites, free of IO.
mod effect;
mod favorites;
mod filter;
mod history;
mod job;
mod msg;
mod node;
mod poll;
mod query;
mod sort;
mod tree;
mod update;
mod view_model;

pub use effect::Effect;
pub use favorites::{favorite_job_label, parse_favorites, FavoriteData, AUTHENTICATE_FOR_FAVORITES};
pub use history::{TreeHistory, MAX_SEARCH_HISTORY};
pub use job::{Job, SpoolEncoding, SpoolFile, SpoolKey};
pub use msg::Msg;
pub use node::{
    Collapsible, FavoriteProfileData, JobData, LocalFilter, Node, NodeId, NodeKind,
    ProfileResolution, SessionData, SessionFilter, SpoolData,
};
pub use poll::{validate_poll_interval, INVALID_POLL_INTERVAL, MIN_POLL_INTERVAL_MS};
pub use query::{
    create_search_label, parse_job_search_query, search_menu, validate_job_string, EditorStep,
    JobProperty, JobQueryEditor, JobSearchCriteria, PickerItem, SearchMenuChoice,
    CREATE_FILTER_LABEL, JOBS_MAX_PREFIX, JOB_STATUS_OPTIONS, SEARCH_BY_ID_LABEL,
    SUBMIT_QUERY_LABEL,
};
pub use sort::{JobSortMethod, NodeSort, SortDirection};
pub use tree::{
    JobTree, TreeError, TreeResult, TreeSettings, FAVORITES_LABEL, NO_JOBS_FOUND, NO_SPOOL_FILES,
    SEARCH_PLACEHOLDER,
};
pub use update::update;
pub use view_model::{ItemKind, JobTreeView, TreeItemView};
