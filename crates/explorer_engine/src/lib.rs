//! Explorer engine: JES access, the job file system, polling and effect execution.
mod api;
mod bulk;
mod config;
mod decode;
mod error;
mod fs;
mod persist;
mod poller;
mod prompt;
mod provider;
mod registry;
mod zosmf;

pub use api::{JesApi, JesResult, JobQueryParams, SpoolDownload};
pub use bulk::{
    cancel_jobs, delete_jobs, BulkReport, SelectedJob, ALREADY_CANCELLED, CANCEL_UNSUPPORTED,
    NOT_CANCELLED,
};
pub use config::{ExplorerSettings, ProfileConfig};
pub use decode::{decode_spool, DecodeError, DecodedSpool};
pub use error::{ExplorerError, ExplorerResult, FsError, JesError};
pub use fs::{
    DirectoryKind, FileChange, FileStat, FileType, FsResult, JobFileSystem, WriteOptions,
    DELETE_UNSUPPORTED, RENAME_UNSUPPORTED,
};
pub use persist::{
    ensure_state_dir, AtomicFileWriter, PersistError, PersistedTreeState, TreeStateStore,
    STATE_FILENAME,
};
pub use poller::{PollRegistry, PollRequest, Poller};
pub use prompt::Prompter;
pub use provider::{JobTreeProvider, TreeEvent, POLL_INTERVAL_PROMPT};
pub use registry::{ApiRegistry, RegisteredProfile};
pub use zosmf::ZosmfJesApi;
