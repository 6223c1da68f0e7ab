use explorer_core::{NodeId, TreeError};
use thiserror::Error;

use crate::decode::DecodeError;
use crate::persist::PersistError;

/// Failures talking to JES.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JesError {
    #[error("authentication failed for profile {profile}")]
    Auth { profile: String },
    #[error("http status {status}: {message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("could not decode response: {0}")]
    Decode(String),
    /// The API behind a profile does not offer this operation.
    #[error("{0} is not supported by this API")]
    Unsupported(&'static str),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("no JES API registered for profile {0}")]
    ProfileNotFound(String),
}

impl JesError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, JesError::Unsupported(_))
    }
}

/// Failures of the virtual job file system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("file is a directory: {0}")]
    FileIsADirectory(String),
    #[error("file is not a directory: {0}")]
    FileNotADirectory(String),
    #[error("file exists: {0}")]
    FileExists(String),
    #[error("{0}")]
    Unsupported(&'static str),
    #[error(transparent)]
    Api(#[from] JesError),
}

/// Errors surfaced by the tree provider.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Api(#[from] JesError),
    #[error(transparent)]
    Fs(#[from] FsError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("no profile named {0}")]
    MissingProfile(String),
    #[error("unknown tree node {0}")]
    UnknownNode(NodeId),
    #[error("{0}")]
    InvalidPollInterval(String),
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;
