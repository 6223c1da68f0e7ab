use bytes::Bytes;
use explorer_core::{Job, SpoolFile};

use crate::JesError;

pub type JesResult<T> = Result<T, JesError>;

/// Listing filter sent to JES; `*` and empty values are left out of the request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobQueryParams {
    pub owner: Option<String>,
    pub prefix: Option<String>,
    pub status: Option<String>,
}

impl JobQueryParams {
    pub fn new(owner: &str, prefix: &str, status: &str) -> Self {
        fn wanted(value: &str) -> Option<String> {
            let value = value.trim();
            Some(value.to_string()).filter(|v| !v.is_empty())
        }
        Self {
            owner: wanted(owner),
            prefix: wanted(prefix),
            status: wanted(status).filter(|s| s != "*"),
        }
    }
}

/// How a spool file should be downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpoolDownload {
    pub binary: bool,
    /// Code page to convert from, e.g. `IBM-1047`.
    pub encoding: Option<String>,
}

/// JES operations a profile's API offers.
///
/// Optional capabilities default to [`JesError::Unsupported`]; callers fall back
/// or report per item.
#[async_trait::async_trait]
pub trait JesApi: Send + Sync {
    async fn get_jobs_by_parameters(&self, params: &JobQueryParams) -> JesResult<Vec<Job>>;

    async fn get_job(&self, job_id: &str) -> JesResult<Job>;

    async fn get_spool_files(&self, jobname: &str, jobid: &str) -> JesResult<Vec<SpoolFile>>;

    async fn get_spool_content_by_id(
        &self,
        jobname: &str,
        jobid: &str,
        spool_id: u32,
    ) -> JesResult<String>;

    async fn download_single_spool(
        &self,
        _spool: &SpoolFile,
        _options: &SpoolDownload,
    ) -> JesResult<Bytes> {
        Err(JesError::Unsupported("downloading a single spool file"))
    }

    /// `Ok(false)` when JES accepted the request but did not cancel the job.
    async fn cancel_job(&self, _job: &Job) -> JesResult<bool> {
        Err(JesError::Unsupported("cancel"))
    }

    async fn delete_job(&self, jobname: &str, jobid: &str) -> JesResult<()>;

    /// Issues an operator command and returns the console response.
    async fn issue_mvs_command(&self, _command: &str) -> JesResult<String> {
        Err(JesError::Unsupported("console commands"))
    }
}
