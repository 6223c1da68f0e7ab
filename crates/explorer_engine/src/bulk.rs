use explorer_core::Job;
use explorer_logging::{explorer_error, explorer_info};

use crate::{ApiRegistry, FsError, JesError, JobFileSystem};

pub const ALREADY_CANCELLED: &str = "The selected jobs were already cancelled.";
pub const CANCEL_UNSUPPORTED: &str = "The cancel function is not implemented in this API.";
pub const NOT_CANCELLED: &str = "The job was not cancelled.";

/// Outcome of an action applied to several jobs; every job is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkReport {
    /// `JOBNAME(JOBID)` of every job the action succeeded on.
    pub succeeded: Vec<String>,
    /// Job and reason.
    pub failed: Vec<(String, String)>,
    pub skipped: Vec<String>,
}

impl BulkReport {
    /// One line per failure, `JOBNAME(JOBID): reason`.
    pub fn failure_lines(&self) -> Vec<String> {
        self.failed
            .iter()
            .map(|(job, reason)| format!("{job}: {reason}"))
            .collect()
    }
}

/// A job selected in the tree together with its profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedJob {
    pub profile: String,
    pub job: Job,
}

/// Cancels every selected job that has not already ended through a cancel or abend.
pub async fn cancel_jobs(registry: &ApiRegistry, jobs: &[SelectedJob]) -> BulkReport {
    let mut report = BulkReport::default();
    for selected in jobs {
        let name = selected.job.display_name();
        if selected.job.is_cancelled_or_abended() {
            report.skipped.push(name);
            continue;
        }
        let outcome = match registry.api(&selected.profile) {
            Ok(api) => api.cancel_job(&selected.job).await,
            Err(err) => Err(err),
        };
        match outcome {
            Ok(true) => {
                explorer_info!("Cancelled {}", name);
                report.succeeded.push(name);
            }
            Ok(false) => report.failed.push((name, NOT_CANCELLED.to_string())),
            Err(JesError::Unsupported(_)) => {
                report.failed.push((name, CANCEL_UNSUPPORTED.to_string()))
            }
            Err(err) => {
                explorer_error!("Cancelling {} failed: {}", name, err);
                report.failed.push((name, err.to_string()));
            }
        }
    }
    report
}

/// Deletes every selected job on JES through the job file system.
pub async fn delete_jobs(fs: &JobFileSystem, jobs: &[SelectedJob]) -> BulkReport {
    let mut report = BulkReport::default();
    for selected in jobs {
        let name = selected.job.display_name();
        match delete_one(fs, selected).await {
            Ok(()) => {
                explorer_info!("Deleted {}", name);
                report.succeeded.push(name);
            }
            Err(err) => {
                explorer_error!("Deleting {} failed: {}", name, err);
                report.failed.push((name, err.to_string()));
            }
        }
    }
    report
}

async fn delete_one(fs: &JobFileSystem, selected: &SelectedJob) -> Result<(), FsError> {
    let profile_dir = format!("/{}/", selected.profile);
    let path = format!("/{}/{}", selected.profile, selected.job.jobid);
    // Favorited jobs may never have been listed through the file system.
    fs.create_directory(&profile_dir, crate::DirectoryKind::Filter(Default::default()))?;
    fs.create_directory(&path, crate::DirectoryKind::Job(selected.job.clone()))?;
    fs.delete(&path).await
}
