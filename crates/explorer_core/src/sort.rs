use std::cmp::Ordering;

use crate::Job;

/// Field a session's job list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobSortMethod {
    #[default]
    Id,
    DateCompleted,
    Name,
    ReturnCode,
}

impl JobSortMethod {
    pub const ALL: [JobSortMethod; 4] = [
        JobSortMethod::Id,
        JobSortMethod::DateCompleted,
        JobSortMethod::Name,
        JobSortMethod::ReturnCode,
    ];

    pub fn label(self) -> &'static str {
        match self {
            JobSortMethod::Id => "Job ID",
            JobSortMethod::DateCompleted => "Date Completed",
            JobSortMethod::Name => "Job Name",
            JobSortMethod::ReturnCode => "Return Code",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.label().eq_ignore_ascii_case(label.trim()))
    }

    fn key(self, job: &Job) -> &str {
        let value = match self {
            JobSortMethod::Id => Some(job.jobid.as_str()),
            JobSortMethod::DateCompleted => job.exec_ended.as_deref(),
            JobSortMethod::Name => Some(job.jobname.as_str()),
            // Active jobs have no return code yet; compare their status instead.
            JobSortMethod::ReturnCode => job.retcode.as_deref().or(job.status.as_deref()),
        };
        value.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeSort {
    pub method: JobSortMethod,
    pub direction: SortDirection,
}

impl NodeSort {
    pub fn new(method: JobSortMethod, direction: SortDirection) -> Self {
        Self { method, direction }
    }

    /// Orders two jobs by the configured key, breaking ties by job id.
    pub fn compare(&self, x: &Job, y: &Job) -> Ordering {
        let ordering = self
            .method
            .key(x)
            .cmp(self.method.key(y))
            .then_with(|| x.jobid.cmp(&y.jobid));
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}
