//! Virtual file system over JES output: `/{profile}/` lists jobs matching the
//! profile's filter, `/{profile}/{jobid}` lists spool files and
//! `/{profile}/{jobid}/{spool}` holds spool content.
use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use explorer_core::{Job, SpoolEncoding, SpoolFile};
use explorer_logging::{explorer_debug, explorer_trace};

use crate::{ApiRegistry, FsError, JesApi, JobQueryParams, SpoolDownload};

pub type FsResult<T> = Result<T, FsError>;

pub const RENAME_UNSUPPORTED: &str = "Renaming is not supported for jobs.";
pub const DELETE_UNSUPPORTED: &str = "Only jobs can be deleted.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Created(String),
    Changed(String),
    Deleted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub file_type: FileType,
    pub name: String,
    pub size: usize,
}

/// What [`JobFileSystem::create_directory`] creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryKind {
    /// A profile's job listing.
    Filter(JobQueryParams),
    Job(Job),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    pub create: bool,
    pub overwrite: bool,
}

#[derive(Debug, Default)]
struct FilterEntry {
    filter: JobQueryParams,
    jobs: BTreeMap<String, JobEntry>,
}

#[derive(Debug)]
struct JobEntry {
    job: Job,
    spools: BTreeMap<String, SpoolEntry>,
}

#[derive(Debug)]
struct SpoolEntry {
    spool: SpoolFile,
    data: Bytes,
    encoding: Option<SpoolEncoding>,
    was_accessed: bool,
}

impl SpoolEntry {
    fn new(spool: SpoolFile) -> Self {
        Self {
            spool,
            data: Bytes::new(),
            encoding: None,
            was_accessed: false,
        }
    }
}

/// Parsed `/{profile}/{jobid}/{spool}` path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobPath<'a> {
    Root,
    Filter(&'a str),
    Job(&'a str, &'a str),
    Spool(&'a str, &'a str, &'a str),
}

impl<'a> JobPath<'a> {
    fn parse(path: &'a str) -> FsResult<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Ok(JobPath::Root),
            [profile] => Ok(JobPath::Filter(profile)),
            [profile, jobid] => Ok(JobPath::Job(profile, jobid)),
            [profile, jobid, spool] => Ok(JobPath::Spool(profile, jobid, spool)),
            _ => Err(FsError::FileNotFound(path.to_string())),
        }
    }

    fn profile(&self) -> Option<&'a str> {
        match *self {
            JobPath::Root => None,
            JobPath::Filter(p) | JobPath::Job(p, _) | JobPath::Spool(p, _, _) => Some(p),
        }
    }
}

fn parent_path(path: &str) -> String {
    match JobPath::parse(path) {
        Ok(JobPath::Job(profile, _)) => format!("/{profile}/"),
        Ok(JobPath::Spool(profile, jobid, _)) => format!("/{profile}/{jobid}"),
        _ => "/".to_string(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory cache of filters, jobs and spool content, backed by the JES APIs
/// of [`ApiRegistry`]. Locks are never held across an await.
pub struct JobFileSystem {
    registry: Arc<ApiRegistry>,
    filters: Mutex<BTreeMap<String, FilterEntry>>,
    subscribers: Mutex<Vec<Sender<FileChange>>>,
}

impl JobFileSystem {
    pub fn new(registry: Arc<ApiRegistry>) -> Self {
        Self {
            registry,
            filters: Mutex::new(BTreeMap::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> Receiver<FileChange> {
        let (tx, rx) = mpsc::channel();
        lock(&self.subscribers).push(tx);
        rx
    }

    fn fire(&self, changes: &[FileChange]) {
        lock(&self.subscribers).retain(|tx| changes.iter().all(|c| tx.send(c.clone()).is_ok()));
    }

    fn api(&self, profile: &str) -> FsResult<Arc<dyn JesApi>> {
        Ok(self.registry.api(profile)?)
    }

    pub fn stat(&self, path: &str) -> FsResult<FileStat> {
        let filters = lock(&self.filters);
        let not_found = || FsError::FileNotFound(path.to_string());
        match JobPath::parse(path)? {
            JobPath::Root => Ok(FileStat {
                file_type: FileType::Directory,
                name: "/".to_string(),
                size: 0,
            }),
            JobPath::Filter(profile) => {
                filters.get(profile).ok_or_else(not_found)?;
                Ok(FileStat {
                    file_type: FileType::Directory,
                    name: profile.to_string(),
                    size: 0,
                })
            }
            JobPath::Job(profile, jobid) => {
                filters
                    .get(profile)
                    .and_then(|f| f.jobs.get(jobid))
                    .ok_or_else(not_found)?;
                Ok(FileStat {
                    file_type: FileType::Directory,
                    name: jobid.to_string(),
                    size: 0,
                })
            }
            JobPath::Spool(profile, jobid, name) => {
                let spool = filters
                    .get(profile)
                    .and_then(|f| f.jobs.get(jobid))
                    .and_then(|j| j.spools.get(name))
                    .ok_or_else(not_found)?;
                Ok(FileStat {
                    file_type: FileType::File,
                    name: name.to_string(),
                    size: spool.data.len(),
                })
            }
        }
    }

    /// Lists a directory, loading jobs or spool files from JES first.
    /// Entries already cached are kept.
    pub async fn read_directory(&self, path: &str) -> FsResult<Vec<(String, FileType)>> {
        explorer_trace!("read_directory {}", path);
        match JobPath::parse(path)? {
            JobPath::Root => {
                let names: Vec<(String, FileType)> = lock(&self.filters)
                    .keys()
                    .map(|name| (name.clone(), FileType::Directory))
                    .collect();
                Ok(names)
            }
            JobPath::Filter(profile) => {
                let params = lock(&self.filters)
                    .get(profile)
                    .map(|f| f.filter.clone())
                    .ok_or_else(|| FsError::FileNotFound(path.to_string()))?;
                let jobs = self
                    .api(profile)?
                    .get_jobs_by_parameters(&JobQueryParams {
                        owner: params.owner.or_else(|| Some("*".to_string())),
                        prefix: params.prefix.or_else(|| Some("*".to_string())),
                        status: params.status,
                    })
                    .await?;

                let mut filters = lock(&self.filters);
                let entry = filters
                    .get_mut(profile)
                    .ok_or_else(|| FsError::FileNotFound(path.to_string()))?;
                for job in jobs {
                    entry.jobs.entry(job.jobid.clone()).or_insert_with(|| JobEntry {
                        job,
                        spools: BTreeMap::new(),
                    });
                }
                Ok(entry
                    .jobs
                    .keys()
                    .map(|jobid| (jobid.clone(), FileType::Directory))
                    .collect())
            }
            JobPath::Job(profile, jobid) => {
                let job = self.job(path, profile, jobid)?;
                let spools = self
                    .api(profile)?
                    .get_spool_files(&job.jobname, &job.jobid)
                    .await?;

                let mut filters = lock(&self.filters);
                let entry = filters
                    .get_mut(profile)
                    .and_then(|f| f.jobs.get_mut(jobid))
                    .ok_or_else(|| FsError::FileNotFound(path.to_string()))?;
                for spool in spools {
                    entry
                        .spools
                        .entry(spool.unique_name())
                        .or_insert_with(|| SpoolEntry::new(spool));
                }
                Ok(entry
                    .spools
                    .keys()
                    .map(|name| (name.clone(), FileType::File))
                    .collect())
            }
            JobPath::Spool(..) => Err(FsError::FileNotADirectory(path.to_string())),
        }
    }

    fn job(&self, path: &str, profile: &str, jobid: &str) -> FsResult<Job> {
        lock(&self.filters)
            .get(profile)
            .and_then(|f| f.jobs.get(jobid))
            .map(|j| j.job.clone())
            .ok_or_else(|| FsError::FileNotFound(path.to_string()))
    }

    /// Replaces the job filter of a profile directory.
    pub fn update_filter_for_uri(&self, path: &str, filter: JobQueryParams) -> FsResult<()> {
        let JobPath::Filter(profile) = JobPath::parse(path)? else {
            return Err(FsError::FileNotADirectory(path.to_string()));
        };
        let mut filters = lock(&self.filters);
        let entry = filters
            .get_mut(profile)
            .ok_or_else(|| FsError::FileNotFound(path.to_string()))?;
        explorer_debug!("Filter of {} is now {:?}", path, filter);
        entry.filter = filter;
        Ok(())
    }

    /// Creates a profile or job directory; existing entries are left untouched.
    pub fn create_directory(&self, path: &str, kind: DirectoryKind) -> FsResult<()> {
        let parsed = JobPath::parse(path)?;
        {
            let mut filters = lock(&self.filters);
            match (parsed, kind) {
                (JobPath::Filter(profile), DirectoryKind::Filter(filter)) => {
                    if filters.contains_key(profile) {
                        return Ok(());
                    }
                    filters.insert(
                        profile.to_string(),
                        FilterEntry {
                            filter,
                            jobs: BTreeMap::new(),
                        },
                    );
                }
                (JobPath::Job(profile, jobid), DirectoryKind::Job(job)) => {
                    let entry = filters
                        .get_mut(profile)
                        .ok_or_else(|| FsError::FileNotFound(parent_path(path)))?;
                    if entry.jobs.contains_key(jobid) {
                        return Ok(());
                    }
                    entry.jobs.insert(
                        jobid.to_string(),
                        JobEntry {
                            job,
                            spools: BTreeMap::new(),
                        },
                    );
                }
                _ => return Err(FsError::FileNotADirectory(path.to_string())),
            }
        }
        self.fire(&[
            FileChange::Changed(parent_path(path)),
            FileChange::Created(path.to_string()),
        ]);
        Ok(())
    }

    /// Downloads spool content into the cache, honouring the spool's encoding.
    ///
    /// APIs without single-spool download fall back to content by id.
    pub async fn fetch_spool_at_uri(&self, path: &str) -> FsResult<Bytes> {
        let JobPath::Spool(profile, jobid, name) = JobPath::parse(path)? else {
            return Err(FsError::FileIsADirectory(path.to_string()));
        };
        let (job, spool, encoding) = {
            let filters = lock(&self.filters);
            let job = filters
                .get(profile)
                .and_then(|f| f.jobs.get(jobid))
                .ok_or_else(|| FsError::FileNotFound(path.to_string()))?;
            let spool = job
                .spools
                .get(name)
                .ok_or_else(|| FsError::FileNotFound(path.to_string()))?;
            (job.job.clone(), spool.spool.clone(), spool.encoding.clone())
        };

        let api = self.api(profile)?;
        let options = SpoolDownload {
            binary: matches!(encoding, Some(SpoolEncoding::Binary)),
            encoding: match &encoding {
                Some(SpoolEncoding::Other { codepage }) => Some(codepage.clone()),
                _ => None,
            },
        };
        let data = match api.download_single_spool(&spool, &options).await {
            Ok(bytes) => bytes,
            Err(err) if err.is_unsupported() => {
                explorer_debug!("Falling back to spool content by id for {}", path);
                let text = api
                    .get_spool_content_by_id(&job.jobname, &job.jobid, spool.id.unwrap_or_default())
                    .await?;
                Bytes::from(text)
            }
            Err(err) => return Err(err.into()),
        };

        {
            let mut filters = lock(&self.filters);
            let entry = filters
                .get_mut(profile)
                .and_then(|f| f.jobs.get_mut(jobid))
                .and_then(|j| j.spools.get_mut(name))
                .ok_or_else(|| FsError::FileNotFound(path.to_string()))?;
            entry.data = data.clone();
        }
        self.fire(&[FileChange::Changed(path.to_string())]);
        Ok(data)
    }

    /// Spool content, fetched on first access.
    pub async fn read_file(&self, path: &str) -> FsResult<Bytes> {
        let JobPath::Spool(profile, jobid, name) = JobPath::parse(path)? else {
            return Err(FsError::FileIsADirectory(path.to_string()));
        };
        let cached = {
            let filters = lock(&self.filters);
            let entry = filters
                .get(profile)
                .and_then(|f| f.jobs.get(jobid))
                .and_then(|j| j.spools.get(name))
                .ok_or_else(|| FsError::FileNotFound(path.to_string()))?;
            entry.was_accessed.then(|| entry.data.clone())
        };
        if let Some(data) = cached {
            return Ok(data);
        }

        let data = self.fetch_spool_at_uri(path).await?;
        if let Some(entry) = lock(&self.filters)
            .get_mut(profile)
            .and_then(|f| f.jobs.get_mut(jobid))
            .and_then(|j| j.spools.get_mut(name))
        {
            entry.was_accessed = true;
        }
        Ok(data)
    }

    /// Stores spool content locally; JES output is never written back.
    pub fn write_file(
        &self,
        path: &str,
        spool: SpoolFile,
        content: Bytes,
        options: WriteOptions,
    ) -> FsResult<()> {
        let (profile, jobid, name) = match JobPath::parse(path)? {
            JobPath::Spool(profile, jobid, name) => (profile, jobid, name),
            _ => return Err(FsError::FileIsADirectory(path.to_string())),
        };
        let change = {
            let mut filters = lock(&self.filters);
            let job = filters
                .get_mut(profile)
                .and_then(|f| f.jobs.get_mut(jobid))
                .ok_or_else(|| FsError::FileNotFound(parent_path(path)))?;
            match job.spools.get_mut(name) {
                None if !options.create => {
                    return Err(FsError::FileNotFound(path.to_string()));
                }
                None => {
                    let mut entry = SpoolEntry::new(spool);
                    entry.data = content;
                    job.spools.insert(name.to_string(), entry);
                    FileChange::Created(path.to_string())
                }
                Some(_) if options.create && !options.overwrite => {
                    return Err(FsError::FileExists(path.to_string()));
                }
                Some(entry) => {
                    entry.data = content;
                    FileChange::Changed(path.to_string())
                }
            }
        };
        self.fire(&[change]);
        Ok(())
    }

    /// Deletes a job on JES and drops it from the cache.
    pub async fn delete(&self, path: &str) -> FsResult<()> {
        let JobPath::Job(profile, jobid) = JobPath::parse(path)? else {
            return Err(FsError::Unsupported(DELETE_UNSUPPORTED));
        };
        let job = self.job(path, profile, jobid)?;
        self.api(profile)?
            .delete_job(&job.jobname, &job.jobid)
            .await?;
        if let Some(filter) = lock(&self.filters).get_mut(profile) {
            filter.jobs.remove(jobid);
        }
        self.fire(&[
            FileChange::Changed(parent_path(path)),
            FileChange::Deleted(path.to_string()),
        ]);
        Ok(())
    }

    pub fn rename(&self, _from: &str, _to: &str) -> FsResult<()> {
        Err(FsError::Unsupported(RENAME_UNSUPPORTED))
    }

    /// Sets the download encoding of a spool file; the next read fetches again.
    pub fn set_encoding(&self, path: &str, encoding: SpoolEncoding) -> FsResult<()> {
        let JobPath::Spool(profile, jobid, name) = JobPath::parse(path)? else {
            return Err(FsError::FileIsADirectory(path.to_string()));
        };
        let mut filters = lock(&self.filters);
        let entry = filters
            .get_mut(profile)
            .and_then(|f| f.jobs.get_mut(jobid))
            .and_then(|j| j.spools.get_mut(name))
            .ok_or_else(|| FsError::FileNotFound(path.to_string()))?;
        entry.encoding = Some(encoding);
        entry.was_accessed = false;
        Ok(())
    }

    /// Drops a whole profile directory, e.g. when its session is removed.
    pub fn remove_profile(&self, profile: &str) {
        if lock(&self.filters).remove(profile).is_some() {
            self.fire(&[FileChange::Deleted(format!("/{profile}/"))]);
        }
    }

    pub fn profile_of(path: &str) -> Option<String> {
        JobPath::parse(path).ok()?.profile().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_parse_by_depth() {
        assert_eq!(JobPath::parse("/").unwrap(), JobPath::Root);
        assert_eq!(JobPath::parse("/sestest/").unwrap(), JobPath::Filter("sestest"));
        assert_eq!(
            JobPath::parse("/sestest/JOB1/STEP.SYSOUT.3").unwrap(),
            JobPath::Spool("sestest", "JOB1", "STEP.SYSOUT.3")
        );
        assert!(JobPath::parse("/a/b/c/d").is_err());
    }

    #[test]
    fn parent_of_job_is_profile_directory() {
        assert_eq!(parent_path("/sestest/JOB1"), "/sestest/");
        assert_eq!(parent_path("/sestest/JOB1/JES2.JESMSGLG.2"), "/sestest/JOB1");
        assert_eq!(parent_path("/sestest/"), "/");
        assert_eq!(JobFileSystem::profile_of("/sestest/JOB1"), Some("sestest".into()));
    }
}
