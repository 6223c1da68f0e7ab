#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};

use bytes::Bytes;
use explorer_core::{Job, PickerItem, SpoolFile};
use explorer_engine::{
    ApiRegistry, ExplorerSettings, JesApi, JesError, JesResult, JobFileSystem, JobQueryParams,
    JobTreeProvider, Poller, Prompter, SpoolDownload,
};

pub const PROFILE: &str = "sestest";

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(explorer_logging::initialize_for_tests);
}

pub fn job(name: &str, id: &str, retcode: Option<&str>) -> Job {
    let mut job = Job::new(name, id);
    job.retcode = retcode.map(str::to_string);
    job.status = Some(if retcode.is_some() { "OUTPUT" } else { "ACTIVE" }.to_string());
    job
}

pub fn spool(job: &Job, step: &str, dd: &str, id: u32) -> SpoolFile {
    let mut spool = SpoolFile::new(step, dd, id);
    spool.jobname = Some(job.jobname.clone());
    spool.jobid = Some(job.jobid.clone());
    spool
}

/// In-memory JES with switchable optional capabilities.
#[derive(Default)]
pub struct FakeJes {
    pub jobs: Mutex<Vec<Job>>,
    pub spools: Mutex<HashMap<String, Vec<SpoolFile>>>,
    pub contents: Mutex<HashMap<u32, String>>,
    pub calls: Mutex<Vec<String>>,
    pub listing_error: Mutex<Option<JesError>>,
    pub supports_download: bool,
    pub supports_cancel: bool,
    pub supports_console: bool,
    pub cancel_result: bool,
}

impl FakeJes {
    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        Self {
            jobs: Mutex::new(jobs),
            supports_download: true,
            supports_cancel: true,
            supports_console: true,
            cancel_result: true,
            ..Self::default()
        }
    }

    pub fn add_spools(&self, jobid: &str, spools: Vec<SpoolFile>, content: &str) {
        let mut contents = self.contents.lock().unwrap();
        for spool in &spools {
            contents.insert(spool.id.unwrap(), content.to_string());
        }
        self.spools.lock().unwrap().insert(jobid.to_string(), spools);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl JesApi for FakeJes {
    async fn get_jobs_by_parameters(&self, params: &JobQueryParams) -> JesResult<Vec<Job>> {
        self.record(format!(
            "list owner={} prefix={} status={}",
            params.owner.as_deref().unwrap_or("-"),
            params.prefix.as_deref().unwrap_or("-"),
            params.status.as_deref().unwrap_or("-"),
        ));
        if let Some(err) = self.listing_error.lock().unwrap().clone() {
            return Err(err);
        }
        let prefix = params
            .prefix
            .as_deref()
            .unwrap_or("*")
            .trim_end_matches('*')
            .to_string();
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|job| job.jobname.starts_with(&prefix))
            .cloned()
            .collect())
    }

    async fn get_job(&self, job_id: &str) -> JesResult<Job> {
        self.record(format!("get {job_id}"));
        self.jobs
            .lock()
            .unwrap()
            .iter()
            .find(|job| job.jobid == job_id)
            .cloned()
            .ok_or_else(|| JesError::NotFound(job_id.to_string()))
    }

    async fn get_spool_files(&self, _jobname: &str, jobid: &str) -> JesResult<Vec<SpoolFile>> {
        self.record(format!("spools {jobid}"));
        Ok(self
            .spools
            .lock()
            .unwrap()
            .get(jobid)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_spool_content_by_id(
        &self,
        _jobname: &str,
        _jobid: &str,
        spool_id: u32,
    ) -> JesResult<String> {
        self.record(format!("content {spool_id}"));
        Ok(self
            .contents
            .lock()
            .unwrap()
            .get(&spool_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn download_single_spool(
        &self,
        spool: &SpoolFile,
        options: &SpoolDownload,
    ) -> JesResult<Bytes> {
        if !self.supports_download {
            return Err(JesError::Unsupported("downloading a single spool file"));
        }
        let id = spool.id.unwrap_or_default();
        self.record(format!(
            "download {id} binary={} encoding={}",
            options.binary,
            options.encoding.as_deref().unwrap_or("-")
        ));
        Ok(Bytes::from(
            self.contents
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .unwrap_or_default(),
        ))
    }

    async fn cancel_job(&self, job: &Job) -> JesResult<bool> {
        if !self.supports_cancel {
            return Err(JesError::Unsupported("cancel"));
        }
        self.record(format!("cancel {}", job.jobid));
        Ok(self.cancel_result)
    }

    async fn delete_job(&self, _jobname: &str, jobid: &str) -> JesResult<()> {
        self.record(format!("delete {jobid}"));
        self.jobs.lock().unwrap().retain(|job| job.jobid != jobid);
        Ok(())
    }

    async fn issue_mvs_command(&self, command: &str) -> JesResult<String> {
        if !self.supports_console {
            return Err(JesError::Unsupported("console commands"));
        }
        self.record(format!("command {command}"));
        Ok(format!("ISSUED {command}\n"))
    }
}

/// Answers prompts from scripted queues and records what was shown.
#[derive(Default)]
pub struct FakePrompter {
    pub picks: Mutex<VecDeque<String>>,
    pub inputs: Mutex<VecDeque<String>>,
    pub confirms: Mutex<VecDeque<bool>>,
    pub messages: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl FakePrompter {
    pub fn pick_next(&self, label: &str) {
        self.picks.lock().unwrap().push_back(label.to_string());
    }

    pub fn input_next(&self, value: &str) {
        self.inputs.lock().unwrap().push_back(value.to_string());
    }

    pub fn confirm_next(&self, answer: bool) {
        self.confirms.lock().unwrap().push_back(answer);
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Prompter for FakePrompter {
    fn pick(&self, _title: &str, items: &[PickerItem]) -> Option<String> {
        let label = self.picks.lock().unwrap().pop_front()?;
        items
            .iter()
            .any(|item| item.label == label)
            .then_some(label)
    }

    fn input(&self, _prompt: &str, _value: Option<&str>) -> Option<String> {
        self.inputs.lock().unwrap().pop_front()
    }

    fn confirm(&self, _message: &str, _action: &str) -> bool {
        self.confirms.lock().unwrap().pop_front().unwrap_or(false)
    }

    fn show_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

pub fn registry(api: Arc<FakeJes>) -> Arc<ApiRegistry> {
    let mut registry = ApiRegistry::new();
    registry.register(PROFILE, api, Some("zowe".to_string()), true);
    Arc::new(registry)
}

pub fn provider(api: Arc<FakeJes>, prompter: Arc<FakePrompter>) -> JobTreeProvider {
    let registry = registry(api);
    let fs = Arc::new(JobFileSystem::new(Arc::clone(&registry)));
    JobTreeProvider::new(
        &ExplorerSettings::default(),
        registry,
        fs,
        Poller::default(),
        prompter,
    )
}
