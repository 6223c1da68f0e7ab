use std::collections::{BTreeSet, VecDeque};
use std::mem;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use explorer_core::{
    parse_job_search_query, search_menu, update, validate_job_string, validate_poll_interval,
    EditorStep, Effect, Job, JobProperty, JobQueryEditor, JobSearchCriteria, JobTree,
    JobTreeView, Msg, Node, NodeId, NodeKind, NodeSort, PickerItem, SearchMenuChoice,
    SpoolEncoding, SpoolFile, TreeError, TreeItemView, JOB_STATUS_OPTIONS,
};
use explorer_logging::{explorer_debug, explorer_error, explorer_info, explorer_trace, explorer_warn};

use crate::bulk::{self, BulkReport, SelectedJob, ALREADY_CANCELLED};
use crate::{
    decode_spool, ApiRegistry, DecodedSpool, DirectoryKind, ExplorerError, ExplorerResult,
    ExplorerSettings, FsError, JesError, JobFileSystem, JobQueryParams, Poller, Prompter,
    TreeStateStore, WriteOptions,
};

pub const POLL_INTERVAL_PROMPT: &str = "Determine the interval (in ms) to refresh the spool file";
const CONSOLE_UNSUPPORTED: &str = "Console commands are not supported by this profile's API.";

/// Sent to subscribers whenever part of the tree should be re-rendered;
/// `None` means everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEvent {
    Changed(Option<NodeId>),
}

/// Drives the job tree: feeds messages to [`update`] and carries out the
/// resulting effects against JES, the job file system, the poller and the user.
pub struct JobTreeProvider {
    state: JobTree,
    registry: Arc<ApiRegistry>,
    fs: Arc<JobFileSystem>,
    poller: Poller,
    prompter: Arc<dyn Prompter>,
    store: Option<TreeStateStore>,
    subscribers: Vec<Sender<TreeEvent>>,
}

impl JobTreeProvider {
    pub fn new(
        settings: &ExplorerSettings,
        registry: Arc<ApiRegistry>,
        fs: Arc<JobFileSystem>,
        poller: Poller,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            state: JobTree::new(settings.tree_settings()),
            registry,
            fs,
            poller,
            prompter,
            store: None,
            subscribers: Vec::new(),
        }
    }

    /// Persists favorites and history through `store`.
    pub fn with_store(mut self, store: TreeStateStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn state(&self) -> &JobTree {
        &self.state
    }

    pub fn file_system(&self) -> &Arc<JobFileSystem> {
        &self.fs
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn subscribe(&mut self) -> Receiver<TreeEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Top-level rows; consumes the tree's change flag.
    pub fn view(&mut self) -> JobTreeView {
        self.state.view()
    }

    /// Applies `msg` and every message its effects produce, in order.
    pub async fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let (state, effects) = update(mem::take(&mut self.state), msg);
            self.state = state;
            for effect in effects {
                queue.extend(self.run_effect(effect).await);
            }
        }
    }

    async fn run_effect(&mut self, effect: Effect) -> Vec<Msg> {
        explorer_trace!("effect {:?}", effect);
        match effect {
            Effect::FetchJobs {
                node,
                profile,
                owner,
                prefix,
                status,
            } => {
                let params = JobQueryParams::new(&owner, &prefix, &status);
                self.mirror_filter(&profile, &params);
                let result = match self.registry.api(&profile) {
                    Ok(api) => api.get_jobs_by_parameters(&params).await,
                    Err(err) => Err(err),
                };
                match result {
                    Ok(jobs) => {
                        explorer_debug!("{} jobs listed for {}", jobs.len(), profile);
                        self.mirror_jobs(&profile, &jobs);
                        vec![Msg::JobsLoaded { node, jobs }]
                    }
                    Err(err) => vec![load_failed(node, &err)],
                }
            }
            Effect::FetchJob {
                node,
                profile,
                job_id,
            } => {
                let result = match self.registry.api(&profile) {
                    Ok(api) => api.get_job(&job_id).await,
                    Err(err) => Err(err),
                };
                match result {
                    Ok(job) => {
                        let jobs = vec![job];
                        self.mirror_jobs(&profile, &jobs);
                        vec![Msg::JobsLoaded { node, jobs }]
                    }
                    Err(JesError::NotFound(_)) => vec![Msg::JobsLoaded {
                        node,
                        jobs: Vec::new(),
                    }],
                    Err(err) => vec![load_failed(node, &err)],
                }
            }
            Effect::FetchSpools {
                node,
                profile,
                jobname,
                jobid,
            } => {
                let result = match self.registry.api(&profile) {
                    Ok(api) => api.get_spool_files(&jobname, &jobid).await,
                    Err(err) => Err(err),
                };
                match result {
                    Ok(spools) => {
                        let job = self
                            .state
                            .node(node)
                            .and_then(Node::job)
                            .cloned()
                            .unwrap_or_else(|| Job::new(jobname, jobid));
                        for spool in &spools {
                            if let Err(err) = self.mirror_spool(&profile, &job, spool) {
                                explorer_warn!("Cannot cache spool file: {}", err);
                            }
                        }
                        vec![Msg::SpoolsLoaded { node, spools }]
                    }
                    Err(err) => vec![load_failed(node, &err)],
                }
            }
            Effect::ResolveProfile { node, profile } => vec![self.registry.resolve(node, &profile)],
            Effect::EnsureSession { profile } => {
                if self.state.find_session(&profile).is_none() && self.registry.contains(&profile) {
                    vec![Msg::SessionAdded {
                        user: self.registry.user(&profile),
                        profile,
                    }]
                } else {
                    Vec::new()
                }
            }
            Effect::PersistFavorites(lines) => {
                if let Some(store) = &self.store {
                    if let Err(err) = store.save_favorites(lines) {
                        explorer_error!("Failed to persist favorites: {}", err);
                    }
                }
                Vec::new()
            }
            Effect::PersistHistory { searches, sessions } => {
                if let Some(store) = &self.store {
                    if let Err(err) = store.save_history(searches, sessions) {
                        explorer_error!("Failed to persist search history: {}", err);
                    }
                }
                Vec::new()
            }
            Effect::PromptPollInterval {
                node,
                default_interval_ms,
                ..
            } => {
                let default = default_interval_ms.to_string();
                let Some(text) = self.prompter.input(POLL_INTERVAL_PROMPT, Some(&default)) else {
                    return Vec::new();
                };
                match validate_poll_interval(&text) {
                    Ok(interval_ms) => vec![Msg::PollIntervalChosen { node, interval_ms }],
                    Err(message) => {
                        self.prompter.show_error(&message);
                        Vec::new()
                    }
                }
            }
            Effect::StartPolling {
                path, interval_ms, ..
            } => {
                self.start_polling(&path, Duration::from_millis(interval_ms));
                Vec::new()
            }
            Effect::StopPolling { path } => {
                self.poller.dispose(&path);
                Vec::new()
            }
            Effect::ConfirmRemoveFavoriteProfile { profile } => {
                let message = format!(
                    "This will remove all favorited Jobs items for profile {profile}. Continue?"
                );
                if self.prompter.confirm(&message, "Continue") {
                    vec![Msg::FavoriteProfileRemovalConfirmed { profile }]
                } else {
                    Vec::new()
                }
            }
            Effect::OfferRemoveMissingProfile { profile } => {
                let message = format!(
                    "You have job favorites that refer to a non-existent profile named: {profile}. \
                     Would you like to remove {profile} from the Favorites section now?"
                );
                if self.prompter.confirm(&message, "Remove") {
                    vec![Msg::FavoriteProfileRemoved {
                        profile,
                        user_selected: false,
                    }]
                } else {
                    Vec::new()
                }
            }
            Effect::ReportApiError {
                profile,
                context,
                error,
            } => {
                self.prompter.report_api_error(&profile, &context, &error);
                Vec::new()
            }
            Effect::ShowMessage(message) => {
                self.prompter.show_message(&message);
                Vec::new()
            }
            Effect::Refresh(node) => {
                self.subscribers
                    .retain(|tx| tx.send(TreeEvent::Changed(node)).is_ok());
                Vec::new()
            }
        }
    }

    fn mirror_filter(&self, profile: &str, params: &JobQueryParams) {
        let path = format!("/{profile}/");
        let created = self
            .fs
            .create_directory(&path, DirectoryKind::Filter(params.clone()))
            .and_then(|()| self.fs.update_filter_for_uri(&path, params.clone()));
        if let Err(err) = created {
            explorer_warn!("Cannot cache filter of {}: {}", profile, err);
        }
    }

    fn mirror_jobs(&self, profile: &str, jobs: &[Job]) {
        let dir = format!("/{profile}/");
        if let Err(err) = self
            .fs
            .create_directory(&dir, DirectoryKind::Filter(JobQueryParams::default()))
        {
            explorer_warn!("Cannot cache {}: {}", dir, err);
        }
        for job in jobs {
            let path = format!("/{profile}/{}", job.jobid);
            if let Err(err) = self.fs.create_directory(&path, DirectoryKind::Job(job.clone())) {
                explorer_warn!("Cannot cache job {}: {}", path, err);
            }
        }
    }

    fn mirror_spool(&self, profile: &str, job: &Job, spool: &SpoolFile) -> Result<String, FsError> {
        self.fs.create_directory(
            &format!("/{profile}/"),
            DirectoryKind::Filter(JobQueryParams::default()),
        )?;
        self.fs.create_directory(
            &format!("/{profile}/{}", job.jobid),
            DirectoryKind::Job(job.clone()),
        )?;
        let path = format!("/{profile}/{}/{}", job.jobid, spool.unique_name());
        let options = WriteOptions {
            create: true,
            overwrite: false,
        };
        match self.fs.write_file(&path, spool.clone(), Bytes::new(), options) {
            Ok(()) | Err(FsError::FileExists(_)) => Ok(path),
            Err(err) => Err(err),
        }
    }

    /// Makes sure the spool node `id` is backed by a file and returns its path.
    fn spool_path(&self, id: NodeId) -> ExplorerResult<String> {
        let node = self.state.node(id).ok_or(ExplorerError::UnknownNode(id))?;
        let data = node.spool().ok_or(TreeError::UnexpectedKind {
            node: id,
            expected: "spool file",
        })?;
        Ok(self.mirror_spool(&data.profile, &data.job, &data.spool)?)
    }

    fn start_polling(&self, path: &str, interval: Duration) {
        let fs = Arc::clone(&self.fs);
        let prompter = Arc::clone(&self.prompter);
        let polled = path.to_string();
        let added = self.poller.add_request(path, interval, move || {
            let fs = Arc::clone(&fs);
            let prompter = Arc::clone(&prompter);
            let path = polled.clone();
            async move {
                prompter.set_status(&format!("Polling: {path}..."));
                if let Err(err) = fs.fetch_spool_at_uri(&path).await {
                    explorer_warn!("Polling {} failed: {}", path, err);
                }
            }
        });
        if !added {
            explorer_debug!("{} is already polled", path);
        }
    }

    /// Children to display under `parent`, loading them when stale.
    pub async fn get_children(&mut self, parent: Option<NodeId>) -> Vec<NodeId> {
        match parent {
            None => self.state.sessions().to_vec(),
            Some(id) => {
                self.dispatch(Msg::Expand(id)).await;
                self.state.visible_children(id)
            }
        }
    }

    pub fn get_tree_item(&self, id: NodeId) -> ExplorerResult<TreeItemView> {
        self.state.tree_item(id).ok_or(ExplorerError::UnknownNode(id))
    }

    pub fn get_parent(&self, id: NodeId) -> Option<NodeId> {
        self.state.parent(id)
    }

    /// Adds a session for `profile`; profiles without a registered API are ignored.
    pub async fn add_session(&mut self, profile: &str) -> Option<NodeId> {
        if !self.registry.contains(profile) {
            explorer_warn!("No JES API registered for profile {}", profile);
            return None;
        }
        if let Some(existing) = self.state.find_session(profile) {
            return Some(existing);
        }
        self.dispatch(Msg::SessionAdded {
            profile: profile.to_string(),
            user: self.registry.user(profile),
        })
        .await;
        self.state.find_session(profile)
    }

    pub async fn delete_session(&mut self, node: NodeId) {
        let Some(profile) = self
            .state
            .node(node)
            .filter(|n| n.is_session())
            .and_then(Node::profile_name)
            .map(str::to_string)
        else {
            return;
        };
        self.dispatch(Msg::SessionRemoved { node }).await;
        self.fs.remove_profile(&profile);
    }

    /// Asks the user for a search and applies it to session `node`.
    pub async fn search_prompt(&mut self, node: NodeId) -> ExplorerResult<()> {
        let session = self.state.node(node).ok_or(ExplorerError::UnknownNode(node))?;
        let user = session
            .session_data()
            .ok_or(TreeError::UnexpectedKind {
                node,
                expected: "session",
            })?
            .user
            .clone();

        let menu = search_menu(self.state.history().searches());
        let items: Vec<PickerItem> = menu
            .iter()
            .map(|choice| PickerItem {
                label: choice.label().to_string(),
                description: None,
            })
            .collect();
        let Some(picked) = self.prompter.pick("Select a filter", &items) else {
            return Ok(());
        };
        let Some(choice) = menu.into_iter().find(|c| c.label() == picked) else {
            return Ok(());
        };

        let criteria = match choice {
            SearchMenuChoice::QuerySearch => self.edit_query(JobQueryEditor::new(), user.as_deref()),
            SearchMenuChoice::IdSearch => self.prompt_job_id(None),
            SearchMenuChoice::History(entry) => {
                let previous = parse_job_search_query(&entry);
                match previous.job_id.as_deref() {
                    Some(job_id) => self.prompt_job_id(Some(job_id)),
                    None => self.edit_query(JobQueryEditor::from_criteria(&previous), user.as_deref()),
                }
            }
        };
        if let Some(criteria) = criteria {
            explorer_info!("Searching {} with {}", node, criteria.label());
            self.dispatch(Msg::SearchSubmitted { node, criteria }).await;
        }
        Ok(())
    }

    fn prompt_job_id(&self, value: Option<&str>) -> Option<JobSearchCriteria> {
        let job_id = self.prompter.input("Enter a job ID", value)?;
        let job_id = job_id.trim();
        (!job_id.is_empty()).then(|| JobSearchCriteria::by_job_id(job_id))
    }

    fn edit_query(
        &self,
        mut editor: JobQueryEditor,
        user: Option<&str>,
    ) -> Option<JobSearchCriteria> {
        loop {
            let items = editor.items(user);
            let label = self.prompter.pick("Enter job search criteria", &items)?;
            match editor.select(&label, user) {
                EditorStep::Submit(criteria) => return Some(criteria),
                EditorStep::EditField(property) => {
                    let value = self
                        .prompter
                        .input(property.placeholder(), editor.value(property))?;
                    match validate_job_string(&value, property) {
                        Ok(()) => editor.set_value(property, Some(value.trim().to_string())),
                        Err(message) => self.prompter.show_error(&message),
                    }
                }
                EditorStep::ChooseStatus => {
                    let statuses: Vec<PickerItem> = JOB_STATUS_OPTIONS
                        .iter()
                        .map(|status| PickerItem {
                            label: status.to_string(),
                            description: None,
                        })
                        .collect();
                    if let Some(status) = self.prompter.pick("Select a job status", &statuses) {
                        editor.set_value(JobProperty::Status, Some(status));
                    }
                }
                EditorStep::Unchanged => {}
            }
        }
    }

    /// Marks `node` stale and reloads it, or every searched session when `None`.
    pub async fn refresh(&mut self, node: Option<NodeId>) {
        let targets = match node {
            Some(node) => vec![node],
            None => self
                .state
                .sessions()
                .iter()
                .copied()
                .filter(|id| {
                    self.state
                        .node(*id)
                        .and_then(Node::session_data)
                        .is_some_and(|data| data.filtered)
                })
                .collect(),
        };
        for target in targets {
            self.dispatch(Msg::Refresh(target)).await;
        }
    }

    pub async fn add_favorite(&mut self, node: NodeId) {
        self.dispatch(Msg::FavoriteAdded { node }).await;
    }

    pub async fn remove_favorite(&mut self, node: NodeId) {
        self.dispatch(Msg::FavoriteRemoved { node }).await;
    }

    pub async fn remove_favorite_profile(&mut self, profile: &str, user_selected: bool) {
        self.dispatch(Msg::FavoriteProfileRemoved {
            profile: profile.to_string(),
            user_selected,
        })
        .await;
    }

    pub async fn open_favorite_search(&mut self, node: NodeId) {
        self.dispatch(Msg::FavoriteSearchOpened { node }).await;
    }

    pub async fn sort_jobs(&mut self, node: NodeId, sort: NodeSort) {
        self.dispatch(Msg::SortChanged { node, sort }).await;
    }

    pub async fn filter_jobs(&mut self, node: NodeId, query: &str) {
        self.dispatch(Msg::LocalFilterChanged {
            node,
            query: query.to_string(),
        })
        .await;
    }

    pub async fn clear_filter(&mut self, node: NodeId) {
        self.dispatch(Msg::LocalFilterCleared { node }).await;
    }

    pub async fn remove_search_history(&mut self, entry: &str) {
        self.dispatch(Msg::SearchHistoryRemoved(entry.to_string()))
            .await;
    }

    pub async fn reset_search_history(&mut self) {
        self.dispatch(Msg::SearchHistoryReset).await;
    }

    /// Toggles polling of a spool file; starting asks for the interval.
    pub async fn poll_data(&mut self, node: NodeId) -> ExplorerResult<()> {
        self.spool_path(node)?;
        self.dispatch(Msg::PollToggled { node }).await;
        Ok(())
    }

    /// Starts polling with an interval typed by the user.
    pub async fn set_poll_interval(&mut self, node: NodeId, text: &str) -> ExplorerResult<()> {
        let interval_ms = validate_poll_interval(text).map_err(ExplorerError::InvalidPollInterval)?;
        self.spool_path(node)?;
        self.dispatch(Msg::PollIntervalChosen { node, interval_ms })
            .await;
        Ok(())
    }

    /// The next download of the spool file uses `encoding`.
    pub async fn set_spool_encoding(
        &mut self,
        node: NodeId,
        encoding: SpoolEncoding,
    ) -> ExplorerResult<()> {
        let path = self.spool_path(node)?;
        self.fs.set_encoding(&path, encoding.clone())?;
        self.dispatch(Msg::SpoolEncodingChanged { node, encoding })
            .await;
        Ok(())
    }

    /// Downloads (once) and decodes the content of a spool file.
    pub async fn open_spool(&mut self, node: NodeId) -> ExplorerResult<DecodedSpool> {
        let path = self.spool_path(node)?;
        let encoding = self
            .state
            .node(node)
            .and_then(Node::spool)
            .and_then(|s| s.encoding.clone());
        let bytes = self.fs.read_file(&path).await?;
        Ok(decode_spool(&bytes, None, encoding.as_ref())?)
    }

    fn selected_jobs(&self, nodes: &[NodeId]) -> ExplorerResult<Vec<SelectedJob>> {
        nodes
            .iter()
            .map(|id| -> ExplorerResult<SelectedJob> {
                let node = self.state.node(*id).ok_or(ExplorerError::UnknownNode(*id))?;
                match &node.kind {
                    NodeKind::Job(data) | NodeKind::FavoriteJob(data) => Ok(SelectedJob {
                        profile: data.profile.clone(),
                        job: data.job.clone(),
                    }),
                    _ => Err(TreeError::UnexpectedKind {
                        node: *id,
                        expected: "job",
                    }
                    .into()),
                }
            })
            .collect()
    }

    async fn refresh_profiles(&mut self, jobs: &[SelectedJob]) {
        let profiles: BTreeSet<&str> = jobs.iter().map(|s| s.profile.as_str()).collect();
        let sessions: Vec<NodeId> = profiles
            .into_iter()
            .filter_map(|profile| self.state.find_session(profile))
            .collect();
        for session in sessions {
            self.refresh(Some(session)).await;
        }
    }

    /// Cancels the selected jobs; jobs already cancelled or abended are skipped.
    pub async fn cancel_jobs(&mut self, nodes: &[NodeId]) -> ExplorerResult<BulkReport> {
        let selected = self.selected_jobs(nodes)?;
        if selected.is_empty() {
            return Ok(BulkReport::default());
        }
        if selected.iter().all(|s| s.job.is_cancelled_or_abended()) {
            self.prompter.show_message(ALREADY_CANCELLED);
            return Ok(BulkReport {
                skipped: selected.iter().map(|s| s.job.display_name()).collect(),
                ..BulkReport::default()
            });
        }

        let report = bulk::cancel_jobs(&self.registry, &selected).await;
        if !report.succeeded.is_empty() {
            self.prompter.show_message(&format!(
                "Cancelled the following jobs: {}",
                report.succeeded.join(", ")
            ));
        }
        if !report.failed.is_empty() {
            self.prompter.show_error(&format!(
                "One or more jobs failed to cancel: {}",
                report.failure_lines().join("; ")
            ));
        }
        self.refresh_profiles(&selected).await;
        Ok(report)
    }

    /// Deletes the selected jobs on JES after confirmation.
    pub async fn delete_jobs(&mut self, nodes: &[NodeId]) -> ExplorerResult<BulkReport> {
        let selected = self.selected_jobs(nodes)?;
        if selected.is_empty() {
            return Ok(BulkReport::default());
        }
        let names: Vec<String> = selected.iter().map(|s| s.job.display_name()).collect();
        let question = format!(
            "Are you sure you want to delete the following {} item(s)?\n{}",
            names.len(),
            names.join("\n")
        );
        if !self.prompter.confirm(&question, "Delete") {
            explorer_debug!("Delete of {} jobs cancelled by the user", names.len());
            return Ok(BulkReport::default());
        }

        let report = bulk::delete_jobs(&self.fs, &selected).await;
        for (node, name) in nodes.iter().zip(&names) {
            if report.succeeded.contains(name) {
                self.dispatch(Msg::JobDeleted { node: *node }).await;
            }
        }
        if !report.succeeded.is_empty() {
            self.prompter.show_message(&format!(
                "The following jobs were deleted: {}",
                report.succeeded.join(", ")
            ));
        }
        if !report.failed.is_empty() {
            self.prompter.show_error(&format!(
                "One or more jobs failed to delete: {}",
                report.failure_lines().join("; ")
            ));
        }
        Ok(report)
    }

    /// Sends `f JOBNAME,command` to the system console.
    pub async fn modify_command(&mut self, node: NodeId) -> ExplorerResult<Option<String>> {
        let selected = self.selected_jobs(&[node])?;
        let Some(job) = selected.first() else {
            return Ok(None);
        };
        let Some(command) = self.prompter.input("Enter a modify command", None) else {
            return Ok(None);
        };
        let command = command.trim();
        if command.is_empty() {
            return Ok(None);
        }
        self.console(job, &format!("f {},{}", job.job.jobname, command))
            .await
    }

    /// Sends `p JOBNAME` to the system console.
    pub async fn stop_command(&mut self, node: NodeId) -> ExplorerResult<Option<String>> {
        let selected = self.selected_jobs(&[node])?;
        let Some(job) = selected.first() else {
            return Ok(None);
        };
        self.console(job, &format!("p {}", job.job.jobname)).await
    }

    async fn console(&self, job: &SelectedJob, command: &str) -> ExplorerResult<Option<String>> {
        let api = self.registry.api(&job.profile)?;
        match api.issue_mvs_command(command).await {
            Ok(response) => {
                explorer_info!("Issued {:?} for {}", command, job.profile);
                self.prompter
                    .show_message(&format!("Command response: {}", response.trim()));
                Ok(Some(response))
            }
            Err(err) if err.is_unsupported() => {
                self.prompter.show_error(CONSOLE_UNSUPPORTED);
                Ok(None)
            }
            Err(err) => {
                self.prompter
                    .report_api_error(&job.profile, "Issuing a console command", &err.to_string());
                Err(err.into())
            }
        }
    }

    /// Shows a single job in the profile's session, adding the session if needed.
    pub async fn focus_on_job(&mut self, profile: &str, job_id: &str) -> ExplorerResult<Option<NodeId>> {
        let session = self
            .add_session(profile)
            .await
            .ok_or_else(|| ExplorerError::MissingProfile(profile.to_string()))?;
        self.dispatch(Msg::SearchSubmitted {
            node: session,
            criteria: JobSearchCriteria::by_job_id(job_id),
        })
        .await;
        Ok(self.state.find_job(session, &job_id.trim().to_uppercase()))
    }

    pub fn copy_name(&self, node: NodeId) -> Option<String> {
        self.state.copy_name(node)
    }

    /// Loads persisted history, sessions and favorites.
    pub async fn restore(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        let persisted = store.load();
        self.dispatch(Msg::HistoryRestored {
            searches: persisted.search_history,
            sessions: persisted.sessions.clone(),
        })
        .await;
        for profile in &persisted.sessions {
            self.add_session(profile).await;
        }
        self.dispatch(Msg::FavoritesRestored(persisted.favorites))
            .await;
    }

    /// Stops every polling task.
    pub fn shutdown(&self) {
        self.poller.dispose_all();
    }
}

fn load_failed(node: NodeId, err: &JesError) -> Msg {
    explorer_error!("JES request for node {} failed: {}", node, err);
    let error = match err {
        JesError::Auth { .. } => format!("{err}. Check the profile's user and password."),
        other => other.to_string(),
    };
    Msg::LoadFailed { node, error }
}
