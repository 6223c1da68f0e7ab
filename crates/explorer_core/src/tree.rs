use std::collections::{BTreeMap, HashSet};

use explorer_logging::{explorer_debug, explorer_trace};
use thiserror::Error;

use crate::{
    Collapsible, Job, JobData, Node, NodeId, NodeKind, NodeSort, SessionData, SpoolData,
    SpoolFile, TreeHistory,
};

pub const FAVORITES_LABEL: &str = "Favorites";
pub const SEARCH_PLACEHOLDER: &str = "Use the search button to display jobs";
pub const NO_JOBS_FOUND: &str = "No jobs found";
pub const NO_SPOOL_FILES: &str = "There are no JES spool messages to display";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("unknown tree node {0}")]
    UnknownNode(NodeId),
    #[error("node {node} cannot be used here: expected {expected}")]
    UnexpectedKind { node: NodeId, expected: &'static str },
}

pub type TreeResult<T> = Result<T, TreeError>;

/// Knobs of the tree that come from user settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSettings {
    pub max_search_history: usize,
    pub default_poll_interval_ms: u64,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            max_search_history: crate::history::MAX_SEARCH_HISTORY,
            default_poll_interval_ms: 5_000,
        }
    }
}

/// The whole jobs tree: sessions, their jobs and spool files, and favorites.
///
/// Nodes are stored in an arena keyed by [`NodeId`]; relations are ids, so no
/// node owns another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTree {
    nodes: BTreeMap<NodeId, Node>,
    next_id: NodeId,
    favorites_root: NodeId,
    sessions: Vec<NodeId>,
    favorites: Vec<NodeId>,
    history: TreeHistory,
    settings: TreeSettings,
    dirty: bool,
}

impl Default for JobTree {
    fn default() -> Self {
        Self::new(TreeSettings::default())
    }
}

impl JobTree {
    pub fn new(settings: TreeSettings) -> Self {
        let mut tree = Self {
            nodes: BTreeMap::new(),
            next_id: 1,
            favorites_root: 0,
            sessions: Vec::new(),
            favorites: Vec::new(),
            history: TreeHistory::new(settings.max_search_history),
            settings,
            dirty: false,
        };
        let root = tree.insert_node(
            None,
            FAVORITES_LABEL,
            NodeKind::FavoritesRoot,
            Collapsible::Collapsed,
        );
        tree.favorites_root = root;
        tree.sessions.push(root);
        tree
    }

    pub fn settings(&self) -> &TreeSettings {
        &self.settings
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn get(&self, id: NodeId) -> TreeResult<&Node> {
        self.nodes.get(&id).ok_or(TreeError::UnknownNode(id))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> TreeResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(TreeError::UnknownNode(id))
    }

    /// Spool nodes shown for the virtual file `path`, live and favorited alike.
    pub(crate) fn spools_at(&self, path: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(id, node)| {
                node.spool().is_some() && self.resource_path(**id).as_deref() == Some(path)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn favorites_root(&self) -> NodeId {
        self.favorites_root
    }

    /// Top-level nodes: the favorites root followed by one node per session.
    pub fn sessions(&self) -> &[NodeId] {
        &self.sessions
    }

    /// Favorite profile groups.
    pub fn favorites(&self) -> &[NodeId] {
        &self.favorites
    }

    pub(crate) fn favorites_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.favorites
    }

    pub fn history(&self) -> &TreeHistory {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut TreeHistory {
        &mut self.history
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// Walks up to the top-level node that owns `id`.
    pub fn session_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    pub fn find_session(&self, profile: &str) -> Option<NodeId> {
        self.sessions.iter().copied().find(|id| {
            self.nodes.get(id).is_some_and(|node| {
                node.is_session() && node.profile_name() == Some(profile.trim())
            })
        })
    }

    /// Returns `true` when the tree changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn insert_node(
        &mut self,
        parent: Option<NodeId>,
        label: &str,
        kind: NodeKind,
        collapsible: Collapsible,
    ) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        let dirty = !matches!(kind, NodeKind::Spool(_) | NodeKind::Information);
        self.nodes.insert(
            id,
            Node {
                id,
                label: label.to_string(),
                description: None,
                tooltip: Some(label.to_string()),
                parent,
                children: Vec::new(),
                collapsible,
                dirty,
                kind,
            },
        );
        id
    }

    /// Drops `id` and everything below it from the arena, including nodes only
    /// reachable through a local filter snapshot.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        let mut below: Vec<NodeId> = node.children.clone();
        if let Some(snapshot) = node
            .session_data()
            .and_then(|data| data.local_filter.snapshot.clone())
        {
            below.extend(snapshot);
        }
        if let NodeKind::FavoriteProfile(data) = &node.kind {
            if let crate::ProfileResolution::Unauthenticated { placeholder } = data.resolution {
                below.push(placeholder);
            }
        }
        for child in below {
            self.remove_subtree(child);
        }
    }

    /// Replaces all children of `parent` with a single message leaf.
    pub(crate) fn set_information_child(&mut self, parent: NodeId, message: &str) -> NodeId {
        let existing = self.children(parent).to_vec();
        if let [only] = existing.as_slice() {
            if let Some(node) = self.nodes.get(only) {
                if matches!(node.kind, NodeKind::Information) && node.label == message {
                    return *only;
                }
            }
        }
        for child in existing {
            self.remove_subtree(child);
        }
        let info = self.insert_node(
            Some(parent),
            message,
            NodeKind::Information,
            Collapsible::None,
        );
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children = vec![info];
        }
        self.mark_dirty();
        info
    }

    /// Adds a session for `profile`; `None` when one already exists.
    pub fn add_session(&mut self, profile: &str, user: Option<String>) -> Option<NodeId> {
        explorer_trace!("JobTree::add_session called for {}", profile);
        if self.find_session(profile).is_some() {
            return None;
        }
        let id = self.insert_node(
            None,
            profile,
            NodeKind::Session(SessionData::new(profile, user)),
            Collapsible::Collapsed,
        );
        self.sessions.push(id);
        self.history.add_session(profile);
        self.mark_dirty();
        Some(id)
    }

    pub fn delete_session(&mut self, id: NodeId) -> bool {
        let Some(profile) = self
            .nodes
            .get(&id)
            .filter(|node| node.is_session())
            .and_then(|node| node.profile_name().map(str::to_string))
        else {
            return false;
        };
        self.sessions.retain(|s| *s != id);
        self.remove_subtree(id);
        self.history.remove_session(&profile);
        self.mark_dirty();
        true
    }

    /// Reconciles the job children of a session or favorited search with a fresh listing.
    ///
    /// Existing nodes are matched by `JOBNAME(JOBID)` and relabeled in place, so
    /// their ids (and any UI selection) survive the refresh.
    pub fn apply_jobs(&mut self, id: NodeId, jobs: Vec<Job>) -> TreeResult<&[NodeId]> {
        let (profile, sort) = {
            let node = self.get(id)?;
            let data = node.session_data().ok_or(TreeError::UnexpectedKind {
                node: id,
                expected: "session or favorited search",
            })?;
            (data.profile.clone(), data.sort)
        };
        self.reset_local_filter(id);

        let mut seen = HashSet::new();
        let jobs: Vec<Job> = jobs
            .into_iter()
            .filter(|job| seen.insert(job.jobid.clone()))
            .collect();
        explorer_debug!("Applying {} jobs to node {}", jobs.len(), id);

        if jobs.is_empty() {
            self.set_information_child(id, NO_JOBS_FOUND);
            return Ok(self.children(id));
        }

        let existing = self.children(id).to_vec();
        let mut claimed = HashSet::new();
        let mut kept = Vec::with_capacity(jobs.len());
        for job in jobs {
            let label = job.tree_label();
            let prefix = job.display_name();
            let matched = existing.iter().copied().find(|child| {
                !claimed.contains(child)
                    && self.nodes.get(child).is_some_and(|node| {
                        matches!(node.kind, NodeKind::Job(_)) && node.label.starts_with(&prefix)
                    })
            });
            let child = match matched {
                Some(child) => {
                    if let Some(node) = self.nodes.get_mut(&child) {
                        node.label = label.clone();
                        node.tooltip = Some(label);
                        if let NodeKind::Job(data) = &mut node.kind {
                            data.job = job;
                        }
                    }
                    child
                }
                None => self.insert_node(
                    Some(id),
                    &label,
                    NodeKind::Job(JobData {
                        profile: profile.clone(),
                        job,
                    }),
                    Collapsible::Collapsed,
                ),
            };
            claimed.insert(child);
            kept.push(child);
        }

        for stale in existing.into_iter().filter(|c| !claimed.contains(c)) {
            self.remove_subtree(stale);
        }
        self.sort_ids(&mut kept, &sort);
        let node = self.get_mut(id)?;
        node.children = kept;
        node.dirty = false;
        self.mark_dirty();
        Ok(self.children(id))
    }

    /// Reconciles the spool children of a job with a fresh listing.
    ///
    /// Spool nodes are matched by step name, dd name and proc step; the same dd
    /// name may legitimately appear under several steps.
    pub fn apply_spools(&mut self, id: NodeId, spools: Vec<SpoolFile>) -> TreeResult<&[NodeId]> {
        let (profile, job) = match &self.get(id)?.kind {
            NodeKind::Job(data) | NodeKind::FavoriteJob(data) => {
                (data.profile.clone(), data.job.clone())
            }
            _ => {
                return Err(TreeError::UnexpectedKind {
                    node: id,
                    expected: "job",
                })
            }
        };

        let spools: Vec<SpoolFile> = spools
            .into_iter()
            .filter(SpoolFile::is_well_formed)
            .collect();
        explorer_debug!("Applying {} spool files to node {}", spools.len(), id);
        if spools.is_empty() {
            self.set_information_child(id, NO_SPOOL_FILES);
            return Ok(self.children(id));
        }

        let existing = self.children(id).to_vec();
        let mut claimed = HashSet::new();
        let mut kept = Vec::with_capacity(spools.len());
        for spool in spools {
            let label = spool.tree_label();
            let key = spool.key();
            let matched = existing.iter().copied().find(|child| {
                !claimed.contains(child)
                    && self
                        .nodes
                        .get(child)
                        .and_then(Node::spool)
                        .is_some_and(|data| data.spool.key() == key)
            });
            let child = match matched {
                Some(child) => {
                    if let Some(node) = self.nodes.get_mut(&child) {
                        node.label = label.clone();
                        node.tooltip = Some(label);
                        if let NodeKind::Spool(data) = &mut node.kind {
                            data.unique_name = spool.unique_name();
                            data.spool = spool;
                        }
                    }
                    child
                }
                None => {
                    let path = format!("/{}/{}/{}", profile, job.jobid, spool.unique_name());
                    let polling = self.path_polled(&path);
                    self.insert_node(
                        Some(id),
                        &label,
                        NodeKind::Spool(SpoolData {
                            profile: profile.clone(),
                            job: job.clone(),
                            unique_name: spool.unique_name(),
                            spool,
                            encoding: None,
                            polling,
                        }),
                        Collapsible::None,
                    )
                }
            };
            claimed.insert(child);
            kept.push(child);
        }

        for stale in existing.into_iter().filter(|c| !claimed.contains(c)) {
            self.remove_subtree(stale);
        }
        let node = self.get_mut(id)?;
        node.children = kept;
        node.dirty = false;
        self.mark_dirty();
        Ok(self.children(id))
    }

    fn sort_ids(&self, ids: &mut [NodeId], sort: &NodeSort) {
        ids.sort_by(|a, b| {
            match (
                self.nodes.get(a).and_then(Node::job),
                self.nodes.get(b).and_then(Node::job),
            ) {
                (Some(x), Some(y)) => sort.compare(x, y),
                _ => std::cmp::Ordering::Equal,
            }
        });
    }

    /// Changes a session's sort and reorders its current children in place.
    pub fn set_sort(&mut self, id: NodeId, sort: NodeSort) -> TreeResult<()> {
        let node = self.get_mut(id)?;
        let data = node.session_data_mut().ok_or(TreeError::UnexpectedKind {
            node: id,
            expected: "session or favorited search",
        })?;
        data.sort = sort;
        let mut children = node.children.clone();
        self.sort_ids(&mut children, &sort);
        self.get_mut(id)?.children = children;
        self.mark_dirty();
        Ok(())
    }

    /// Removes a job node from whatever lists it, without touching favorites.
    pub(crate) fn detach_job(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Some(node) = self.nodes.get_mut(&parent) {
                node.children.retain(|c| *c != id);
                if let Some(snapshot) = node
                    .session_data_mut()
                    .and_then(|data| data.local_filter.snapshot.as_mut())
                {
                    snapshot.retain(|c| *c != id);
                }
            }
        }
        self.remove_subtree(id);
        self.mark_dirty();
    }

    /// Virtual file system path of a node: `/{profile}/`, `/{profile}/{jobid}` or
    /// `/{profile}/{jobid}/{spool}`.
    pub fn resource_path(&self, id: NodeId) -> Option<String> {
        let node = self.nodes.get(&id)?;
        match &node.kind {
            NodeKind::Session(data) | NodeKind::FavoriteSearch(data) => {
                Some(format!("/{}/", data.profile))
            }
            NodeKind::FavoriteProfile(data) => Some(format!("/{}/", data.profile)),
            NodeKind::Job(data) | NodeKind::FavoriteJob(data) => {
                Some(format!("/{}/{}", data.profile, data.job.jobid))
            }
            NodeKind::Spool(data) => Some(format!(
                "/{}/{}/{}",
                data.profile, data.job.jobid, data.unique_name
            )),
            NodeKind::FavoritesRoot | NodeKind::Information => None,
        }
    }

    /// Text copied to the clipboard for a node.
    pub fn copy_name(&self, id: NodeId) -> Option<String> {
        let node = self.nodes.get(&id)?;
        match &node.kind {
            NodeKind::Job(data) | NodeKind::FavoriteJob(data) => Some(data.job.display_name()),
            _ => Some(node.label.clone()),
        }
    }

    /// Finds a job child of `parent` by job id.
    pub fn find_job(&self, parent: NodeId, jobid: &str) -> Option<NodeId> {
        self.children(parent).iter().copied().find(|child| {
            self.nodes
                .get(child)
                .and_then(Node::job)
                .is_some_and(|job| job.jobid == jobid)
        })
    }

    /// Nodes to display under `id`; differs from [`JobTree::children`] only for
    /// favorite groups whose profile could not be authenticated.
    pub fn visible_children(&self, id: NodeId) -> Vec<NodeId> {
        if id == self.favorites_root {
            return self.favorites.clone();
        }
        if let Some(Node {
            kind: NodeKind::FavoriteProfile(data),
            ..
        }) = self.nodes.get(&id)
        {
            if let crate::ProfileResolution::Unauthenticated { placeholder } = data.resolution {
                return vec![placeholder];
            }
        }
        self.children(id).to_vec()
    }
}
