//! Favorites: per-profile groups of saved searches and jobs, persisted as
//! `[profile]: label{context}` lines.

use explorer_logging::{explorer_debug, explorer_warn};

use crate::{
    parse_job_search_query, Collapsible, Job, JobData, JobSearchCriteria, JobTree, Node, NodeId,
    NodeKind, ProfileResolution, SessionData, TreeError, TreeResult,
};

pub const AUTHENTICATE_FOR_FAVORITES: &str = "You must authenticate to view favorites.";

const JOB_CONTEXT: &str = "job";
const SEARCH_CONTEXT: &str = "server";

/// One parsed favorites line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteData {
    pub profile: String,
    pub label: String,
    /// `job` or `server`; lines without one are skipped on restore.
    pub context: Option<String>,
}

/// Parses persisted favorites lines, skipping malformed ones with a warning.
pub fn parse_favorites(lines: &[String]) -> Vec<FavoriteData> {
    let mut parsed = Vec::with_capacity(lines.len());
    for line in lines {
        let close = line.find(']');
        let (Some(rest), Some(close)) = (line.strip_prefix('['), close) else {
            explorer_warn!("Skipping malformed favorite {:?}: missing profile", line);
            continue;
        };
        let profile = &rest[..close - 1];
        let remainder = line[close + 1..].trim_start_matches(':').trim();
        if profile.is_empty() || remainder.is_empty() {
            explorer_warn!("Skipping malformed favorite {:?}: missing label", line);
            continue;
        }
        let (label, context) = match (remainder.find('{'), remainder.rfind('}')) {
            (Some(open), Some(close)) if close > open => (
                remainder[..open].trim(),
                Some(remainder[open + 1..close].to_string()),
            ),
            _ => (remainder, None),
        };
        parsed.push(FavoriteData {
            profile: profile.to_string(),
            label: label.to_string(),
            context,
        });
    }
    parsed
}

/// Trims a live job label down to `JOBNAME(JOBID)`.
pub fn favorite_job_label(label: &str) -> &str {
    match label.rfind(')') {
        Some(close) => &label[..=close],
        None => label,
    }
}

/// Converts legacy `Owner:x Prefix:y` search labels into the ` | ` separated form.
fn upgrade_search_label(label: &str) -> String {
    if label.contains('|') || label.contains(": ") {
        return label.to_string();
    }
    label
        .split_whitespace()
        .map(|option| match option.split_once(':') {
            Some((key, value)) => format!("{key}: {value}"),
            None => option.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

pub(crate) fn apply_criteria(data: &mut SessionData, criteria: &JobSearchCriteria) {
    data.set_search_id(criteria.job_id.as_deref().unwrap_or_default());
    data.set_owner(criteria.owner.as_deref().unwrap_or_default());
    data.set_prefix(criteria.prefix.as_deref().unwrap_or_default());
    data.filter.status = criteria
        .status
        .clone()
        .unwrap_or_else(|| "*".to_string());
}

impl JobTree {
    pub fn find_favorite_profile(&self, profile: &str) -> Option<NodeId> {
        self.favorites().iter().copied().find(|id| {
            self.node(*id)
                .is_some_and(|node| node.profile_name() == Some(profile.trim()))
        })
    }

    fn create_favorite_profile(&mut self, profile: &str, resolution: ProfileResolution) -> NodeId {
        let root = self.favorites_root();
        let id = self.insert_node(
            Some(root),
            profile,
            NodeKind::FavoriteProfile(crate::FavoriteProfileData {
                profile: profile.to_string(),
                resolution,
            }),
            Collapsible::Collapsed,
        );
        self.favorites_mut().push(id);
        id
    }

    fn sort_favorites(&mut self, group: NodeId) {
        let mut children = self.children(group).to_vec();
        children.sort_by_key(|id| {
            let node = self.node(*id);
            let is_job = node.is_some_and(Node::is_job);
            let label = node.map(|n| n.label.to_uppercase()).unwrap_or_default();
            (is_job, label)
        });
        if let Some(node) = self.node_mut(group) {
            node.children = children;
        }

        let mut groups = self.favorites().to_vec();
        groups.sort_by_key(|id| {
            self.node(*id)
                .map(|n| n.label.to_uppercase())
                .unwrap_or_default()
        });
        *self.favorites_mut() = groups;
    }

    /// Label and kind a node would have as a favorite.
    fn favorite_form(&self, id: NodeId) -> TreeResult<(String, NodeKind)> {
        let node = self.get(id)?;
        match &node.kind {
            NodeKind::FavoriteSearch(data) => {
                Ok((node.label.clone(), NodeKind::FavoriteSearch(data.clone())))
            }
            NodeKind::Session(data) => {
                let label = crate::create_search_label(
                    Some(&data.filter.owner),
                    Some(&data.filter.prefix),
                    Some(&data.filter.search_id),
                    Some(&data.filter.status),
                );
                let mut search = SessionData::new(data.profile.clone(), data.user.clone());
                search.filter = data.filter.clone();
                Ok((label, NodeKind::FavoriteSearch(search)))
            }
            NodeKind::Job(data) | NodeKind::FavoriteJob(data) => Ok((
                favorite_job_label(&node.label).to_string(),
                NodeKind::FavoriteJob(data.clone()),
            )),
            _ => Err(TreeError::UnexpectedKind {
                node: id,
                expected: "session or job",
            }),
        }
    }

    /// Adds a session search or a job to its profile's favorites group.
    ///
    /// Returns `false` when an equal favorite already exists.
    pub fn add_favorite(&mut self, id: NodeId) -> TreeResult<bool> {
        let (label, kind) = self.favorite_form(id)?;
        let profile = self
            .get(id)?
            .profile_name()
            .unwrap_or_default()
            .to_string();
        let user = self
            .node(self.session_of(id))
            .and_then(Node::session_data)
            .and_then(|data| data.user.clone());

        let group = match self.find_favorite_profile(&profile) {
            Some(group) => group,
            None => self.create_favorite_profile(&profile, ProfileResolution::Resolved { user }),
        };
        if self.children(group).iter().any(|child| {
            self.node(*child)
                .is_some_and(|n| n.label == label && same_kind(&n.kind, &kind))
        }) {
            explorer_debug!("{} is already a favorite of {}", label, profile);
            return Ok(false);
        }

        let favorite = self.insert_node(Some(group), &label, kind, Collapsible::Collapsed);
        self.get_mut(group)?.children.push(favorite);
        self.sort_favorites(group);
        self.mark_dirty();
        Ok(true)
    }

    /// Removes the favorite matching `id` (a favorite node or its live counterpart).
    ///
    /// A group left empty is removed as well.
    pub fn remove_favorite(&mut self, id: NodeId) -> TreeResult<bool> {
        let (label, kind) = self.favorite_form(id)?;
        let profile = self
            .get(id)?
            .profile_name()
            .unwrap_or_default()
            .to_string();
        let Some(group) = self.find_favorite_profile(&profile) else {
            return Ok(false);
        };

        let (removed, kept): (Vec<NodeId>, Vec<NodeId>) =
            self.children(group).iter().copied().partition(|child| {
                self.node(*child)
                    .is_some_and(|n| n.label == label && same_kind(&n.kind, &kind))
            });
        if removed.is_empty() {
            return Ok(false);
        }
        for favorite in removed {
            self.remove_subtree(favorite);
        }
        let empty = kept.is_empty();
        self.get_mut(group)?.children = kept;
        if empty {
            self.remove_favorite_profile(&profile);
        }
        self.mark_dirty();
        Ok(true)
    }

    /// Drops a whole favorites group.
    pub fn remove_favorite_profile(&mut self, profile: &str) -> bool {
        let Some(group) = self.find_favorite_profile(profile) else {
            return false;
        };
        self.favorites_mut().retain(|id| *id != group);
        self.remove_subtree(group);
        self.mark_dirty();
        true
    }

    /// Favorites serialized for persistence.
    pub fn favorite_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for group in self.favorites() {
            let Some(profile) = self.node(*group).and_then(Node::profile_name) else {
                continue;
            };
            for child in self.children(*group) {
                let Some(node) = self.node(*child) else {
                    continue;
                };
                let context = match node.kind {
                    NodeKind::FavoriteJob(_) => JOB_CONTEXT,
                    NodeKind::FavoriteSearch(_) => SEARCH_CONTEXT,
                    _ => continue,
                };
                lines.push(format!("[{profile}]: {}{{{context}}}", node.label));
            }
        }
        lines
    }

    /// Rebuilds favorites groups from persisted lines. Profiles are left
    /// unresolved until their group is expanded.
    pub fn restore_favorites(&mut self, lines: &[String]) {
        for favorite in parse_favorites(lines) {
            let Some(context) = favorite.context.as_deref() else {
                explorer_warn!(
                    "Skipping favorite {:?} of {} without a context",
                    favorite.label,
                    favorite.profile
                );
                continue;
            };
            let group = match self.find_favorite_profile(&favorite.profile) {
                Some(group) => group,
                None => {
                    self.create_favorite_profile(&favorite.profile, ProfileResolution::Unresolved)
                }
            };

            let (label, kind) = if context.starts_with(JOB_CONTEXT) {
                (
                    favorite.label.clone(),
                    NodeKind::FavoriteJob(JobData {
                        profile: favorite.profile.clone(),
                        job: Job::from_label(&favorite.label),
                    }),
                )
            } else {
                let label = upgrade_search_label(&favorite.label);
                let mut data = SessionData::new(favorite.profile.clone(), None);
                apply_criteria(&mut data, &parse_job_search_query(&label));
                (label, NodeKind::FavoriteSearch(data))
            };
            if self
                .children(group)
                .iter()
                .any(|child| self.node(*child).is_some_and(|n| n.label == label))
            {
                continue;
            }
            let id = self.insert_node(Some(group), &label, kind, Collapsible::Collapsed);
            if let Some(node) = self.node_mut(group) {
                node.children.push(id);
            }
        }
        self.mark_dirty();
    }

    /// Records how a favorites group's profile loaded.
    ///
    /// Resolving hands the profile user to saved searches that carry no owner.
    pub fn resolve_favorite_profile(
        &mut self,
        group: NodeId,
        user: Option<String>,
        authenticated: bool,
    ) -> TreeResult<()> {
        if !matches!(self.get(group)?.kind, NodeKind::FavoriteProfile(_)) {
            return Err(TreeError::UnexpectedKind {
                node: group,
                expected: "favorite profile",
            });
        }
        let resolution = if authenticated {
            for child in self.children(group).to_vec() {
                let Some(node) = self.node_mut(child) else {
                    continue;
                };
                let criteria = parse_job_search_query(&node.label);
                if let NodeKind::FavoriteSearch(data) = &mut node.kind {
                    data.user = user.clone();
                    apply_criteria(data, &criteria);
                }
            }
            ProfileResolution::Resolved { user }
        } else {
            let placeholder = self.insert_node(
                Some(group),
                AUTHENTICATE_FOR_FAVORITES,
                NodeKind::Information,
                Collapsible::None,
            );
            ProfileResolution::Unauthenticated { placeholder }
        };
        let previous = match &mut self.get_mut(group)?.kind {
            NodeKind::FavoriteProfile(data) => std::mem::replace(&mut data.resolution, resolution),
            _ => ProfileResolution::Unresolved,
        };
        if let ProfileResolution::Unauthenticated { placeholder } = previous {
            self.remove_subtree(placeholder);
        }
        self.mark_dirty();
        Ok(())
    }

    /// Favorite counterpart of a live session or job.
    ///
    /// Matches on the label the node would get as a favorite, so a job whose
    /// return code changed still finds its favorite.
    pub fn find_favorited_node(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        if node.is_favorite() {
            return None;
        }
        let (label, kind) = self.favorite_form(id).ok()?;
        let group = self.find_favorite_profile(node.profile_name()?)?;
        self.children(group).iter().copied().find(|child| {
            self.node(*child)
                .is_some_and(|fav| fav.label == label && same_kind(&fav.kind, &kind))
        })
    }

    /// Live counterpart of a favorite job under the profile's session.
    pub fn find_non_favorited_node(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        let job = match &node.kind {
            NodeKind::FavoriteJob(data) => &data.job,
            _ => return None,
        };
        let session = self.find_session(node.profile_name()?)?;
        self.find_job(session, &job.jobid)
    }
}

fn same_kind(a: &NodeKind, b: &NodeKind) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_lines_without_profile_or_label() {
        let lines = vec![
            "[sestest]: MYHLQ(JOB1283){job}".to_string(),
            "no profile here".to_string(),
            "[sestest]: ".to_string(),
            "[sestest]: Owner: zowe | Prefix: *{server}".to_string(),
        ];
        let parsed = parse_favorites(&lines);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].label, "MYHLQ(JOB1283)");
        assert_eq!(parsed[0].context.as_deref(), Some("job"));
        assert_eq!(parsed[1].label, "Owner: zowe | Prefix: *");
    }

    #[test]
    fn legacy_search_labels_are_upgraded() {
        assert_eq!(
            upgrade_search_label("Owner:ZOWE Prefix:*"),
            "Owner: ZOWE | Prefix: *"
        );
        assert_eq!(upgrade_search_label("JobId: JOB123"), "JobId: JOB123");
    }

    #[test]
    fn job_labels_are_trimmed_to_the_closing_paren() {
        assert_eq!(favorite_job_label("MYHLQ(JOB1283) - CC 0000"), "MYHLQ(JOB1283)");
        assert_eq!(favorite_job_label("NOPAREN"), "NOPAREN");
    }
}
