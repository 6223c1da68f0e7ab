use explorer_logging::{explorer_debug, explorer_warn};

use crate::{
    favorites::apply_criteria, parse_job_search_query, tree::SEARCH_PLACEHOLDER, Collapsible,
    Effect, JobTree, Msg, Node, NodeId, NodeKind, ProfileResolution, MIN_POLL_INTERVAL_MS,
};

/// Pure update function: applies a message to the tree and returns any effects.
pub fn update(mut state: JobTree, msg: Msg) -> (JobTree, Vec<Effect>) {
    let effects = match msg {
        Msg::SessionAdded { profile, user } => match state.add_session(&profile, user) {
            Some(_) => vec![persist_history(&state), Effect::Refresh(None)],
            None => Vec::new(),
        },
        Msg::SessionRemoved { node } => {
            if state.delete_session(node) {
                vec![persist_history(&state), Effect::Refresh(None)]
            } else {
                Vec::new()
            }
        }
        Msg::Expand(node) => expand(&mut state, node),
        Msg::Collapse(node) => {
            if let Some(n) = state.node_mut(node) {
                if n.collapsible == Collapsible::Expanded {
                    n.collapsible = Collapsible::Collapsed;
                }
            }
            Vec::new()
        }
        Msg::Refresh(node) => {
            if let Some(n) = state.node_mut(node) {
                n.dirty = true;
            }
            let mut effects = expand(&mut state, node);
            effects.push(Effect::Refresh(Some(node)));
            effects
        }
        Msg::JobsLoaded { node, jobs } => match state.apply_jobs(node, jobs) {
            Ok(_) => vec![Effect::Refresh(Some(node))],
            Err(err) => {
                explorer_warn!("Dropping job listing: {}", err);
                Vec::new()
            }
        },
        Msg::SpoolsLoaded { node, spools } => match state.apply_spools(node, spools) {
            Ok(_) => vec![Effect::Refresh(Some(node))],
            Err(err) => {
                explorer_warn!("Dropping spool listing: {}", err);
                Vec::new()
            }
        },
        Msg::LoadFailed { node, error } => {
            let profile = state
                .node(node)
                .and_then(Node::profile_name)
                .unwrap_or_default()
                .to_string();
            vec![Effect::ReportApiError {
                profile,
                context: "Retrieving response from JES list API".to_string(),
                error,
            }]
        }
        Msg::SearchSubmitted { node, criteria } => {
            let label = criteria.label();
            state.reset_local_filter(node);
            let Some(n) = state.node_mut(node) else {
                return (state, Vec::new());
            };
            let Some(data) = n.session_data_mut() else {
                return (state, Vec::new());
            };
            apply_criteria(data, &criteria);
            data.filtered = true;
            n.description = Some(label.clone());
            n.tooltip = Some(label.clone());
            n.dirty = true;

            let mut effects = Vec::new();
            if state.history_mut().add_search(&label) {
                effects.push(persist_history(&state));
            }
            effects.extend(expand(&mut state, node));
            effects.push(Effect::Refresh(Some(node)));
            effects
        }
        Msg::FavoriteSearchOpened { node } => open_favorite_search(&mut state, node),
        Msg::SortChanged { node, sort } => match state.set_sort(node, sort) {
            Ok(()) => vec![Effect::Refresh(Some(node))],
            Err(err) => {
                explorer_warn!("Ignoring sort change: {}", err);
                Vec::new()
            }
        },
        Msg::FavoriteAdded { node } => match state.add_favorite(node) {
            Ok(true) => favorites_changed(&state),
            Ok(false) => Vec::new(),
            Err(err) => {
                explorer_warn!("Cannot add favorite: {}", err);
                Vec::new()
            }
        },
        Msg::FavoriteRemoved { node } => match state.remove_favorite(node) {
            Ok(true) => favorites_changed(&state),
            Ok(false) => Vec::new(),
            Err(err) => {
                explorer_warn!("Cannot remove favorite: {}", err);
                Vec::new()
            }
        },
        Msg::FavoriteProfileRemoved {
            profile,
            user_selected: true,
        } => vec![Effect::ConfirmRemoveFavoriteProfile { profile }],
        Msg::FavoriteProfileRemoved {
            profile,
            user_selected: false,
        }
        | Msg::FavoriteProfileRemovalConfirmed { profile } => {
            state.remove_favorite_profile(&profile);
            favorites_changed(&state)
        }
        Msg::FavoritesRestored(lines) => {
            state.restore_favorites(&lines);
            vec![Effect::Refresh(Some(state.favorites_root()))]
        }
        Msg::HistoryRestored { searches, sessions } => {
            state.history_mut().restore(searches, sessions);
            Vec::new()
        }
        Msg::SearchHistoryRemoved(search) => {
            state.history_mut().remove_search(&search);
            vec![persist_history(&state)]
        }
        Msg::SearchHistoryReset => {
            state.history_mut().reset_searches();
            vec![persist_history(&state)]
        }
        Msg::ProfileResolved { node, user } => resolve_profile(&mut state, node, user, true),
        Msg::ProfileUnauthenticated { node } => resolve_profile(&mut state, node, None, false),
        Msg::ProfileMissing { node } => match state.node(node).and_then(Node::profile_name) {
            Some(profile) => vec![Effect::OfferRemoveMissingProfile {
                profile: profile.to_string(),
            }],
            None => Vec::new(),
        },
        Msg::LocalFilterChanged { node, query } => {
            match state.apply_local_filter(node, &query) {
                Ok(_) => vec![
                    Effect::Refresh(Some(node)),
                    Effect::ShowMessage(format!(
                        "Filter updated for {}",
                        state.node(node).map(|n| n.label.as_str()).unwrap_or_default()
                    )),
                ],
                Err(err) => {
                    explorer_warn!("Cannot filter: {}", err);
                    Vec::new()
                }
            }
        }
        Msg::LocalFilterCleared { node } => match state.clear_local_filter(node) {
            Ok(()) => vec![
                Effect::Refresh(Some(node)),
                Effect::ShowMessage(format!(
                    "Filter cleared for {}",
                    state.node(node).map(|n| n.label.as_str()).unwrap_or_default()
                )),
            ],
            Err(err) => {
                explorer_warn!("Cannot clear filter: {}", err);
                Vec::new()
            }
        },
        Msg::PollToggled { node } => {
            let Some(path) = state.resource_path(node) else {
                return (state, Vec::new());
            };
            match state.node(node).and_then(Node::spool).map(|s| s.polling) {
                Some(true) => match state.set_polling(node, false) {
                    Ok(updated) => std::iter::once(Effect::StopPolling { path })
                        .chain(updated.into_iter().map(|id| Effect::Refresh(Some(id))))
                        .collect(),
                    Err(err) => {
                        explorer_warn!("Cannot stop polling {}: {}", path, err);
                        Vec::new()
                    }
                },
                Some(false) => vec![Effect::PromptPollInterval {
                    node,
                    path,
                    default_interval_ms: state.settings().default_poll_interval_ms,
                }],
                None => Vec::new(),
            }
        }
        Msg::PollIntervalChosen { node, interval_ms } => {
            if interval_ms < MIN_POLL_INTERVAL_MS {
                vec![Effect::ShowMessage(crate::INVALID_POLL_INTERVAL.to_string())]
            } else {
                match (state.resource_path(node), state.set_polling(node, true)) {
                    (Some(path), Ok(updated)) => std::iter::once(Effect::StartPolling {
                        node,
                        path,
                        interval_ms,
                    })
                    .chain(updated.into_iter().map(|id| Effect::Refresh(Some(id))))
                    .collect(),
                    _ => Vec::new(),
                }
            }
        }
        Msg::SpoolEncodingChanged { node, encoding } => {
            if let Some(Node {
                kind: NodeKind::Spool(data),
                ..
            }) = state.node_mut(node)
            {
                data.encoding = Some(encoding);
            }
            Vec::new()
        }
        Msg::JobDeleted { node } => {
            let Some(job) = state.node(node).filter(|n| n.is_job()) else {
                return (state, Vec::new());
            };
            let live = if job.is_favorite() {
                state.find_non_favorited_node(node)
            } else {
                Some(node)
            };
            let session = state.session_of(node);
            let mut effects = Vec::new();
            if let Ok(true) = state.remove_favorite(node) {
                effects.extend(favorites_changed(&state));
            }
            if let Some(live) = live {
                state.detach_job(live);
            }
            effects.push(Effect::Refresh(Some(session)));
            effects
        }
    };

    (state, effects)
}

/// Effects needed to show the children of `node`.
fn expand(state: &mut JobTree, id: NodeId) -> Vec<Effect> {
    let Some(node) = state.node_mut(id) else {
        return Vec::new();
    };
    if node.collapsible == Collapsible::Collapsed {
        node.collapsible = Collapsible::Expanded;
    }
    let unsearched = matches!(&node.kind, NodeKind::Session(data) if !data.filtered);
    if unsearched {
        state.set_information_child(id, SEARCH_PLACEHOLDER);
        return Vec::new();
    }

    let Some(node) = state.node(id) else {
        return Vec::new();
    };
    match &node.kind {
        NodeKind::FavoriteProfile(data) => match data.resolution {
            ProfileResolution::Unresolved => vec![Effect::ResolveProfile {
                node: id,
                profile: data.profile.clone(),
            }],
            _ => Vec::new(),
        },
        NodeKind::Session(data) | NodeKind::FavoriteSearch(data) => {
            if !node.dirty || data.local_filter.query.is_some() {
                return Vec::new();
            }
            if data.filter.search_id.is_empty() {
                vec![Effect::FetchJobs {
                    node: id,
                    profile: data.profile.clone(),
                    owner: data.filter.owner.clone(),
                    prefix: data.filter.prefix.clone(),
                    status: data.filter.status.clone(),
                }]
            } else {
                vec![Effect::FetchJob {
                    node: id,
                    profile: data.profile.clone(),
                    job_id: data.filter.search_id.clone(),
                }]
            }
        }
        NodeKind::Job(data) | NodeKind::FavoriteJob(data) if node.dirty => {
            vec![Effect::FetchSpools {
                node: id,
                profile: data.profile.clone(),
                jobname: data.job.jobname.clone(),
                jobid: data.job.jobid.clone(),
            }]
        }
        _ => Vec::new(),
    }
}

/// Clicking a favorited search toggles it; opening re-runs the saved query.
fn open_favorite_search(state: &mut JobTree, id: NodeId) -> Vec<Effect> {
    let Some(node) = state.node_mut(id) else {
        return Vec::new();
    };
    let label = node.label.clone();
    let NodeKind::FavoriteSearch(data) = &mut node.kind else {
        return Vec::new();
    };
    let profile = data.profile.clone();
    if node.collapsible == Collapsible::Expanded {
        node.collapsible = Collapsible::Collapsed;
        node.dirty = true;
        return vec![Effect::Refresh(Some(id))];
    }
    apply_criteria(data, &parse_job_search_query(&label));
    data.filtered = true;
    node.dirty = true;
    explorer_debug!("Opening favorite search {:?} of {}", label, profile);

    let mut effects = vec![Effect::EnsureSession { profile }];
    effects.extend(expand(state, id));
    effects.push(Effect::Refresh(Some(id)));
    effects
}

fn resolve_profile(
    state: &mut JobTree,
    node: NodeId,
    user: Option<String>,
    authenticated: bool,
) -> Vec<Effect> {
    match state.resolve_favorite_profile(node, user, authenticated) {
        Ok(()) => vec![Effect::Refresh(Some(node))],
        Err(err) => {
            explorer_warn!("Cannot resolve favorites profile: {}", err);
            Vec::new()
        }
    }
}

fn favorites_changed(state: &JobTree) -> Vec<Effect> {
    vec![
        Effect::PersistFavorites(state.favorite_lines()),
        Effect::Refresh(Some(state.favorites_root())),
    ]
}

fn persist_history(state: &JobTree) -> Effect {
    Effect::PersistHistory {
        searches: state.history().searches().to_vec(),
        sessions: state.history().sessions().to_vec(),
    }
}
