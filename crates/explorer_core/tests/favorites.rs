use std::sync::Once;

use explorer_core::{
    update, Effect, Job, JobSearchCriteria, JobTree, Msg, Node, NodeId, AUTHENTICATE_FOR_FAVORITES,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(explorer_logging::initialize_for_tests);
}

fn restored(lines: &[&str]) -> JobTree {
    let lines = lines.iter().map(|line| line.to_string()).collect();
    let (state, _) = update(JobTree::default(), Msg::FavoritesRestored(lines));
    state
}

/// A searched `sestest` session holding one finished job.
fn session_with_job() -> (JobTree, NodeId, NodeId) {
    let (state, _) = update(
        JobTree::default(),
        Msg::SessionAdded {
            profile: "sestest".into(),
            user: Some("zowe".into()),
        },
    );
    let session = state.find_session("sestest").unwrap();
    let (state, _) = update(
        state,
        Msg::SearchSubmitted {
            node: session,
            criteria: JobSearchCriteria {
                owner: Some("zowe".into()),
                prefix: Some("*".into()),
                ..JobSearchCriteria::default()
            },
        },
    );
    let mut job = Job::new("MYHLQ", "JOB1283");
    job.retcode = Some("CC 0000".into());
    let (state, _) = update(
        state,
        Msg::JobsLoaded {
            node: session,
            jobs: vec![job],
        },
    );
    let job_node = state.children(session)[0];
    (state, session, job_node)
}

#[test]
fn persisted_lines_survive_a_restore() {
    init_logging();
    let state = restored(&[
        "[sestest]: MYHLQ(JOB1283){job}",
        "[sestest]: Owner: zowe | Prefix: *{server}",
        "[sestest]: Owner: zowe | Prefix: *{server}",
        "[other]: Owner:ZOWE Prefix:*{server}",
        "[other]: NOCONTEXT(JOB1)",
        "[broken",
    ]);
    assert_eq!(
        state.favorite_lines(),
        vec![
            "[sestest]: MYHLQ(JOB1283){job}",
            "[sestest]: Owner: zowe | Prefix: *{server}",
            "[other]: Owner: ZOWE | Prefix: *{server}",
        ]
    );
}

#[test]
fn favorite_job_round_trip_leaves_no_group() {
    init_logging();
    let (state, _, job_node) = session_with_job();

    let (state, effects) = update(state, Msg::FavoriteAdded { node: job_node });
    assert_eq!(
        effects,
        vec![
            Effect::PersistFavorites(vec!["[sestest]: MYHLQ(JOB1283){job}".into()]),
            Effect::Refresh(Some(state.favorites_root())),
        ]
    );
    assert_eq!(state.favorites().len(), 1);
    assert!(state.tree_item(job_node).unwrap().favorited);

    let (state, effects) = update(state, Msg::FavoriteAdded { node: job_node });
    assert!(effects.is_empty(), "duplicate favorites are ignored");

    let (state, effects) = update(state, Msg::FavoriteRemoved { node: job_node });
    assert!(effects.contains(&Effect::PersistFavorites(vec![])));
    assert!(state.favorites().is_empty());
}

#[test]
fn searches_sort_before_jobs_in_a_group() {
    init_logging();
    let (state, session, job_node) = session_with_job();
    let (state, _) = update(state, Msg::FavoriteAdded { node: job_node });
    let (state, _) = update(state, Msg::FavoriteAdded { node: session });
    assert_eq!(
        state.favorite_lines(),
        vec![
            "[sestest]: Owner: zowe | Prefix: * | Status: *{server}",
            "[sestest]: MYHLQ(JOB1283){job}",
        ]
    );
}

#[test]
fn removing_one_of_two_favorites_keeps_the_group() {
    init_logging();
    let (state, session, job_node) = session_with_job();
    let (state, _) = update(state, Msg::FavoriteAdded { node: job_node });
    let (state, _) = update(state, Msg::FavoriteAdded { node: session });
    let group = state.favorites()[0];
    assert_eq!(state.children(group).len(), 2);

    let (state, effects) = update(state, Msg::FavoriteRemoved { node: job_node });

    let survivor = vec!["[sestest]: Owner: zowe | Prefix: * | Status: *{server}".to_string()];
    assert!(effects.contains(&Effect::PersistFavorites(survivor.clone())));
    assert_eq!(state.favorites(), [group]);
    assert_eq!(state.node(group).and_then(Node::profile_name), Some("sestest"));
    assert_eq!(state.children(group).len(), 1);
    assert_eq!(state.favorite_lines(), survivor);
    assert!(!state.tree_item(job_node).unwrap().favorited);
    assert!(state.tree_item(session).unwrap().favorited);
}

#[test]
fn user_selected_group_removal_needs_confirmation() {
    init_logging();
    let state = restored(&["[sestest]: MYHLQ(JOB1283){job}"]);

    let (state, effects) = update(
        state,
        Msg::FavoriteProfileRemoved {
            profile: "sestest".into(),
            user_selected: true,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::ConfirmRemoveFavoriteProfile {
            profile: "sestest".into()
        }]
    );
    assert_eq!(state.favorites().len(), 1);

    let (state, effects) = update(
        state,
        Msg::FavoriteProfileRemovalConfirmed {
            profile: "sestest".into(),
        },
    );
    assert!(state.favorites().is_empty());
    assert!(effects.contains(&Effect::PersistFavorites(vec![])));
}

#[test]
fn resolving_a_profile_fills_in_the_owner() {
    init_logging();
    let state = restored(&["[sestest]: Prefix: MY*{server}"]);
    let group = state.favorites()[0];
    let search = state.children(group)[0];

    let (state, effects) = update(state, Msg::Expand(group));
    assert_eq!(
        effects,
        vec![Effect::ResolveProfile {
            node: group,
            profile: "sestest".into()
        }]
    );

    let (state, _) = update(
        state,
        Msg::ProfileResolved {
            node: group,
            user: Some("zowe".into()),
        },
    );
    let filter = &state
        .node(search)
        .and_then(Node::session_data)
        .unwrap()
        .filter;
    assert_eq!(filter.owner, "zowe");
    assert_eq!(filter.prefix, "MY*");

    let (_, effects) = update(state, Msg::Expand(group));
    assert!(effects.is_empty(), "resolved profiles are not reloaded");
}

#[test]
fn unauthenticated_profile_shows_placeholder() {
    init_logging();
    let state = restored(&["[sestest]: MYHLQ(JOB1283){job}"]);
    let group = state.favorites()[0];
    let (state, _) = update(state, Msg::ProfileUnauthenticated { node: group });

    let visible = state.visible_children(group);
    assert_eq!(visible.len(), 1);
    assert_eq!(
        state.node(visible[0]).unwrap().label,
        AUTHENTICATE_FOR_FAVORITES
    );
    assert_eq!(state.favorite_lines(), vec!["[sestest]: MYHLQ(JOB1283){job}"]);
}

#[test]
fn missing_profile_offers_removal() {
    init_logging();
    let state = restored(&["[gone]: MYHLQ(JOB1283){job}"]);
    let group = state.favorites()[0];
    let (_, effects) = update(state, Msg::ProfileMissing { node: group });
    assert_eq!(
        effects,
        vec![Effect::OfferRemoveMissingProfile {
            profile: "gone".into()
        }]
    );
}

#[test]
fn opening_a_favorite_search_runs_it_and_toggles() {
    init_logging();
    let state = restored(&["[sestest]: Owner: zowe | Prefix: *{server}"]);
    let search = state.children(state.favorites()[0])[0];

    let (state, effects) = update(state, Msg::FavoriteSearchOpened { node: search });
    assert_eq!(
        effects,
        vec![
            Effect::EnsureSession {
                profile: "sestest".into()
            },
            Effect::FetchJobs {
                node: search,
                profile: "sestest".into(),
                owner: "zowe".into(),
                prefix: "*".into(),
                status: "*".into(),
            },
            Effect::Refresh(Some(search)),
        ]
    );

    let (_, effects) = update(state, Msg::FavoriteSearchOpened { node: search });
    assert_eq!(effects, vec![Effect::Refresh(Some(search))]);
}

#[test]
fn deleting_a_favorited_job_drops_the_favorite() {
    init_logging();
    let (state, session, job_node) = session_with_job();
    let (state, _) = update(state, Msg::FavoriteAdded { node: job_node });
    let (state, effects) = update(state, Msg::JobDeleted { node: job_node });
    assert!(effects.contains(&Effect::PersistFavorites(vec![])));
    assert!(state.children(session).is_empty());
    assert!(state.favorites().is_empty());
}
