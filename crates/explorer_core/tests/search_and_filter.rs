use std::sync::Once;

use explorer_core::{
    parse_job_search_query, search_menu, update, EditorStep, Effect, Job, JobProperty,
    JobQueryEditor, JobSearchCriteria, JobTree, Msg, NodeId, SearchMenuChoice,
    SUBMIT_QUERY_LABEL,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(explorer_logging::initialize_for_tests);
}

#[test]
fn canonical_labels_parse_back_to_their_criteria() {
    init_logging();
    for label in [
        "Owner: zowe | Prefix: * | Status: ACTIVE",
        "Owner: zowe | Prefix: MY*",
        "Prefix: ABC",
        "JobId: JOB1234",
    ] {
        assert_eq!(parse_job_search_query(label).label(), label);
    }
}

#[test]
fn colons_only_query_yields_no_criteria() {
    init_logging();
    assert_eq!(
        parse_job_search_query("::::::::::"),
        JobSearchCriteria::default()
    );
}

#[test]
fn unknown_keys_and_bare_words_are_dropped() {
    init_logging();
    let parsed = parse_job_search_query("Owner: zowe | Color: red | stray");
    assert_eq!(
        parsed,
        JobSearchCriteria {
            owner: Some("zowe".into()),
            ..JobSearchCriteria::default()
        }
    );
}

#[test]
fn legacy_space_separated_query_is_understood() {
    init_logging();
    let parsed = parse_job_search_query("Owner:ZOWE Prefix:ABC*");
    assert_eq!(parsed.owner.as_deref(), Some("ZOWE"));
    assert_eq!(parsed.prefix.as_deref(), Some("ABC*"));
}

#[test]
fn search_menu_lists_modes_then_history() {
    let history = vec!["Owner: a".to_string(), "JobId: JOB1".to_string()];
    assert_eq!(
        search_menu(&history),
        vec![
            SearchMenuChoice::QuerySearch,
            SearchMenuChoice::IdSearch,
            SearchMenuChoice::History("Owner: a".into()),
            SearchMenuChoice::History("JobId: JOB1".into()),
        ]
    );
}

#[test]
fn query_editor_submits_with_session_user_and_resets() {
    let mut editor = JobQueryEditor::new();
    let items = editor.items(Some("zowe"));
    assert_eq!(items[0].label, SUBMIT_QUERY_LABEL);
    assert_eq!(items[1].description.as_deref(), Some("zowe"));

    assert_eq!(
        editor.select(JobProperty::Status.label(), Some("zowe")),
        EditorStep::ChooseStatus
    );
    editor.set_value(JobProperty::Status, Some("Active".into()));
    editor.set_value(JobProperty::Prefix, Some(String::new()));

    let step = editor.select(SUBMIT_QUERY_LABEL, Some("zowe"));
    assert_eq!(
        step,
        EditorStep::Submit(JobSearchCriteria {
            owner: Some("zowe".into()),
            prefix: Some("*".into()),
            job_id: None,
            status: Some("Active".into()),
        })
    );
    assert_eq!(editor, JobQueryEditor::new());
    assert_eq!(editor.select("Nothing", None), EditorStep::Unchanged);
}

fn session_with_jobs() -> (JobTree, NodeId) {
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
                prefix: Some("ZOWE*".into()),
                ..JobSearchCriteria::default()
            },
        },
    );
    let jobs = ["ZOWEUSR1", "ZOWEUSR2", "ZOWEUSR3"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut job = Job::new(*name, format!("JOB{}", i + 1));
            job.retcode = Some("CC 0000".into());
            job
        })
        .collect();
    let (state, _) = update(state, Msg::JobsLoaded { node: session, jobs });
    (state, session)
}

#[test]
fn local_filter_narrows_and_clear_restores() {
    init_logging();
    let (state, session) = session_with_jobs();
    let all = state.children(session).to_vec();

    let (state, effects) = update(
        state,
        Msg::LocalFilterChanged {
            node: session,
            query: "zoweusr2".into(),
        },
    );
    assert_eq!(effects[0], Effect::Refresh(Some(session)));
    assert_eq!(state.children(session), &all[1..2]);
    assert_eq!(
        state.node(session).unwrap().description.as_deref(),
        Some("Filter: ZOWEUSR2")
    );

    // Later filters run against the full capture, not the narrowed list.
    let (state, _) = update(
        state,
        Msg::LocalFilterChanged {
            node: session,
            query: "cc 0000".into(),
        },
    );
    assert_eq!(state.children(session), all.as_slice());

    let (state, effects) = update(state, Msg::Refresh(session));
    assert_eq!(effects, vec![Effect::Refresh(Some(session))]);

    let (state, _) = update(state, Msg::LocalFilterCleared { node: session });
    assert_eq!(state.children(session), all.as_slice());
    assert_eq!(state.node(session).unwrap().description, None);
    assert!(!state.is_locally_filtered(session));
}

#[test]
fn polling_requires_a_valid_interval() {
    init_logging();
    let (state, session) = session_with_jobs();
    let job = state.children(session)[0];
    let (state, _) = update(
        state,
        Msg::SpoolsLoaded {
            node: job,
            spools: vec![explorer_core::SpoolFile::new("JES2", "JESMSGLG", 2)],
        },
    );
    let spool = state.children(job)[0];
    let path = "/sestest/JOB1/JES2.JESMSGLG.2".to_string();
    assert_eq!(state.find_by_path(&path), Some(spool));

    let (state, effects) = update(state, Msg::PollToggled { node: spool });
    assert_eq!(
        effects,
        vec![Effect::PromptPollInterval {
            node: spool,
            path: path.clone(),
            default_interval_ms: 5_000,
        }]
    );

    let (state, effects) = update(
        state,
        Msg::PollIntervalChosen {
            node: spool,
            interval_ms: 500,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::ShowMessage(
            explorer_core::INVALID_POLL_INTERVAL.to_string()
        )]
    );

    let (state, effects) = update(
        state,
        Msg::PollIntervalChosen {
            node: spool,
            interval_ms: 2_000,
        },
    );
    assert_eq!(
        effects[0],
        Effect::StartPolling {
            node: spool,
            path: path.clone(),
            interval_ms: 2_000,
        }
    );
    assert!(state.tree_item(spool).unwrap().polling);

    let (state, effects) = update(state, Msg::PollToggled { node: spool });
    assert_eq!(
        effects,
        vec![Effect::StopPolling { path }, Effect::Refresh(Some(spool))]
    );
    assert!(!state.node(spool).unwrap().is_polling());
}
