mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{job, spool, FakeJes, FakePrompter, PROFILE};
use explorer_core::{
    ItemKind, JobProperty, JobSortMethod, NodeId, NodeSort, SortDirection, CREATE_FILTER_LABEL,
    INVALID_POLL_INTERVAL, NO_JOBS_FOUND, SEARCH_BY_ID_LABEL, SUBMIT_QUERY_LABEL,
};
use explorer_engine::{
    BulkReport, JesError, JobTreeProvider, TreeEvent, TreeStateStore, ALREADY_CANCELLED, CANCEL_UNSUPPORTED,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn jes() -> FakeJes {
    let first = job("ZOWEUSR1", "JOB1", Some("CC 0000"));
    let jes = FakeJes::with_jobs(vec![
        first.clone(),
        job("ZOWEUSR2", "JOB2", None),
        job("ZOWEUSR3", "JOB3", Some("ABEND S0C4")),
    ]);
    jes.add_spools(
        "JOB1",
        vec![spool(&first, "JES2", "JESMSGLG", 2)],
        "HASP373 ZOWEUSR1 STARTED",
    );
    jes
}

fn setup(jes: FakeJes) -> (Arc<FakeJes>, Arc<FakePrompter>, JobTreeProvider) {
    common::init_logging();
    let api = Arc::new(jes);
    let prompter = Arc::new(FakePrompter::default());
    let provider = common::provider(Arc::clone(&api), Arc::clone(&prompter));
    (api, prompter, provider)
}

fn labels(provider: &JobTreeProvider, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .map(|id| provider.get_tree_item(*id).unwrap().label)
        .collect()
}

/// Adds the session and searches it through the query editor.
async fn searched_session(provider: &mut JobTreeProvider, prompter: &FakePrompter) -> NodeId {
    let session = provider.add_session(PROFILE).await.expect("session");
    prompter.pick_next(CREATE_FILTER_LABEL);
    prompter.pick_next(JobProperty::Prefix.label());
    prompter.input_next("ZOWE*");
    prompter.pick_next(SUBMIT_QUERY_LABEL);
    provider.search_prompt(session).await.unwrap();
    session
}

#[tokio::test]
async fn unsearched_session_shows_placeholder_without_fetching() {
    let (api, _prompter, mut provider) = setup(jes());
    let session = provider.add_session(PROFILE).await.unwrap();

    let roots = provider.get_children(None).await;
    assert_eq!(roots.len(), 2);
    assert_eq!(provider.get_tree_item(roots[0]).unwrap().kind, ItemKind::Favorites);

    let children = provider.get_children(Some(session)).await;
    assert_eq!(
        provider.get_tree_item(children[0]).unwrap().kind,
        ItemKind::Information
    );
    assert!(api.calls().is_empty());
    assert_eq!(provider.add_session("unknown").await, None);
}

#[tokio::test]
async fn query_search_lists_jobs_and_records_history() {
    let (api, prompter, mut provider) = setup(jes());
    let events = provider.subscribe();
    let session = searched_session(&mut provider, &prompter).await;

    assert_eq!(api.calls(), vec!["list owner=zowe prefix=ZOWE* status=-"]);
    let children = provider.get_children(Some(session)).await;
    assert_eq!(
        labels(&provider, &children),
        vec![
            "ZOWEUSR1(JOB1) - CC 0000",
            "ZOWEUSR2(JOB2) - ACTIVE",
            "ZOWEUSR3(JOB3) - ABEND S0C4",
        ]
    );
    // Expanding a clean session does not fetch again.
    assert_eq!(api.calls().len(), 1);
    assert_eq!(
        provider.state().history().searches(),
        ["Owner: zowe | Prefix: ZOWE* | Status: *"]
    );
    assert_eq!(
        provider.get_tree_item(session).unwrap().description.as_deref(),
        Some("Owner: zowe | Prefix: ZOWE* | Status: *")
    );
    assert!(events
        .try_iter()
        .any(|e| e == TreeEvent::Changed(Some(session))));
}

#[tokio::test]
async fn invalid_prefix_is_rejected_before_any_request() {
    let (api, prompter, mut provider) = setup(jes());
    let session = provider.add_session(PROFILE).await.unwrap();
    prompter.pick_next(CREATE_FILTER_LABEL);
    prompter.pick_next(JobProperty::Prefix.label());
    prompter.input_next("TOOLONGPREFIX");

    provider.search_prompt(session).await.unwrap();

    assert_eq!(prompter.errors(), vec!["Invalid job prefix"]);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn history_entry_with_job_id_reopens_the_id_prompt() {
    let (api, prompter, mut provider) = setup(jes());
    let session = provider.add_session(PROFILE).await.unwrap();
    prompter.pick_next(SEARCH_BY_ID_LABEL);
    prompter.input_next("JOB2");
    provider.search_prompt(session).await.unwrap();
    assert_eq!(
        labels(&provider, provider.state().children(session)),
        vec!["ZOWEUSR2(JOB2) - ACTIVE"]
    );

    prompter.pick_next("JobId: JOB2");
    prompter.input_next("JOB404");
    provider.search_prompt(session).await.unwrap();

    assert_eq!(api.calls(), vec!["get JOB2", "get JOB404"]);
    assert_eq!(
        labels(&provider, provider.state().children(session)),
        vec![NO_JOBS_FOUND]
    );
}

#[tokio::test]
async fn listing_failure_keeps_children_and_reports() {
    let (api, prompter, mut provider) = setup(jes());
    let session = searched_session(&mut provider, &prompter).await;
    let before = provider.state().children(session).to_vec();

    *api.listing_error.lock().unwrap() = Some(JesError::Auth {
        profile: PROFILE.into(),
    });
    provider.refresh(Some(session)).await;

    assert_eq!(provider.state().children(session), before.as_slice());
    let errors = prompter.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Retrieving response from JES list API for profile sestest"));
    assert!(errors[0].contains("Check the profile's user and password"));
}

#[tokio::test]
async fn spool_files_open_and_decode() {
    let (api, prompter, mut provider) = setup(jes());
    let session = searched_session(&mut provider, &prompter).await;
    let job1 = provider.state().children(session)[0];

    let spools = provider.get_children(Some(job1)).await;
    assert_eq!(labels(&provider, &spools), vec!["JES2:JESMSGLG(2)"]);
    let item = provider.get_tree_item(spools[0]).unwrap();
    assert_eq!(item.resource_path.as_deref(), Some("/sestest/JOB1/JES2.JESMSGLG.2"));

    let content = provider.open_spool(spools[0]).await.unwrap();
    assert_eq!(content.text, "HASP373 ZOWEUSR1 STARTED");
    provider.open_spool(spools[0]).await.unwrap();
    assert_eq!(
        api.calls().iter().filter(|c| c.starts_with("download")).count(),
        1
    );
}

#[tokio::test]
async fn cancel_skips_finished_jobs_and_reports_each_failure() {
    let (_api, prompter, mut provider) = setup(jes());
    let session = searched_session(&mut provider, &prompter).await;
    let jobs = provider.state().children(session).to_vec();

    let report = provider.cancel_jobs(&jobs[2..]).await.unwrap();
    assert_eq!(report.skipped, vec!["ZOWEUSR3(JOB3)"]);
    assert_eq!(prompter.messages().last().map(String::as_str), Some(ALREADY_CANCELLED));

    let report = provider.cancel_jobs(&jobs).await.unwrap();
    assert_eq!(report.succeeded, vec!["ZOWEUSR1(JOB1)", "ZOWEUSR2(JOB2)"]);
    assert_eq!(report.skipped, vec!["ZOWEUSR3(JOB3)"]);
    assert!(report.failed.is_empty());
    assert_eq!(
        prompter.messages().last().map(String::as_str),
        Some("Cancelled the following jobs: ZOWEUSR1(JOB1), ZOWEUSR2(JOB2)")
    );
}

#[tokio::test]
async fn cancel_without_api_support_fails_per_job() {
    let jes = FakeJes {
        supports_cancel: false,
        ..jes()
    };
    let (api, prompter, mut provider) = setup(jes);
    let session = searched_session(&mut provider, &prompter).await;
    let active = provider.state().children(session)[1];

    let report = provider.cancel_jobs(&[active]).await.unwrap();

    assert_eq!(
        report.failed,
        vec![("ZOWEUSR2(JOB2)".to_string(), CANCEL_UNSUPPORTED.to_string())]
    );
    assert_eq!(prompter.errors().len(), 1);
    // The session is refreshed afterwards.
    assert_eq!(
        api.calls().iter().filter(|c| c.starts_with("list")).count(),
        2
    );
}

#[tokio::test]
async fn delete_removes_confirmed_jobs_and_their_favorites() {
    let (api, prompter, mut provider) = setup(jes());
    let session = searched_session(&mut provider, &prompter).await;
    let job1 = provider.state().children(session)[0];
    provider.add_favorite(job1).await;
    assert_eq!(provider.state().favorites().len(), 1);

    prompter.confirm_next(false);
    let report = provider.delete_jobs(&[job1]).await.unwrap();
    assert_eq!(report, BulkReport::default());

    prompter.confirm_next(true);
    let report = provider.delete_jobs(&[job1]).await.unwrap();

    assert_eq!(report.succeeded, vec!["ZOWEUSR1(JOB1)"]);
    assert!(api.calls().contains(&"delete JOB1".to_string()));
    assert_eq!(provider.state().children(session).len(), 2);
    assert!(provider.state().favorites().is_empty());
}

#[tokio::test]
async fn favorites_and_history_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    let (_api, prompter, provider) = setup(jes());
    let mut provider = provider.with_store(TreeStateStore::new(dir.path().to_path_buf(), true));
    let session = searched_session(&mut provider, &prompter).await;
    let job1 = provider.state().children(session)[0];
    provider.add_favorite(job1).await;
    provider.add_favorite(session).await;

    let (_api, _prompter, restarted) = setup(jes());
    let mut restarted = restarted.with_store(TreeStateStore::new(dir.path().to_path_buf(), true));
    restarted.restore().await;

    assert!(restarted.state().find_session(PROFILE).is_some());
    assert_eq!(
        restarted.state().history().searches(),
        ["Owner: zowe | Prefix: ZOWE* | Status: *"]
    );
    let group = restarted.state().favorites()[0];
    let favorites = restarted.get_children(Some(group)).await;
    assert_eq!(
        labels(&restarted, &favorites),
        vec!["Owner: zowe | Prefix: ZOWE* | Status: *", "ZOWEUSR1(JOB1)"]
    );
}

#[tokio::test]
async fn favorites_of_missing_profiles_can_be_removed() {
    let dir = TempDir::new().unwrap();
    let store = TreeStateStore::new(dir.path().to_path_buf(), true);
    store
        .save_favorites(vec!["[gone]: MYJOB(JOB9){job}".to_string()])
        .unwrap();
    let (_api, prompter, provider) = setup(jes());
    let mut provider = provider.with_store(store.clone());
    provider.restore().await;
    let group = provider.state().favorites()[0];

    prompter.confirm_next(true);
    provider.get_children(Some(group)).await;

    assert!(provider.state().favorites().is_empty());
    assert!(store.load().favorites.is_empty());
}

#[tokio::test]
async fn sort_and_local_filter_reorder_without_fetching() {
    let (api, prompter, mut provider) = setup(jes());
    let session = searched_session(&mut provider, &prompter).await;

    provider
        .sort_jobs(
            session,
            NodeSort {
                method: JobSortMethod::Name,
                direction: SortDirection::Descending,
            },
        )
        .await;
    assert_eq!(
        provider.get_tree_item(provider.state().children(session)[0]).unwrap().label,
        "ZOWEUSR3(JOB3) - ABEND S0C4"
    );

    provider.filter_jobs(session, "zoweusr2").await;
    let visible = provider.get_children(Some(session)).await;
    assert_eq!(labels(&provider, &visible), vec!["ZOWEUSR2(JOB2) - ACTIVE"]);
    provider.clear_filter(session).await;
    assert_eq!(provider.state().children(session).len(), 3);
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test]
async fn console_commands_target_the_job_name() {
    let (api, prompter, mut provider) = setup(jes());
    let session = searched_session(&mut provider, &prompter).await;
    let active = provider.state().children(session)[1];

    prompter.input_next("APPL=DISPLAY");
    provider.modify_command(active).await.unwrap();
    provider.stop_command(active).await.unwrap();

    let calls = api.calls();
    assert!(calls.contains(&"command f ZOWEUSR2,APPL=DISPLAY".to_string()));
    assert!(calls.contains(&"command p ZOWEUSR2".to_string()));
    assert_eq!(
        prompter.messages().last().map(String::as_str),
        Some("Command response: ISSUED p ZOWEUSR2")
    );
    assert_eq!(provider.copy_name(active).as_deref(), Some("ZOWEUSR2(JOB2)"));
}

#[tokio::test]
async fn focus_on_job_adds_the_session_and_loads_the_job() {
    let (_api, _prompter, mut provider) = setup(jes());

    let job = provider.focus_on_job(PROFILE, "JOB3").await.unwrap();

    let session = provider.state().find_session(PROFILE).unwrap();
    assert_eq!(job, Some(provider.state().children(session)[0]));
    assert!(provider.focus_on_job("nowhere", "JOB1").await.is_err());
}

fn downloads(api: &FakeJes) -> usize {
    api.calls()
        .iter()
        .filter(|c| c.starts_with("download"))
        .count()
}

#[tokio::test(start_paused = true)]
async fn polling_a_spool_refetches_it_until_toggled_off() {
    let (api, prompter, mut provider) = setup(jes());
    let session = searched_session(&mut provider, &prompter).await;
    let job1 = provider.state().children(session)[0];
    let spool = provider.get_children(Some(job1)).await[0];
    let path = "/sestest/JOB1/JES2.JESMSGLG.2";

    provider.set_poll_interval(spool, "5000").await.unwrap();
    assert!(provider.poller().registry().contains(path));
    assert!(provider.get_tree_item(spool).unwrap().polling);
    assert_eq!(downloads(&api), 0);

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(downloads(&api), 1);

    provider.poll_data(spool).await.unwrap();
    assert!(!provider.poller().registry().contains(path));
    assert!(!provider.get_tree_item(spool).unwrap().polling);

    tokio::time::sleep(Duration::from_millis(20_000)).await;
    assert_eq!(downloads(&api), 1);

    prompter.input_next("500");
    provider.poll_data(spool).await.unwrap();
    assert_eq!(prompter.errors().last().map(String::as_str), Some(INVALID_POLL_INTERVAL));
    assert!(provider.poller().registry().is_empty());
}

#[tokio::test(start_paused = true)]
async fn live_and_favorited_spools_share_one_poll() {
    let (_api, prompter, mut provider) = setup(jes());
    let session = searched_session(&mut provider, &prompter).await;
    let job1 = provider.state().children(session)[0];
    let live = provider.get_children(Some(job1)).await[0];
    let path = "/sestest/JOB1/JES2.JESMSGLG.2";
    provider.set_poll_interval(live, "5000").await.unwrap();

    provider.add_favorite(job1).await;
    let group = provider.state().favorites()[0];
    let favorite_job = provider.get_children(Some(group)).await[0];
    let favorite = provider.get_children(Some(favorite_job)).await[0];
    assert_ne!(favorite, live);
    assert_eq!(
        provider.get_tree_item(favorite).unwrap().resource_path.as_deref(),
        Some(path)
    );
    assert!(provider.get_tree_item(favorite).unwrap().polling);

    provider.poll_data(favorite).await.unwrap();
    assert!(provider.poller().registry().is_empty());
    assert!(!provider.get_tree_item(live).unwrap().polling);
    assert!(!provider.get_tree_item(favorite).unwrap().polling);

    provider.set_poll_interval(favorite, "5000").await.unwrap();
    provider.set_poll_interval(live, "2000").await.unwrap();
    assert_eq!(provider.poller().registry().len(), 1);
    assert_eq!(
        provider.poller().registry().interval(path),
        Some(Duration::from_millis(5_000))
    );
    assert!(provider.get_tree_item(live).unwrap().polling);

    provider.poll_data(live).await.unwrap();
    assert!(provider.poller().registry().is_empty());
    assert!(!provider.get_tree_item(favorite).unwrap().polling);
}
