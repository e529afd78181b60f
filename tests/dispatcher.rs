mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;

use common::{file, ScriptedApi};
use winnew::api::{EditionAndLanguage, OptionsQuery, SelectOption};
use winnew::dispatch::QueryDispatcher;
use winnew::filters::{Architecture, FilterState};
use winnew::notify::{NoticeLevel, Notifier};
use winnew::ApiError;

fn dispatcher(api: &Arc<ScriptedApi>) -> (QueryDispatcher<ScriptedApi>, Notifier) {
    let notifier = Notifier::new();
    (QueryDispatcher::new(Arc::clone(api), notifier.clone()), notifier)
}

fn full_filters(system_code: &str) -> FilterState {
    FilterState {
        system_code: system_code.to_string(),
        version: "24H2".to_string(),
        language: "zh-cn".to_string(),
        edition: String::new(),
        architecture: Architecture::All,
    }
}

#[tokio::test]
async fn stale_result_is_discarded() {
    let api = Arc::new(ScriptedApi::new());
    let (dispatcher, _) = dispatcher(&api);

    let old = dispatcher.begin_filtered();
    let new = dispatcher.begin_filtered();

    assert!(dispatcher.apply_filtered(new, Ok(vec![file("10", "22H2", "new.iso")])));
    assert!(!dispatcher.apply_filtered(old, Ok(vec![file("11", "24H2", "old.iso")])));

    let files = dispatcher.filtered_files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "new.iso");
}

#[tokio::test]
async fn failure_clears_results_and_notifies() {
    let api = Arc::new(ScriptedApi::new());
    let (dispatcher, notifier) = dispatcher(&api);
    let mut notices = notifier.subscribe();

    let first = dispatcher.begin_filtered();
    dispatcher.apply_filtered(first, Ok(vec![file("11", "24H2", "a.iso")]));

    let second = dispatcher.begin_filtered();
    assert!(dispatcher.apply_filtered(second, Err(ApiError::Http { status: 502 })));

    let state = dispatcher.snapshot();
    assert!(state.filtered_files.is_empty());
    assert!(!state.is_loading_filtered);
    assert_eq!(state.error.as_deref(), Some("HTTP error! status: 502"));

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Failed to load file list: HTTP error! status: 502");
    assert_eq!(notice.duration, Duration::from_millis(3000));
}

#[tokio::test]
async fn cancellation_is_silent() {
    let api = Arc::new(ScriptedApi::new());
    let (dispatcher, notifier) = dispatcher(&api);
    let mut notices = notifier.subscribe();

    let token = dispatcher.begin_filtered();
    assert!(!dispatcher.apply_filtered(token, Err(ApiError::Cancelled)));

    assert_eq!(dispatcher.snapshot().error, None);
    assert!(matches!(notices.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn timeout_is_reported_as_failure() {
    let api = Arc::new(ScriptedApi::new());
    api.reply_files("11", Err(ApiError::Timeout(Duration::from_secs(30))));
    let (dispatcher, notifier) = dispatcher(&api);
    let mut notices = notifier.subscribe();

    dispatcher.refresh_filtered(&full_filters("11")).await;

    assert_eq!(
        dispatcher.snapshot().error.as_deref(),
        Some("request timed out after 30s")
    );
    assert_eq!(notices.try_recv().unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn incomplete_filters_cancel_in_flight_request() {
    let api = Arc::new(ScriptedApi::new());
    let reply = api.gate("11");
    let (dispatcher, notifier) = dispatcher(&api);
    let dispatcher = Arc::new(dispatcher);
    let mut notices = notifier.subscribe();

    let pending = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move { dispatcher.refresh_filtered(&full_filters("11")).await })
    };
    api.wait_for_file_queries(1).await;

    let incomplete = FilterState {
        system_code: "11".to_string(),
        ..Default::default()
    };
    dispatcher.refresh_filtered(&incomplete).await;
    pending.await.unwrap();

    // The aborted request dropped its receiver
    assert!(reply.send(Ok(vec![file("11", "24H2", "late.iso")])).is_err());

    let state = dispatcher.snapshot();
    assert!(state.filtered_files.is_empty());
    assert!(!state.is_loading_filtered);
    assert_eq!(state.error, None);
    assert_eq!(api.file_queries().len(), 1);
    assert!(matches!(notices.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn newer_query_supersedes_older() {
    let api = Arc::new(ScriptedApi::new());
    let slow = api.gate("11");
    api.reply_files("10", Ok(vec![file("10", "22H2", "win10.iso")]));
    let (dispatcher, _) = dispatcher(&api);
    let dispatcher = Arc::new(dispatcher);

    let pending = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move { dispatcher.refresh_filtered(&full_filters("11")).await })
    };
    api.wait_for_file_queries(1).await;

    dispatcher.refresh_filtered(&full_filters("10")).await;
    let _ = slow.send(Ok(vec![file("11", "24H2", "win11.iso")]));
    pending.await.unwrap();

    let files = dispatcher.filtered_files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "win10.iso");
}

#[tokio::test]
async fn architecture_all_is_omitted_from_query() {
    let api = Arc::new(ScriptedApi::new());
    let (dispatcher, _) = dispatcher(&api);

    dispatcher.refresh_filtered(&full_filters("11")).await;
    let mut filters = full_filters("11");
    filters.architecture = Architecture::Arm64;
    dispatcher.refresh_filtered(&filters).await;

    let queries = api.file_queries();
    assert_eq!(queries[0].architecture, "");
    assert_eq!(queries[1].architecture, "arm64");
}

#[tokio::test]
async fn latest_is_loaded_once() {
    let api = Arc::new(ScriptedApi::new());
    api.reply_files(
        "11",
        Ok(vec![file("11", "24H2", "w11-a.iso"), file("11", "24H2", "w11-b.iso")]),
    );
    api.reply_files("10", Ok(vec![file("10", "22H2", "w10.iso")]));
    let (dispatcher, _) = dispatcher(&api);

    dispatcher.refresh_latest().await;
    dispatcher.refresh_latest().await;

    let latest = dispatcher.snapshot().latest_files;
    let names: Vec<_> = latest.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(names, ["w11-a.iso", "w10.iso"]);

    let queries = api.file_queries();
    assert_eq!(queries.len(), 2);
    for query in &queries {
        assert_eq!(query.version, "latest");
        assert_eq!(query.language_code, "zh-cn");
        assert_eq!(query.architecture, "x64");
        assert_eq!(query.edition, "consumer");
    }
}

#[tokio::test]
async fn latest_failure_notifies_and_allows_retry() {
    let api = Arc::new(ScriptedApi::new());
    api.reply_files("10", Err(ApiError::Http { status: 500 }));
    let (dispatcher, notifier) = dispatcher(&api);
    let mut notices = notifier.subscribe();

    dispatcher.refresh_latest().await;
    assert!(dispatcher.snapshot().latest_files.is_empty());
    assert_eq!(
        notices.try_recv().unwrap().message,
        "Failed to load latest versions: HTTP error! status: 500"
    );

    api.reply_files("10", Ok(vec![file("10", "22H2", "w10.iso")]));
    dispatcher.refresh_latest().await;
    assert_eq!(dispatcher.snapshot().latest_files.len(), 1);
}

#[tokio::test]
async fn version_options_are_cached() {
    let api = Arc::new(ScriptedApi::new());
    let (dispatcher, _) = dispatcher(&api);

    assert!(dispatcher.load_version_options().await.is_some());
    assert!(dispatcher.load_version_options().await.is_some());
    assert_eq!(api.version_calls(), 1);
    assert_eq!(
        dispatcher.version_options().unwrap().versions_for("11").len(),
        2
    );
}

#[tokio::test]
async fn version_options_failure_can_be_retried() {
    let api = Arc::new(ScriptedApi::new());
    api.reply_versions(Err(ApiError::Network("offline".to_string())));
    let (dispatcher, _) = dispatcher(&api);

    assert!(dispatcher.load_version_options().await.is_none());
    api.reply_versions(Ok(common::versions()));
    assert!(dispatcher.load_version_options().await.is_some());
    assert_eq!(api.version_calls(), 2);
}

#[tokio::test]
async fn catalog_failure_leaves_empty_lists() {
    let api = Arc::new(ScriptedApi::new());
    let (dispatcher, notifier) = dispatcher(&api);
    let mut notices = notifier.subscribe();
    let query = OptionsQuery {
        system_code: "11".to_string(),
        version: "24H2".to_string(),
        ..Default::default()
    };

    dispatcher.load_edition_and_language(query.clone()).await;
    assert!(!dispatcher.edition_and_language().is_empty());

    api.reply_catalog(Err(ApiError::Http { status: 500 }));
    dispatcher.load_edition_and_language(query).await;
    assert!(dispatcher.edition_and_language().is_empty());
    assert!(!dispatcher.snapshot().is_loading_options);
    assert!(matches!(notices.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn catalog_without_version_is_reset_without_request() {
    let api = Arc::new(ScriptedApi::new());
    let (dispatcher, _) = dispatcher(&api);

    dispatcher
        .load_edition_and_language(OptionsQuery {
            system_code: "11".to_string(),
            ..Default::default()
        })
        .await;

    assert!(dispatcher.edition_and_language().is_empty());
    assert!(api.option_queries().is_empty());
}

#[tokio::test]
async fn slow_catalog_for_old_version_is_discarded() {
    let api = Arc::new(ScriptedApi::new());
    let slow = api.gate_catalog("23H2");
    let (dispatcher, _) = dispatcher(&api);
    let dispatcher = Arc::new(dispatcher);
    let query = |version: &str| OptionsQuery {
        system_code: "11".to_string(),
        version: version.to_string(),
        ..Default::default()
    };

    let pending = {
        let dispatcher = Arc::clone(&dispatcher);
        let old = query("23H2");
        tokio::spawn(async move { dispatcher.load_edition_and_language(old).await })
    };
    api.wait_for_option_queries(1).await;

    let current = EditionAndLanguage {
        language: vec![SelectOption::new("English", "en-us")],
        edition: vec![SelectOption::new("Business", "business")],
    };
    api.reply_catalog(Ok(current.clone()));
    dispatcher.load_edition_and_language(query("24H2")).await;

    let _ = slow.send(Ok(common::catalog()));
    pending.await.unwrap();

    assert_eq!(dispatcher.edition_and_language(), current);
    assert!(!dispatcher.snapshot().is_loading_options);
    let versions: Vec<_> = api.option_queries().into_iter().map(|q| q.version).collect();
    assert_eq!(versions, ["23H2", "24H2"]);
}

#[tokio::test]
async fn shutdown_aborts_in_flight_request() {
    let api = Arc::new(ScriptedApi::new());
    let mut reply = api.gate("11");
    let (dispatcher, notifier) = dispatcher(&api);
    let dispatcher = Arc::new(dispatcher);
    let mut notices = notifier.subscribe();

    let pending = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move { dispatcher.refresh_filtered(&full_filters("11")).await })
    };
    api.wait_for_file_queries(1).await;

    dispatcher.shutdown();
    pending.await.unwrap();
    tokio::time::timeout(Duration::from_secs(1), reply.closed())
        .await
        .unwrap();

    assert!(reply.send(Ok(vec![file("11", "24H2", "late.iso")])).is_err());
    let state = dispatcher.snapshot();
    assert!(state.filtered_files.is_empty());
    assert!(!state.is_loading_filtered);
    assert_eq!(state.error, None);
    assert!(matches!(notices.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn dropping_dispatcher_aborts_in_flight_request() {
    let api = Arc::new(ScriptedApi::new());
    let mut reply = api.gate("11");
    let (dispatcher, _) = dispatcher(&api);
    let dispatcher = Arc::new(dispatcher);

    let pending = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move { dispatcher.refresh_filtered(&full_filters("11")).await })
    };
    api.wait_for_file_queries(1).await;

    // Stopping the caller leaves the request task running until the
    // dispatcher itself goes away
    pending.abort();
    assert!(pending.await.unwrap_err().is_cancelled());
    assert!(!reply.is_closed());

    drop(dispatcher);
    tokio::time::timeout(Duration::from_secs(1), reply.closed())
        .await
        .unwrap();
    assert!(reply.send(Ok(vec![file("11", "24H2", "late.iso")])).is_err());
}
