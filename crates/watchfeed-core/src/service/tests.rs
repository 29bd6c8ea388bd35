use super::*;
use crate::{
    error::ExecutorError,
    model::{ChangeInfo, PageTarget},
    ports::{BackendKind, QueryExecutor, Row},
    query::{
        ChangeCursor, ChangeFilter, Condition, Direction, ExtensionError, FeedDirection,
        IncludeField, JoinClause, SelectField, SelectQuery, TableRef,
    },
    test_support::{
        FixedConnections, Harness, RecordingExecutor, StubPermissions, StubPreferences,
        acting_user, change_row, other_user,
    },
};
use std::{
    error::Error as StdError,
    fmt, io,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

fn service(
    harness: Harness,
) -> (
    WatchedItemQueryService,
    Arc<RecordingExecutor>,
    Arc<FixedConnections>,
) {
    let (collaborators, executor, connections) = harness.collaborators();

    (
        WatchedItemQueryService::new(collaborators, QueryConfig::default()),
        executor,
        connections,
    )
}

fn three_rows() -> Vec<Row> {
    vec![
        change_row(1, 0, "Foo1", "20151212010101"),
        change_row(2, 1, "Foo2", "20151212010102"),
        change_row(3, 1, "Foo3", "20151212010103"),
    ]
}

#[test]
fn limited_feed_returns_limit_items_and_a_cursor() {
    let (service, executor, _) = service(Harness::with_rows(BackendKind::MySql, three_rows()));
    let request = ChangeFeedRequest::new().limit(2_i64);

    let page = service
        .list_changes_for_watched_pages(&acting_user(), &request, None)
        .expect("feed query succeeds");

    assert_eq!(executor.only_select().options.limit, Some(3));
    assert_eq!(page.items.len(), 2);
    assert_eq!(
        page.cursor.as_ref().map(ChangeCursor::to_raw),
        Some([Value::from("20151212010103"), Value::from(3_i64)])
    );

    let targets: Vec<_> = page
        .items
        .iter()
        .map(|(item, _)| item.target().clone())
        .collect();
    assert_eq!(
        targets,
        vec![PageTarget::new(0, "Foo1"), PageTarget::new(1, "Foo2")]
    );

    let (item, info) = &page.items[0];
    assert_eq!(
        item,
        &WatchedItem::new(acting_user(), PageTarget::new(0, "Foo1"), None)
    );
    assert_eq!(info.get("rc_id"), Some(&Value::from(1_i64)));
    assert!(info.get("wl_notificationtimestamp").is_none());
}

#[test]
fn returned_cursor_resumes_the_next_page() {
    let (service, executor, _) = service(Harness::new(BackendKind::MySql));
    let request = ChangeFeedRequest::new()
        .direction(FeedDirection::Older)
        .limit(2_i64);
    let cursor = ChangeCursor::new("20151212010103", 3).to_raw();

    service
        .list_changes_for_watched_pages(&acting_user(), &request, Some(&cursor))
        .expect("feed query succeeds");

    let query = executor.only_select();
    assert_eq!(
        query.conditions.last(),
        Some(&Condition::expr(
            "(rc_timestamp < '20151212010103') OR \
             ((rc_timestamp = '20151212010103') AND (rc_id <= 3))"
        ))
    );
}

#[test]
fn owner_token_reads_the_owners_watchlist() {
    let harness = Harness::new(BackendKind::MySql)
        .preferences(StubPreferences::default().with_token(2, "some secret"));
    let (service, executor, _) = service(harness);
    let request = ChangeFeedRequest::new().owner(&other_user(), "some secret");

    service
        .list_changes_for_watched_pages(&acting_user(), &request, None)
        .expect("matching token is accepted");

    assert_eq!(
        executor.only_select().conditions[0],
        Condition::equals("wl_user", 2_i64)
    );
}

#[test]
fn wrong_owner_token_fails_before_any_executor_call() {
    for token in ["wrong secret", ""] {
        let harness = Harness::new(BackendKind::MySql)
            .preferences(StubPreferences::default().with_token(2, "some secret"));
        let (service, executor, connections) = service(harness);
        let request = ChangeFeedRequest::new().owner(&other_user(), token);

        let err = service
            .list_changes_for_watched_pages(&acting_user(), &request, None)
            .expect_err("token mismatch must fail");

        assert!(matches!(err, QueryError::Authorization(_)));
        assert_eq!(err.to_string(), "Incorrect watchlist token provided");
        assert_eq!(connections.handed_out(), 0);
        assert_eq!(executor.call_count(), 0);
    }
}

#[test]
fn invalid_options_fail_before_any_executor_call() {
    let (service, executor, connections) = service(Harness::new(BackendKind::MySql));
    let request = ChangeFeedRequest::new().start("20151212010101");

    let err = service
        .list_changes_for_watched_pages(&acting_user(), &request, None)
        .expect_err("start without dir is invalid");

    assert!(matches!(err, QueryError::Validation(ref err) if err.option == "dir"));
    assert_eq!(connections.handed_out(), 0);
    assert_eq!(executor.call_count(), 0);
}

#[test]
fn patrol_filters_are_silently_dropped_without_patrol_rights() {
    let harness = Harness::new(BackendKind::MySql)
        .permissions(StubPermissions::granting_all().without_patrol());
    let (service, executor, _) = service(harness);
    let request = ChangeFeedRequest::new().filter(ChangeFilter::NotPatrolled);

    service
        .list_changes_for_watched_pages(&acting_user(), &request, None)
        .expect("dropped filters are not an error");

    assert!(
        !executor
            .only_select()
            .conditions
            .contains(&Condition::equals("rc_patrolled", 0_i64))
    );
}

#[test]
fn executor_failures_surface_as_execute_errors() {
    struct Unavailable;

    impl ConnectionProvider for Unavailable {
        fn replica(&self) -> Result<Arc<dyn QueryExecutor>, ExecutorError> {
            Err(ExecutorError::with_source(
                "no replica reachable",
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            ))
        }
    }

    let (mut collaborators, _, _) = Harness::new(BackendKind::MySql).collaborators();
    collaborators.connections = Arc::new(Unavailable);
    let service = WatchedItemQueryService::new(collaborators, QueryConfig::default());

    let err = service
        .list_changes_for_watched_pages(&acting_user(), &ChangeFeedRequest::new(), None)
        .expect_err("replica is down");

    assert!(matches!(err, QueryError::Execute(_)));
    assert!(err.to_string().contains("no replica reachable"));

    let driver = err
        .source()
        .and_then(|err| err.source())
        .expect("driver error is kept as the source");
    assert_eq!(driver.to_string(), "connection refused");
}

///
/// DummyFieldExtension
///
/// Rewrites the select and decorates every mapped item.
///

#[derive(Default)]
struct DummyFieldExtension {
    saw_empty_cursor: AtomicBool,
    seen_rows: Mutex<usize>,
}

impl WatchlistExtension for DummyFieldExtension {
    fn name(&self) -> &str {
        "dummy-field"
    }

    fn before_query(
        &self,
        _ctx: &ExtensionContext<'_>,
        mut query: SelectQuery,
    ) -> Result<SelectQuery, ExtensionError> {
        query.push_table(TableRef::new("extension_dummy_table"));
        query.push_field(SelectField::column("extension_dummy_field"));
        query.push_condition(Condition::expr("extension_dummy_cond"));
        query.options.extra.push("extension_dummy_option".to_string());
        query.push_join(JoinClause::inner(
            "extension_dummy_table",
            ["extension_dummy_join_cond"],
        ));

        Ok(query)
    }

    fn after_query(
        &self,
        _ctx: &ExtensionContext<'_>,
        mut page: ChangePage,
        rows: &[Row],
    ) -> Result<ChangePage, ExtensionError> {
        self.saw_empty_cursor
            .store(page.cursor.is_none(), Ordering::SeqCst);
        *self.seen_rows.lock().expect("row count lock") = rows.len();

        for (_, info) in &mut page.items {
            info.insert("extension_dummy_field", "extension_dummy_value");
        }
        page.cursor = Some(ChangeCursor::new("20160203123456", 42));

        Ok(page)
    }
}

#[test]
fn extensions_rewrite_the_query_and_the_page() {
    let extension = Arc::new(DummyFieldExtension::default());
    let (service, executor, _) = service(Harness::with_rows(BackendKind::MySql, three_rows()));
    let service = service.with_extension(extension.clone());

    let page = service
        .list_changes_for_watched_pages(&acting_user(), &ChangeFeedRequest::new(), None)
        .expect("extension hooks succeed");

    let query = executor.only_select();
    assert!(query.has_table("extension_dummy_table"));
    assert!(query.has_field("extension_dummy_field"));
    assert_eq!(
        query.conditions.last(),
        Some(&Condition::expr("extension_dummy_cond"))
    );
    assert_eq!(query.options.extra, vec!["extension_dummy_option".to_string()]);
    assert_eq!(
        query.joins.last().map(|join| join.table.as_str()),
        Some("extension_dummy_table")
    );

    assert!(extension.saw_empty_cursor.load(Ordering::SeqCst));
    assert_eq!(*extension.seen_rows.lock().expect("row count lock"), 3);
    assert_eq!(page.items.len(), 3);
    assert!(page.items.iter().all(|(_, info)| {
        info.get("extension_dummy_field") == Some(&Value::from("extension_dummy_value"))
    }));
    assert_eq!(page.cursor, Some(ChangeCursor::new("20160203123456", 42)));
}

///
/// WideningExtension
///
/// Raises the executor limit well past what the caller asked for.
///

struct WideningExtension;

impl WatchlistExtension for WideningExtension {
    fn name(&self) -> &str {
        "widening"
    }

    fn before_query(
        &self,
        _ctx: &ExtensionContext<'_>,
        mut query: SelectQuery,
    ) -> Result<SelectQuery, ExtensionError> {
        query.options.limit = Some(50);

        Ok(query)
    }
}

#[test]
fn page_size_follows_the_requested_limit_not_the_executor_limit() {
    let (service, executor, _) = service(Harness::with_rows(BackendKind::MySql, three_rows()));
    let service = service.with_extension(Arc::new(WideningExtension));

    let request = ChangeFeedRequest::new().limit(2_i64);

    let page = service
        .list_changes_for_watched_pages(&acting_user(), &request, None)
        .expect("feed query succeeds");

    assert_eq!(executor.only_select().options.limit, Some(50));
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.cursor, Some(ChangeCursor::new("20151212010103", 3)));
}

#[derive(Debug)]
struct Refused;

impl fmt::Display for Refused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "refused")
    }
}

impl StdError for Refused {}

struct RefusingExtension;

impl WatchlistExtension for RefusingExtension {
    fn name(&self) -> &str {
        "refusing"
    }

    fn before_query(
        &self,
        _ctx: &ExtensionContext<'_>,
        _query: SelectQuery,
    ) -> Result<SelectQuery, ExtensionError> {
        Err(Box::new(Refused))
    }
}

#[test]
fn extension_failures_propagate_and_skip_execution() {
    let (service, executor, _) = service(Harness::new(BackendKind::MySql));
    let service = service.with_extension(Arc::new(RefusingExtension));

    let err = service
        .list_changes_for_watched_pages(&acting_user(), &ChangeFeedRequest::new(), None)
        .expect_err("extension refused the query");

    assert!(matches!(err, QueryError::Extension { ref extension, .. } if extension == "refusing"));
    assert_eq!(err.to_string(), "extension 'refusing' failed: refused");
    assert!(executor.selects().is_empty());
}

#[test]
fn anonymous_users_get_an_empty_watchlist_without_queries() {
    let (service, executor, connections) = service(Harness::new(BackendKind::MySql));

    let items = service
        .list_watched_pages(
            &UserIdentity::anonymous("127.0.0.1"),
            &WatchlistRequest::new(),
        )
        .expect("anonymous listing is not an error");

    assert!(items.is_empty());
    assert_eq!(connections.handed_out(), 0);
    assert_eq!(executor.call_count(), 0);
}

#[test]
fn watched_pages_map_rows_in_select_order() {
    let rows = vec![
        Row::new()
            .with("wl_namespace", 0_i64)
            .with("wl_title", "Foo1")
            .with("wl_notificationtimestamp", "20151212010101"),
        Row::new()
            .with("wl_namespace", 1_i64)
            .with("wl_title", "Foo2")
            .with("wl_notificationtimestamp", None::<&str>),
    ];
    let (service, executor, _) = service(Harness::with_rows(BackendKind::MySql, rows));
    let request = WatchlistRequest::new()
        .sort(Direction::Asc)
        .start_from(PageTarget::new(0, "SomeDbKey"))
        .limit(2_i64);

    let items = service
        .list_watched_pages(&acting_user(), &request)
        .expect("watchlist query succeeds");

    assert_eq!(
        items,
        vec![
            WatchedItem::new(
                acting_user(),
                PageTarget::new(0, "Foo1"),
                Some("20151212010101".to_string())
            ),
            WatchedItem::new(acting_user(), PageTarget::new(1, "Foo2"), None),
        ]
    );

    let query = executor.only_select();
    assert_eq!(query.tables, vec![TableRef::new("watchlist")]);
    assert_eq!(query.options.limit, Some(2));
    assert_eq!(
        query.conditions[1],
        Condition::expr(
            "(wl_namespace > 0) OR ((wl_namespace = 0) AND (wl_title >= 'SomeDbKey'))"
        )
    );
}

#[test]
fn invalid_watchlist_options_name_the_option() {
    let (service, executor, _) = service(Harness::new(BackendKind::MySql));

    let err = service
        .list_watched_pages(
            &acting_user(),
            &WatchlistRequest::new().until_target(PageTarget::new(0, "SomeDbKey")),
        )
        .expect_err("until without sort is invalid");

    assert!(matches!(err, QueryError::Validation(ref err) if err.option == "sort"));
    assert_eq!(executor.call_count(), 0);
}

#[test]
fn requested_fields_survive_mapping() {
    let rows = vec![
        change_row(1, 0, "Foo1", "20151212010101")
            .with("rc_minor", 1_i64)
            .with("rc_bot", 0_i64),
    ];
    let (service, _, _) = service(Harness::with_rows(BackendKind::Postgres, rows));
    let request = ChangeFeedRequest::new().include(IncludeField::Flags);

    let page = service
        .list_changes_for_watched_pages(&acting_user(), &request, None)
        .expect("feed query succeeds");

    let expected: ChangeInfo = [
        ("rc_bot", Value::from(0_i64)),
        ("rc_cur_id", Value::from(1_i64)),
        ("rc_deleted", Value::from(0_i64)),
        ("rc_id", Value::from(1_i64)),
        ("rc_last_oldid", Value::from(0_i64)),
        ("rc_minor", Value::from(1_i64)),
        ("rc_namespace", Value::from(0_i64)),
        ("rc_this_oldid", Value::from(1_i64)),
        ("rc_timestamp", Value::from("20151212010101")),
        ("rc_title", Value::from("Foo1")),
        ("rc_type", Value::from(0_i64)),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value))
    .collect();
    assert_eq!(page.items[0].1, expected);
}
