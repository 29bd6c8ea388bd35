//! In-memory collaborators for unit tests.

use crate::{
    error::ExecutorError,
    model::{PageTarget, UserIdentity},
    ports::{
        ActorResolver, BackendKind, ChangeTagStore, CommentStore, ConnectionProvider,
        JoinContribution, ListJoin, PermissionChecker, QueryExecutor, Right, Row,
        UserPreferences, WatchedItemStore, WhereContribution,
    },
    query::{JoinClause, SelectField, SelectQuery, TableRef},
    service::Collaborators,
};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

///
/// RecordingExecutor
///
/// Renders fragments the way a MySQL-flavoured backend would, returns canned
/// rows and records every select it receives.
///

pub struct RecordingExecutor {
    backend: BackendKind,
    rows: Vec<Row>,
    selects: Mutex<Vec<SelectQuery>>,
    calls: AtomicUsize,
}

impl RecordingExecutor {
    pub fn new(backend: BackendKind) -> Self {
        Self::with_rows(backend, Vec::new())
    }

    pub fn with_rows(backend: BackendKind, rows: Vec<Row>) -> Self {
        Self {
            backend,
            rows,
            selects: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn selects(&self) -> Vec<SelectQuery> {
        self.selects.lock().expect("select log lock").clone()
    }

    pub fn only_select(&self) -> SelectQuery {
        let mut selects = self.selects();
        assert_eq!(selects.len(), 1, "expected exactly one select");
        selects.remove(0)
    }

    /// Every executor method invocation, rendering helpers included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl QueryExecutor for RecordingExecutor {
    fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, ExecutorError> {
        self.touch();
        self.selects
            .lock()
            .expect("select log lock")
            .push(query.clone());

        Ok(self.rows.clone())
    }

    fn make_list(&self, parts: &[String], join: ListJoin) -> String {
        self.touch();
        parts
            .iter()
            .map(|part| format!("({part})"))
            .collect::<Vec<_>>()
            .join(&format!(" {join} "))
    }

    fn quote(&self, value: &str) -> String {
        self.touch();
        format!("'{value}'")
    }

    fn timestamp(&self, value: &str) -> String {
        self.touch();
        value.to_string()
    }

    fn bit_and(&self, column: &str, mask: u32) -> String {
        self.touch();
        format!("({column} & {mask})")
    }

    fn backend_kind(&self) -> BackendKind {
        self.touch();
        self.backend
    }
}

///
/// FixedConnections
///

pub struct FixedConnections {
    executor: Arc<RecordingExecutor>,
    handed_out: AtomicUsize,
}

impl FixedConnections {
    pub fn new(executor: Arc<RecordingExecutor>) -> Self {
        Self {
            executor,
            handed_out: AtomicUsize::new(0),
        }
    }

    pub fn handed_out(&self) -> usize {
        self.handed_out.load(Ordering::SeqCst)
    }
}

impl ConnectionProvider for FixedConnections {
    fn replica(&self) -> Result<Arc<dyn QueryExecutor>, ExecutorError> {
        self.handed_out.fetch_add(1, Ordering::SeqCst);
        Ok(self.executor.clone())
    }
}

///
/// StubComments
///

pub struct StubComments;

impl CommentStore for StubComments {
    fn join(&self, field: &str) -> JoinContribution {
        let alias = format!("comment_{field}");

        JoinContribution {
            tables: vec![TableRef::aliased(alias.clone(), "comment")],
            fields: vec![
                SelectField::aliased(format!("{field}_text"), format!("{alias}.comment_text")),
                SelectField::aliased(format!("{field}_data"), format!("{alias}.comment_data")),
                SelectField::aliased(format!("{field}_cid"), format!("{alias}.comment_id")),
            ],
            joins: vec![JoinClause::inner(
                alias.clone(),
                [format!("{alias}.comment_id = {field}_id")],
            )],
        }
    }
}

///
/// StubActors
///

pub struct StubActors;

pub const ACTOR_ALIAS: &str = "actor_rc_user";

impl ActorResolver for StubActors {
    fn join(&self, field: &str) -> JoinContribution {
        JoinContribution {
            tables: vec![TableRef::aliased(ACTOR_ALIAS, "actor")],
            fields: vec![
                SelectField::aliased(field, format!("{ACTOR_ALIAS}.actor_user")),
                SelectField::aliased(format!("{field}_text"), format!("{ACTOR_ALIAS}.actor_name")),
                SelectField::column("rc_actor"),
            ],
            joins: vec![JoinClause::inner(
                ACTOR_ALIAS,
                [format!("{ACTOR_ALIAS}.actor_id = rc_actor")],
            )],
        }
    }

    fn where_for_user(&self, _field: &str, user_name: &str) -> WhereContribution {
        WhereContribution {
            tables: vec![TableRef::aliased(ACTOR_ALIAS, "actor")],
            condition: format!("{ACTOR_ALIAS}.actor_name = '{user_name}'"),
            joins: vec![JoinClause::inner(
                ACTOR_ALIAS,
                [format!("{ACTOR_ALIAS}.actor_id = rc_actor")],
            )],
        }
    }

    fn is_anonymous(&self, _field: &str) -> String {
        format!("{ACTOR_ALIAS}.actor_user IS NULL")
    }

    fn is_not_anonymous(&self, _field: &str) -> String {
        format!("{ACTOR_ALIAS}.actor_user IS NOT NULL")
    }
}

///
/// StubTags
///

pub struct StubTags;

impl ChangeTagStore for StubTags {
    fn summary_subquery(&self, table: &str) -> String {
        format!("(SELECT GROUP_CONCAT(ct_tag) FROM change_tag WHERE ct_rc_id = {table}.rc_id)")
    }
}

///
/// StubPermissions
///
/// Grants everything except the listed rights; patrol availability is a
/// single switch.
///

#[derive(Default)]
pub struct StubPermissions {
    denied: Vec<Right>,
    no_patrol: bool,
}

impl StubPermissions {
    pub fn granting_all() -> Self {
        Self::default()
    }

    pub fn denying(rights: &[Right]) -> Self {
        Self {
            denied: rights.to_vec(),
            no_patrol: false,
        }
    }

    pub fn without_patrol(mut self) -> Self {
        self.no_patrol = true;
        self
    }
}

impl PermissionChecker for StubPermissions {
    fn is_allowed(&self, _user: &UserIdentity, right: Right) -> bool {
        !self.denied.contains(&right)
    }

    fn uses_rc_patrol(&self, _user: &UserIdentity) -> bool {
        !self.no_patrol
    }

    fn uses_np_patrol(&self, _user: &UserIdentity) -> bool {
        !self.no_patrol
    }
}

///
/// StubPreferences
///

#[derive(Default)]
pub struct StubPreferences {
    tokens: HashMap<u64, String>,
}

impl StubPreferences {
    pub fn with_token(mut self, user_id: u64, token: &str) -> Self {
        self.tokens.insert(user_id, token.to_string());
        self
    }
}

impl UserPreferences for StubPreferences {
    fn watchlist_token(&self, user: &UserIdentity) -> Option<String> {
        self.tokens.get(&user.id).cloned()
    }
}

///
/// PassthroughWatchStore
///

pub struct PassthroughWatchStore;

impl WatchedItemStore for PassthroughWatchStore {
    fn latest_notification_timestamp(
        &self,
        timestamp: Option<&str>,
        _user: &UserIdentity,
        _target: &PageTarget,
    ) -> Option<String> {
        timestamp.map(str::to_string)
    }
}

pub fn acting_user() -> UserIdentity {
    UserIdentity::new(1, "MockUser")
}

pub fn other_user() -> UserIdentity {
    UserIdentity::new(2, "Other User")
}

///
/// Harness
///
/// Service collaborators wired around one recording executor.
///

pub struct Harness {
    pub executor: Arc<RecordingExecutor>,
    pub connections: Arc<FixedConnections>,
    pub permissions: StubPermissions,
    pub preferences: StubPreferences,
}

impl Harness {
    pub fn new(backend: BackendKind) -> Self {
        Self::with_rows(backend, Vec::new())
    }

    pub fn with_rows(backend: BackendKind, rows: Vec<Row>) -> Self {
        let executor = Arc::new(RecordingExecutor::with_rows(backend, rows));

        Self {
            connections: Arc::new(FixedConnections::new(executor.clone())),
            executor,
            permissions: StubPermissions::granting_all(),
            preferences: StubPreferences::default(),
        }
    }

    pub fn permissions(mut self, permissions: StubPermissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn preferences(mut self, preferences: StubPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Hand the collaborators over; the executor and connection handles stay
    /// with the caller for assertions.
    pub fn collaborators(
        self,
    ) -> (Collaborators, Arc<RecordingExecutor>, Arc<FixedConnections>) {
        let collaborators = Collaborators {
            connections: self.connections.clone(),
            comments: Arc::new(StubComments),
            actors: Arc::new(StubActors),
            tags: Arc::new(StubTags),
            permissions: Arc::new(self.permissions),
            preferences: Arc::new(self.preferences),
            watched_items: Arc::new(PassthroughWatchStore),
        };

        (collaborators, self.executor, self.connections)
    }
}

/// Change row with every column the base feed selects.
pub fn change_row(id: i64, namespace: i32, title: &str, timestamp: &str) -> Row {
    Row::new()
        .with("rc_id", id)
        .with("rc_namespace", namespace)
        .with("rc_title", title)
        .with("rc_timestamp", timestamp)
        .with("rc_type", 0_i64)
        .with("rc_deleted", 0_i64)
        .with("rc_cur_id", id)
        .with("rc_this_oldid", id)
        .with("rc_last_oldid", id - 1)
        .with("wl_notificationtimestamp", None::<&str>)
}
