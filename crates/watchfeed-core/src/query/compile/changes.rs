use crate::{
    error::InternalError,
    ports::{ActorResolver, BackendKind, ChangeTagStore, CommentStore, ListJoin, QueryExecutor},
    query::{
        ChangeFeedOptions, ChangeFilter, Condition, IncludeField, JoinClause, OrderTerm,
        PermissionDecision, SelectField, SelectQuery, TableRef,
        compile::{CHANGES_TABLE, LOG_CHANGE, PAGE_TABLE, WATCHLIST_TABLE},
        cursor::{change_seek_condition, window_conditions},
    },
};
use tracing::debug;
use watchfeed_config::QueryConfig;

const BASE_FIELDS: [&str; 7] = [
    "rc_id",
    "rc_namespace",
    "rc_title",
    "rc_timestamp",
    "rc_type",
    "rc_deleted",
    "wl_notificationtimestamp",
];

const ID_FIELDS: [&str; 3] = ["rc_cur_id", "rc_this_oldid", "rc_last_oldid"];

const ACTOR_FIELD: &str = "rc_user";
const COMMENT_FIELD: &str = "rc_comment";

///
/// ChangeQueryCompiler
///
/// Builds the change-feed select. Table and field contributions for actors,
/// comments and tags come from their collaborators; condition fragments are
/// rendered by the executor.
///

pub struct ChangeQueryCompiler<'a> {
    executor: &'a dyn QueryExecutor,
    comments: &'a dyn CommentStore,
    actors: &'a dyn ActorResolver,
    tags: &'a dyn ChangeTagStore,
    config: &'a QueryConfig,
}

impl<'a> ChangeQueryCompiler<'a> {
    #[must_use]
    pub const fn new(
        executor: &'a dyn QueryExecutor,
        comments: &'a dyn CommentStore,
        actors: &'a dyn ActorResolver,
        tags: &'a dyn ChangeTagStore,
        config: &'a QueryConfig,
    ) -> Self {
        Self {
            executor,
            comments,
            actors,
            tags,
            config,
        }
    }

    pub fn compile(
        &self,
        options: &ChangeFeedOptions,
        decision: &PermissionDecision,
    ) -> Result<SelectQuery, InternalError> {
        let mut query = SelectQuery::new(self.config.caller.clone());

        self.add_tables(&mut query, options);
        self.add_fields(&mut query, options)?;
        self.add_conditions(&mut query, options, decision)?;
        Self::add_options(&mut query, options);

        debug!(
            tables = query.tables.len(),
            fields = query.fields.len(),
            conditions = query.conditions.len(),
            joins = query.joins.len(),
            limit = ?query.options.limit,
            "compiled change feed query"
        );

        Ok(query)
    }

    fn add_tables(&self, query: &mut SelectQuery, options: &ChangeFeedOptions) {
        query.push_table(TableRef::new(CHANGES_TABLE));
        query.push_table(TableRef::new(WATCHLIST_TABLE));
        query.push_join(JoinClause::inner(
            WATCHLIST_TABLE,
            ["wl_namespace=rc_namespace", "wl_title=rc_title"],
        ));

        if !options.all_revisions {
            query.push_table(TableRef::new(PAGE_TABLE));
            query.push_join(JoinClause::left(PAGE_TABLE, ["rc_cur_id=page_id"]));
        }

        if options.includes(IncludeField::Comment) {
            query.merge_join(&self.comments.join(COMMENT_FIELD));
        }

        if Self::needs_actor(options) {
            query.merge_join(&self.actors.join(ACTOR_FIELD));
        }
    }

    fn needs_actor(options: &ChangeFeedOptions) -> bool {
        options.includes(IncludeField::User)
            || options.includes(IncludeField::UserId)
            || options.has_filter(ChangeFilter::Anon)
            || options.has_filter(ChangeFilter::NotAnon)
            || options.author.is_some()
    }

    fn add_fields(
        &self,
        query: &mut SelectQuery,
        options: &ChangeFeedOptions,
    ) -> Result<(), InternalError> {
        for name in BASE_FIELDS {
            query.push_field(SelectField::column(name));
        }

        let id_fields: &[&str] = match (options.used_in_generator, options.all_revisions) {
            (false, _) => &ID_FIELDS,
            (true, false) => &["rc_cur_id"],
            (true, true) => &["rc_this_oldid"],
        };
        for name in id_fields {
            query.push_field(SelectField::column(*name));
        }

        for field in &options.include {
            match field {
                IncludeField::Flags => {
                    Self::push_columns(query, &["rc_type", "rc_minor", "rc_bot"]);
                }
                IncludeField::User => self.push_actor_field(query, "rc_user_text")?,
                IncludeField::UserId => self.push_actor_field(query, "rc_user")?,
                IncludeField::Comment => {
                    for comment_field in self.comments.fields(COMMENT_FIELD) {
                        query.push_field(comment_field);
                    }
                }
                IncludeField::Patrol => {
                    Self::push_columns(query, &["rc_patrolled", "rc_log_type"]);
                }
                IncludeField::Sizes => Self::push_columns(query, &["rc_old_len", "rc_new_len"]),
                IncludeField::LogInfo => Self::push_columns(
                    query,
                    &["rc_logid", "rc_log_type", "rc_log_action", "rc_params"],
                ),
                IncludeField::Tags => query.push_field(SelectField::aliased(
                    "rc_tags",
                    self.tags.summary_subquery(CHANGES_TABLE),
                )),
            }
        }

        Ok(())
    }

    fn push_columns(query: &mut SelectQuery, names: &[&str]) {
        for name in names {
            query.push_field(SelectField::column(*name));
        }
    }

    fn push_actor_field(&self, query: &mut SelectQuery, name: &str) -> Result<(), InternalError> {
        let contribution = self.actors.join(ACTOR_FIELD);
        let field = contribution.field(name).cloned().ok_or_else(|| {
            InternalError::compiler_invariant(format!(
                "actor resolver did not provide field '{name}'"
            ))
        })?;

        query.push_field(field);

        Ok(())
    }

    fn add_conditions(
        &self,
        query: &mut SelectQuery,
        options: &ChangeFeedOptions,
        decision: &PermissionDecision,
    ) -> Result<(), InternalError> {
        let executor = self.executor;

        query.push_condition(Condition::equals("wl_user", owner_value(decision.owner_id)?));

        if !options.all_revisions {
            query.push_condition(Condition::expr(executor.make_list(
                &[
                    "rc_this_oldid=page_latest".to_string(),
                    format!("rc_type={LOG_CHANGE}"),
                ],
                ListJoin::Or,
            )));
        }

        if !options.namespaces.is_empty() {
            query.push_condition(Condition::any_of(
                "wl_namespace",
                options.namespaces.iter().copied(),
            ));
        }

        if !options.change_types.is_empty() {
            query.push_condition(Condition::any_of(
                "rc_type",
                options.change_types.iter().map(|kind| kind.code()),
            ));
        }

        for filter in &decision.filters {
            query.push_condition(self.filter_condition(*filter));
        }

        if let Some(direction) = options.direction {
            for bound in window_conditions(executor, &options.window, direction) {
                query.push_condition(Condition::Expr(bound));
            }
        }

        if self.wants_mysql_timestamp_hint(options) {
            query.push_condition(Condition::expr(format!(
                "rc_timestamp > {}",
                executor.quote("")
            )));
        }

        if let Some(author) = &options.author {
            let contribution = self
                .actors
                .where_for_user(ACTOR_FIELD, author.user_name());
            query.merge_where(contribution, author.is_negated());

            if let Some(mask) = decision.tier.author_mask() {
                query.push_condition(Condition::expr(format!(
                    "{} != {mask}",
                    executor.bit_and("rc_deleted", mask)
                )));
            }
        }

        if let Some(mask) = decision.tier.log_action_mask() {
            query.push_condition(Condition::expr(executor.make_list(
                &[
                    format!("rc_type != {LOG_CHANGE}"),
                    format!("{} != {mask}", executor.bit_and("rc_deleted", mask)),
                ],
                ListJoin::Or,
            )));
        }

        if let (Some(cursor), Some(direction)) = (&options.start_from, options.direction) {
            query.push_condition(Condition::Expr(change_seek_condition(
                executor, cursor, direction,
            )));
        }

        Ok(())
    }

    fn filter_condition(&self, filter: ChangeFilter) -> Condition {
        match filter {
            ChangeFilter::Minor => Condition::expr("rc_minor != 0"),
            ChangeFilter::NotMinor => Condition::expr("rc_minor = 0"),
            ChangeFilter::Bot => Condition::expr("rc_bot != 0"),
            ChangeFilter::NotBot => Condition::expr("rc_bot = 0"),
            ChangeFilter::Anon => Condition::Expr(self.actors.is_anonymous(ACTOR_FIELD)),
            ChangeFilter::NotAnon => Condition::Expr(self.actors.is_not_anonymous(ACTOR_FIELD)),
            ChangeFilter::Patrolled => Condition::expr("rc_patrolled != 0"),
            ChangeFilter::NotPatrolled => Condition::equals("rc_patrolled", 0_i64),
            ChangeFilter::Unread => Condition::expr("rc_timestamp >= wl_notificationtimestamp"),
            ChangeFilter::NotUnread => Condition::expr(
                "wl_notificationtimestamp IS NULL OR rc_timestamp < wl_notificationtimestamp",
            ),
        }
    }

    /// Legacy MySQL planner hint: an always-true lower bound on
    /// `rc_timestamp`, added only when the window is unbounded.
    fn wants_mysql_timestamp_hint(&self, options: &ChangeFeedOptions) -> bool {
        self.config.mysql_timestamp_hint
            && options.window.is_unbounded()
            && self.executor.backend_kind() == BackendKind::MySql
    }

    fn add_options(query: &mut SelectQuery, options: &ChangeFeedOptions) {
        if let Some(direction) = options.direction {
            let sort = direction.sort();
            query.options.order_by = vec![
                OrderTerm::new("rc_timestamp", sort),
                OrderTerm::new("rc_id", sort),
            ];
        }

        query.options.limit = options.limit.map(|limit| limit.saturating_add(1));
    }
}

/// Stored form of a watchlist owner id.
pub(crate) fn owner_value(owner_id: u64) -> Result<i64, InternalError> {
    i64::try_from(owner_id).map_err(|_| {
        InternalError::compiler_invariant(format!(
            "owner id {owner_id} exceeds the stored id range"
        ))
    })
}
