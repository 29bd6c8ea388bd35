//! The public query service.

#[cfg(test)]
mod tests;

use crate::{
    error::QueryError,
    model::{UserIdentity, WatchedItem},
    ports::{
        ActorResolver, ChangeTagStore, CommentStore, ConnectionProvider, PermissionChecker,
        UserPreferences, WatchedItemStore,
    },
    query::{
        ChangeFeedRequest, ChangePage, ChangeQueryCompiler, ExtensionContext, ExtensionRegistry,
        PermissionGate, ResultMapper, WatchlistExtension, WatchlistRequest, compile_watchlist,
        validate_change_feed, validate_watchlist,
    },
    value::Value,
};
use std::sync::Arc;
use tracing::debug;
use watchfeed_config::QueryConfig;

///
/// Collaborators
///
/// Host-provided implementations of every port the service consumes.
///

#[derive(Clone)]
pub struct Collaborators {
    pub connections: Arc<dyn ConnectionProvider>,
    pub comments: Arc<dyn CommentStore>,
    pub actors: Arc<dyn ActorResolver>,
    pub tags: Arc<dyn ChangeTagStore>,
    pub permissions: Arc<dyn PermissionChecker>,
    pub preferences: Arc<dyn UserPreferences>,
    pub watched_items: Arc<dyn WatchedItemStore>,
}

///
/// WatchedItemQueryService
///
/// Read-side entry point over watched items and the changes to watched
/// pages. Each call runs one select on a read replica; nothing is retained
/// between calls.
///

#[derive(Clone)]
pub struct WatchedItemQueryService {
    deps: Collaborators,
    extensions: ExtensionRegistry,
    config: QueryConfig,
}

impl WatchedItemQueryService {
    #[must_use]
    pub fn new(deps: Collaborators, config: QueryConfig) -> Self {
        Self {
            deps,
            extensions: ExtensionRegistry::new(),
            config,
        }
    }

    /// Register an extension; hooks run in registration order.
    #[must_use]
    pub fn with_extension(mut self, extension: Arc<dyn WatchlistExtension>) -> Self {
        self.extensions.register(extension);
        self
    }

    /// Changes to the pages on a watchlist, newest or oldest first.
    ///
    /// `cursor` is the raw pair returned as `ChangePage::cursor` by the
    /// previous call; it requires a direction.
    pub fn list_changes_for_watched_pages(
        &self,
        acting_user: &UserIdentity,
        request: &ChangeFeedRequest,
        cursor: Option<&[Value]>,
    ) -> Result<ChangePage, QueryError> {
        let options = validate_change_feed(request, acting_user, cursor)?;

        let gate = PermissionGate::new(&*self.deps.permissions, &*self.deps.preferences);
        let decision = gate.decide(acting_user, &options)?;

        let executor = self.deps.connections.replica()?;
        let compiler = ChangeQueryCompiler::new(
            &*executor,
            &*self.deps.comments,
            &*self.deps.actors,
            &*self.deps.tags,
            &self.config,
        );
        let query = compiler.compile(&options, &decision)?;

        let ctx = ExtensionContext {
            acting_user,
            options: &options,
            executor: &*executor,
        };
        let query = self.extensions.before_query(&ctx, query)?;

        let rows = executor.select(&query)?;
        debug!(rows = rows.len(), "change feed rows fetched");

        let mapper = ResultMapper::new(&*self.deps.watched_items, acting_user);
        let row_cap = options.limit.map(|limit| limit.saturating_add(1));
        let page = mapper.map_changes(&rows, row_cap)?;

        self.extensions.after_query(&ctx, page, &rows)
    }

    /// Pages on the acting user's watchlist.
    ///
    /// Anonymous users have no watchlist; they get an empty list and the
    /// executor is never touched.
    pub fn list_watched_pages(
        &self,
        acting_user: &UserIdentity,
        request: &WatchlistRequest,
    ) -> Result<Vec<WatchedItem>, QueryError> {
        if !acting_user.is_registered() {
            debug!("anonymous user has no watchlist");
            return Ok(Vec::new());
        }

        let options = validate_watchlist(request)?;

        let executor = self.deps.connections.replica()?;
        let query = compile_watchlist(&*executor, &options, acting_user.id, &self.config)?;
        let rows = executor.select(&query)?;

        let items = ResultMapper::new(&*self.deps.watched_items, acting_user).map_watchlist(&rows)?;

        Ok(items)
    }
}
