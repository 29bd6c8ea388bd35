use crate::{
    error::QueryError,
    model::UserIdentity,
    ports::{QueryExecutor, Row},
    query::{ChangeFeedOptions, ChangePage, SelectQuery},
};
use std::{error::Error as StdError, fmt, sync::Arc};

/// Failure raised by an extension hook.
pub type ExtensionError = Box<dyn StdError + Send + Sync>;

///
/// ExtensionContext
///
/// Read-only view of the call an extension hook runs inside.
///

pub struct ExtensionContext<'a> {
    pub acting_user: &'a UserIdentity,
    pub options: &'a ChangeFeedOptions,
    pub executor: &'a dyn QueryExecutor,
}

///
/// WatchlistExtension
///
/// Third-party hook around change-feed execution. Both hooks take their
/// input by value and return the replacement; the defaults pass it through.
///

pub trait WatchlistExtension: Send + Sync {
    fn name(&self) -> &str;

    fn before_query(
        &self,
        _ctx: &ExtensionContext<'_>,
        query: SelectQuery,
    ) -> Result<SelectQuery, ExtensionError> {
        Ok(query)
    }

    /// `page.cursor` is `None` unless the core already set one.
    fn after_query(
        &self,
        _ctx: &ExtensionContext<'_>,
        page: ChangePage,
        _rows: &[Row],
    ) -> Result<ChangePage, ExtensionError> {
        Ok(page)
    }
}

///
/// ExtensionRegistry
///
/// Extensions in registration order.
///

#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    extensions: Vec<Arc<dyn WatchlistExtension>>,
}

impl ExtensionRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            extensions: Vec::new(),
        }
    }

    pub fn register(&mut self, extension: Arc<dyn WatchlistExtension>) {
        self.extensions.push(extension);
    }

    pub(crate) fn before_query(
        &self,
        ctx: &ExtensionContext<'_>,
        query: SelectQuery,
    ) -> Result<SelectQuery, QueryError> {
        self.extensions.iter().try_fold(query, |query, extension| {
            extension
                .before_query(ctx, query)
                .map_err(|source| QueryError::extension(extension.name(), source))
        })
    }

    pub(crate) fn after_query(
        &self,
        ctx: &ExtensionContext<'_>,
        page: ChangePage,
        rows: &[Row],
    ) -> Result<ChangePage, QueryError> {
        self.extensions.iter().try_fold(page, |page, extension| {
            extension
                .after_query(ctx, page, rows)
                .map_err(|source| QueryError::extension(extension.name(), source))
        })
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.extensions.iter().map(|extension| extension.name()))
            .finish()
    }
}
