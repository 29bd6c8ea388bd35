use crate::{
    error::InternalError,
    ports::QueryExecutor,
    query::{
        ChangedFilter, Condition, OrderTerm, SelectField, SelectQuery, TableRef,
        WatchlistOptions,
        compile::{WATCHLIST_TABLE, changes::owner_value},
        cursor::{Seek, target_seek_condition},
    },
};
use tracing::debug;
use watchfeed_config::QueryConfig;

/// Compile the plain watchlist listing of `owner_id`.
///
/// Ordering always spans `(wl_namespace, wl_title)` so seeks stay
/// consistent across namespaces.
pub fn compile_watchlist(
    executor: &dyn QueryExecutor,
    options: &WatchlistOptions,
    owner_id: u64,
    config: &QueryConfig,
) -> Result<SelectQuery, InternalError> {
    let mut query = SelectQuery::new(config.caller.clone());

    query.push_table(TableRef::new(WATCHLIST_TABLE));
    for name in ["wl_namespace", "wl_title", "wl_notificationtimestamp"] {
        query.push_field(SelectField::column(name));
    }

    query.push_condition(Condition::equals("wl_user", owner_value(owner_id)?));

    if !options.namespaces.is_empty() {
        query.push_condition(Condition::any_of(
            "wl_namespace",
            options.namespaces.iter().copied(),
        ));
    }

    if let Some(filter) = options.filter {
        query.push_condition(Condition::expr(match filter {
            ChangedFilter::Changed => "wl_notificationtimestamp IS NOT NULL",
            ChangedFilter::NotChanged => "wl_notificationtimestamp IS NULL",
        }));
    }

    if let Some(sort) = options.sort {
        let forward = Seek::continuing(sort);
        let seeks = [
            (&options.from, forward),
            (&options.until, forward.reversed()),
            (&options.start_from, forward),
        ];

        for (target, seek) in seeks {
            if let Some(target) = target {
                query.push_condition(Condition::Expr(target_seek_condition(
                    executor, target, seek,
                )));
            }
        }

        query.options.order_by = vec![
            OrderTerm::new("wl_namespace", sort),
            OrderTerm::new("wl_title", sort),
        ];
    }

    query.options.limit = options.limit;

    debug!(
        conditions = query.conditions.len(),
        limit = ?query.options.limit,
        "compiled watchlist query"
    );

    Ok(query)
}
