//! Result mapping: rows to domain values, plus the outgoing cursor.


use crate::{
    error::InternalError,
    model::{ChangeEntry, ChangeInfo, PageTarget, UserIdentity, WatchedItem},
    ports::{Row, WatchedItemStore},
    query::ChangeCursor,
    value::Value,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

const CHANGE_FIELD_PREFIX: &str = "rc_";

///
/// ChangePage
///
/// One page of the change feed. `cursor` is set when more rows follow.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChangePage {
    pub items: Vec<ChangeEntry>,
    pub cursor: Option<ChangeCursor>,
}

///
/// ResultMapper
///

pub(crate) struct ResultMapper<'a> {
    store: &'a dyn WatchedItemStore,
    user: &'a UserIdentity,
}

impl<'a> ResultMapper<'a> {
    pub(crate) const fn new(store: &'a dyn WatchedItemStore, user: &'a UserIdentity) -> Self {
        Self { store, user }
    }

    /// Map change rows fetched with `row_cap` (the over-fetching limit).
    ///
    /// The first row past `row_cap - 1` is not returned; it becomes the
    /// cursor of the next page.
    pub(crate) fn map_changes(
        &self,
        rows: &[Row],
        row_cap: Option<u32>,
    ) -> Result<ChangePage, InternalError> {
        let keep = row_cap
            .map(|cap| usize::try_from(cap.saturating_sub(1)).unwrap_or(usize::MAX));
        let mut page = ChangePage::default();

        for (index, row) in rows.iter().enumerate() {
            if keep.is_some_and(|keep| index >= keep) {
                let cursor = ChangeCursor::from_row(row)?;
                debug!(
                    timestamp = %cursor.timestamp,
                    change_id = cursor.change_id,
                    "change feed continues"
                );
                page.cursor = Some(cursor);
                break;
            }

            let target = target(row, "rc_namespace", "rc_title")?;
            let item = self.watched_item(row, target);
            page.items.push((item, change_info(row)));
        }

        Ok(page)
    }

    pub(crate) fn map_watchlist(&self, rows: &[Row]) -> Result<Vec<WatchedItem>, InternalError> {
        rows.iter()
            .map(|row| {
                let target = target(row, "wl_namespace", "wl_title")?;
                Ok(self.watched_item(row, target))
            })
            .collect()
    }

    fn watched_item(&self, row: &Row, target: PageTarget) -> WatchedItem {
        let stored = row
            .get("wl_notificationtimestamp")
            .and_then(Value::render);
        let timestamp = self
            .store
            .latest_notification_timestamp(stored.as_deref(), self.user, &target);

        WatchedItem::new(self.user.clone(), target, timestamp)
    }
}

fn target(
    row: &Row,
    namespace_column: &str,
    title_column: &str,
) -> Result<PageTarget, InternalError> {
    let namespace = row
        .get(namespace_column)
        .and_then(Value::coerce_int)
        .and_then(|namespace| i32::try_from(namespace).ok())
        .ok_or_else(|| {
            InternalError::mapper_invariant(format!("row has no valid {namespace_column}"))
        })?;
    let title = row
        .get(title_column)
        .and_then(Value::render)
        .ok_or_else(|| InternalError::mapper_invariant(format!("row has no {title_column}")))?;

    Ok(PageTarget::new(namespace, title))
}

/// Keep only change columns; join and pagination helpers are dropped.
fn change_info(row: &Row) -> ChangeInfo {
    row.columns()
        .filter(|(name, _)| name.starts_with(CHANGE_FIELD_PREFIX))
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}
