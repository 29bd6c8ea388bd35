//! Option validation and normalization.
//!
//! Every check here runs before any condition is built, so a request that
//! passes always compiles to a consistent query.


use crate::{
    model::UserIdentity,
    query::{
        AuthorFilter, ChangeCursor, ChangeFeedOptions, ChangeFeedRequest, ChangeFilter,
        ChangeType, ChangedFilter, Direction, FeedDirection, TimeWindow, WatchlistOptions,
        WatchlistRequest, WatchlistScope,
    },
    value::Value,
};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;

///
/// ValidationError
///
/// Rejected request option, named by its camelCase key.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("bad value for option '{option}': {reason}")]
pub struct ValidationError {
    pub option: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(option: &'static str, reason: impl Into<String>) -> Self {
        Self {
            option,
            reason: reason.into(),
        }
    }
}

/// Validate a change-feed request and the raw cursor that came with it.
///
/// Without an owner claim the feed reads `acting_user`'s own watchlist.
pub fn validate_change_feed(
    request: &ChangeFeedRequest,
    acting_user: &UserIdentity,
    cursor: Option<&[Value]>,
) -> Result<ChangeFeedOptions, ValidationError> {
    let change_types = match &request.rc_types {
        Some(raw) => change_types(raw)?,
        None => BTreeSet::new(),
    };

    let direction = request
        .dir
        .as_deref()
        .map(|raw| {
            FeedDirection::parse(raw)
                .ok_or_else(|| ValidationError::new("dir", "must be 'older' or 'newer'"))
        })
        .transpose()?;

    let positioned = request.start.is_some() || request.end.is_some() || cursor.is_some();
    if positioned && direction.is_none() {
        return Err(ValidationError::new(
            "dir",
            "must be provided when 'start', 'end' or a cursor is given",
        ));
    }

    let start_from = cursor
        .map(|raw| {
            ChangeCursor::from_raw(raw)
                .map_err(|err| ValidationError::new("cursor", err.to_string()))
        })
        .transpose()?;

    let scope = watchlist_scope(request, acting_user)?;
    let filters = filters(request)?;
    let author = author(request)?;

    Ok(ChangeFeedOptions {
        include: request.include_fields.iter().copied().collect(),
        namespaces: namespaces(&request.namespace_ids),
        change_types,
        direction,
        window: TimeWindow {
            start: request.start.clone(),
            end: request.end.clone(),
        },
        limit: request.limit.as_ref().map(limit),
        filters,
        author,
        scope,
        all_revisions: request.all_revisions,
        used_in_generator: request.used_in_generator,
        start_from,
    })
}

/// Validate a plain watchlist request.
pub fn validate_watchlist(request: &WatchlistRequest) -> Result<WatchlistOptions, ValidationError> {
    let sort = request
        .sort
        .as_deref()
        .map(|raw| {
            Direction::parse(raw)
                .ok_or_else(|| ValidationError::new("sort", "must be 'ASC' or 'DESC'"))
        })
        .transpose()?;

    let filter = request
        .filter
        .as_deref()
        .map(|raw| {
            ChangedFilter::parse(raw)
                .ok_or_else(|| ValidationError::new("filter", "must be 'changed' or '!changed'"))
        })
        .transpose()?;

    let seeks = request.from.is_some() || request.until.is_some() || request.start_from.is_some();
    if seeks && sort.is_none() {
        return Err(ValidationError::new(
            "sort",
            "must be provided when 'from', 'until' or 'startFrom' is given",
        ));
    }

    Ok(WatchlistOptions {
        namespaces: namespaces(&request.namespace_ids),
        sort,
        filter,
        from: request.from.clone(),
        until: request.until.clone(),
        start_from: request.start_from.clone(),
        limit: request.limit.as_ref().map(limit),
    })
}

fn change_types(raw: &[Value]) -> Result<BTreeSet<ChangeType>, ValidationError> {
    raw.iter()
        .map(|value| {
            value
                .exact_int()
                .and_then(ChangeType::from_code)
                .ok_or_else(|| {
                    ValidationError::new(
                        "rcTypes",
                        format!(
                            "'{value}' is not a change type; expected one of {}",
                            ChangeType::ALL
                                .iter()
                                .map(|kind| format!("{kind}({})", kind.code()))
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    )
                })
        })
        .collect()
}

/// Integer namespaces; members without a numeric prefix or outside the
/// namespace range are dropped.
fn namespaces(raw: &[Value]) -> BTreeSet<i32> {
    raw.iter()
        .filter_map(Value::coerce_int)
        .filter_map(|namespace| i32::try_from(namespace).ok())
        .collect()
}

/// Non-negative row limit; no numeric prefix reads as zero.
fn limit(raw: &Value) -> u32 {
    let value = raw.coerce_int().unwrap_or(0).max(0);

    u32::try_from(value).unwrap_or(u32::MAX)
}

fn watchlist_scope(
    request: &ChangeFeedRequest,
    acting_user: &UserIdentity,
) -> Result<WatchlistScope, ValidationError> {
    match (&request.watchlist_owner, &request.watchlist_owner_token) {
        (None, None) => Ok(WatchlistScope::Own(acting_user.clone())),
        (Some(_), None) => Err(ValidationError::new(
            "watchlistOwnerToken",
            "must be provided when 'watchlistOwner' is given",
        )),
        (None, Some(_)) => Err(ValidationError::new(
            "watchlistOwner",
            "must be provided when 'watchlistOwnerToken' is given",
        )),
        (Some(owner), Some(token)) => {
            let owner = serde_json::from_value::<UserIdentity>(owner.clone()).map_err(|err| {
                ValidationError::new("watchlistOwner", format!("must be a user identity: {err}"))
            })?;

            Ok(WatchlistScope::Claimed {
                owner,
                token: token.clone(),
            })
        }
    }
}

fn filters(request: &ChangeFeedRequest) -> Result<BTreeSet<ChangeFilter>, ValidationError> {
    let filters: BTreeSet<_> = request.filters.iter().copied().collect();

    if let Some(filter) = filters
        .iter()
        .find(|filter| filters.contains(&filter.counterpart()))
    {
        return Err(ValidationError::new(
            "filters",
            format!(
                "'{}' and '{}' are mutually exclusive",
                filter.tag(),
                filter.counterpart().tag()
            ),
        ));
    }

    Ok(filters)
}

fn author(request: &ChangeFeedRequest) -> Result<Option<AuthorFilter>, ValidationError> {
    match (&request.only_by_user, &request.not_by_user) {
        (Some(_), Some(_)) => Err(ValidationError::new(
            "notByUser",
            "cannot be combined with 'onlyByUser'",
        )),
        (Some(name), None) => Ok(Some(AuthorFilter::OnlyBy(name.clone()))),
        (None, Some(name)) => Ok(Some(AuthorFilter::NotBy(name.clone()))),
        (None, None) => Ok(None),
    }
}
