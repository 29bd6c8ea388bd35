//! Two-field continuation cursors and the seek conditions they compile to.


use crate::{
    error::InternalError,
    model::PageTarget,
    ports::{ListJoin, QueryExecutor, Row},
    query::{Direction, FeedDirection, TimeWindow},
    value::Value,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// CursorDecodeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CursorDecodeError {
    #[error("must be a two-element array, found {found} element(s)")]
    Arity { found: usize },

    #[error("timestamp must not be null")]
    NullTimestamp,
}

///
/// ChangeCursor
///
/// Change-feed position: the timestamp and change id of the first row of
/// the next page.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ChangeCursor {
    pub timestamp: String,
    pub change_id: i64,
}

impl ChangeCursor {
    #[must_use]
    pub fn new(timestamp: impl Into<String>, change_id: i64) -> Self {
        Self {
            timestamp: timestamp.into(),
            change_id,
        }
    }

    /// Decode the raw inbound pair. The id is read tolerantly: trailing
    /// garbage after its digits is discarded and an id without digits reads
    /// as zero.
    pub fn from_raw(raw: &[Value]) -> Result<Self, CursorDecodeError> {
        let [timestamp, change_id] = raw else {
            return Err(CursorDecodeError::Arity { found: raw.len() });
        };

        let timestamp = timestamp
            .render()
            .ok_or(CursorDecodeError::NullTimestamp)?;
        let change_id = change_id.coerce_int().unwrap_or(0);

        Ok(Self {
            timestamp,
            change_id,
        })
    }

    /// Raw outbound pair, in the same order `from_raw` reads.
    #[must_use]
    pub fn to_raw(&self) -> [Value; 2] {
        [
            Value::Text(self.timestamp.clone()),
            Value::Int(self.change_id),
        ]
    }

    /// Encode the position of a fetched change row.
    pub(crate) fn from_row(row: &Row) -> Result<Self, InternalError> {
        let timestamp = row
            .get("rc_timestamp")
            .and_then(Value::render)
            .ok_or_else(|| {
                InternalError::mapper_invariant("change row is missing rc_timestamp")
            })?;
        let change_id = row
            .get("rc_id")
            .and_then(Value::coerce_int)
            .ok_or_else(|| InternalError::mapper_invariant("change row is missing rc_id"))?;

        Ok(Self {
            timestamp,
            change_id,
        })
    }
}

///
/// Seek
///
/// Which side of a position the rows must lie on, in column order.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Seek {
    Before,
    After,
}

impl Seek {
    /// Seek that continues a walk in `direction`, inclusive of the position.
    pub(crate) const fn continuing(direction: Direction) -> Self {
        match direction {
            Direction::Asc => Self::After,
            Direction::Desc => Self::Before,
        }
    }

    pub(crate) const fn reversed(self) -> Self {
        match self {
            Self::Before => Self::After,
            Self::After => Self::Before,
        }
    }

    const fn operator(self) -> &'static str {
        match self {
            Self::Before => "<",
            Self::After => ">",
        }
    }
}

///
/// SeekKey
///
/// Two-column position with literals already rendered for the backend.
///

struct SeekKey<'a> {
    primary: &'a str,
    primary_literal: String,
    secondary: &'a str,
    secondary_literal: String,
}

/// Tie-broken comparison: strictly past on the primary column, or equal on
/// it and inclusively past on the secondary one.
fn seek_condition(executor: &dyn QueryExecutor, key: &SeekKey<'_>, seek: Seek) -> String {
    let op = seek.operator();
    let tie = executor.make_list(
        &[
            format!("{} = {}", key.primary, key.primary_literal),
            format!("{} {op}= {}", key.secondary, key.secondary_literal),
        ],
        ListJoin::And,
    );

    executor.make_list(
        &[format!("{} {op} {}", key.primary, key.primary_literal), tie],
        ListJoin::Or,
    )
}

/// Condition that resumes a change-feed walk at `cursor`.
pub(crate) fn change_seek_condition(
    executor: &dyn QueryExecutor,
    cursor: &ChangeCursor,
    direction: FeedDirection,
) -> String {
    let key = SeekKey {
        primary: "rc_timestamp",
        primary_literal: executor.quote(&executor.timestamp(&cursor.timestamp)),
        secondary: "rc_id",
        secondary_literal: cursor.change_id.to_string(),
    };

    seek_condition(executor, &key, Seek::continuing(direction.sort()))
}

/// Condition that bounds a watchlist walk at `target`.
pub(crate) fn target_seek_condition(
    executor: &dyn QueryExecutor,
    target: &PageTarget,
    seek: Seek,
) -> String {
    let key = SeekKey {
        primary: "wl_namespace",
        primary_literal: target.namespace.to_string(),
        secondary: "wl_title",
        secondary_literal: executor.quote(&target.title),
    };

    seek_condition(executor, &key, seek)
}

/// Inclusive timestamp bounds of a change-feed window.
pub(crate) fn window_conditions(
    executor: &dyn QueryExecutor,
    window: &TimeWindow,
    direction: FeedDirection,
) -> Vec<String> {
    let (start_op, end_op) = match direction {
        FeedDirection::Older => ("<=", ">="),
        FeedDirection::Newer => (">=", "<="),
    };

    [(&window.start, start_op), (&window.end, end_op)]
        .into_iter()
        .filter_map(|(bound, op)| {
            bound.as_ref().map(|timestamp| {
                format!(
                    "rc_timestamp {op} {}",
                    executor.quote(&executor.timestamp(timestamp))
                )
            })
        })
        .collect()
}
