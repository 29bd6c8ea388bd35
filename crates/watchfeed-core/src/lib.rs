//! Core of watchfeed: compiles watchlist and change-feed options into
//! backend-portable selects, runs them through host collaborators and maps
//! the rows back into domain values.

// public exports are one module level down
pub mod error;
pub mod model;
pub mod ports;
pub mod query;
pub mod service;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Domain vocabulary and the service entry point.
///

pub mod prelude {
    pub use crate::{
        model::{ChangeInfo, PageTarget, UserIdentity, WatchedItem},
        query::{
            ChangeCursor, ChangeFeedRequest, ChangeFilter, ChangePage, Direction, FeedDirection,
            IncludeField, WatchlistRequest,
        },
        service::{Collaborators, WatchedItemQueryService},
        value::Value,
    };
}
