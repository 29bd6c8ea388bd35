//! Query compilation pipeline: validation, permission gating, condition
//! compilation, extension hooks and result mapping.

mod compile;
mod cursor;
mod direction;
mod extension;
mod mapper;
mod options;
mod permission;
mod request;
mod select;
mod validate;

pub use compile::{ChangeQueryCompiler, compile_watchlist};
pub use cursor::{ChangeCursor, CursorDecodeError};
pub use direction::{Direction, FeedDirection};
pub use extension::{ExtensionContext, ExtensionError, ExtensionRegistry, WatchlistExtension};
pub use mapper::ChangePage;
pub use options::{
    AuthorFilter, ChangeFeedOptions, ChangeType, ChangedFilter, TimeWindow, WatchlistOptions,
    WatchlistScope,
};
pub use permission::{
    AuthorizationError, DELETED_ACTION, DELETED_RESTRICTED, DELETED_USER, PermissionDecision,
    PermissionGate, VisibilityTier,
};
pub use request::{ChangeFeedRequest, ChangeFilter, IncludeField, WatchlistRequest};
pub use select::{
    Condition, JoinClause, JoinKind, OrderTerm, SelectField, SelectOptions, SelectQuery, TableRef,
};
pub use validate::{ValidationError, validate_change_feed, validate_watchlist};

pub(crate) use mapper::ResultMapper;
