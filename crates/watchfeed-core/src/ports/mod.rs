//! Collaborator seams the service consumes.
//!
//! Everything behind these traits is owned by the host: query execution,
//! watch-state persistence, identity and comment storage, change tags and
//! the authorization policy itself.

mod auth;
mod executor;
mod stores;

pub use auth::{PermissionChecker, Right, UserPreferences};
pub use executor::{BackendKind, ConnectionProvider, ListJoin, QueryExecutor, Row};
pub use stores::{
    ActorResolver, ChangeTagStore, CommentStore, JoinContribution, WatchedItemStore,
    WhereContribution,
};
