use crate::model::UserIdentity;
use derive_more::Display;

///
/// Right
///
/// Capabilities the service probes. The decision procedure behind them
/// belongs to the host.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Right {
    #[display("deletedhistory")]
    DeletedHistory,

    #[display("suppressrevision")]
    SuppressRevision,

    #[display("viewsuppressed")]
    ViewSuppressed,
}

///
/// PermissionChecker
///

pub trait PermissionChecker: Send + Sync {
    fn is_allowed(&self, user: &UserIdentity, right: Right) -> bool;

    fn is_allowed_any(&self, user: &UserIdentity, rights: &[Right]) -> bool {
        rights.iter().any(|right| self.is_allowed(user, *right))
    }

    /// Whether recent-changes patrolling is available to this user.
    fn uses_rc_patrol(&self, user: &UserIdentity) -> bool;

    /// Whether new-page patrolling is available to this user.
    fn uses_np_patrol(&self, user: &UserIdentity) -> bool;
}

///
/// UserPreferences
///

pub trait UserPreferences: Send + Sync {
    /// Secret token that lets others read this user's watchlist.
    fn watchlist_token(&self, user: &UserIdentity) -> Option<String>;
}
