//! Condition compiler: folds validated options and the permission decision
//! into a single [`SelectQuery`](crate::query::SelectQuery).

mod changes;
mod watchlist;


pub use changes::ChangeQueryCompiler;
pub use watchlist::compile_watchlist;

pub(crate) const CHANGES_TABLE: &str = "recentchanges";
pub(crate) const WATCHLIST_TABLE: &str = "watchlist";
pub(crate) const PAGE_TABLE: &str = "page";

/// `rc_type` code of log entries.
pub(crate) const LOG_CHANGE: i64 = 3;
