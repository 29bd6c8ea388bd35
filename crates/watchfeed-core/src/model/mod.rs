//! Domain values returned by the service.

mod change_info;
mod target;
mod user;
mod watched_item;


pub use change_info::ChangeInfo;
pub use target::PageTarget;
pub use user::UserIdentity;
pub use watched_item::WatchedItem;

///
/// ChangeEntry
///
/// One mapped change row: the watch that matched it and the change fields.
///

pub type ChangeEntry = (WatchedItem, ChangeInfo);
