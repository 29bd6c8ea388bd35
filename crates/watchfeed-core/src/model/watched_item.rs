use crate::model::{PageTarget, UserIdentity};
use serde::{Deserialize, Serialize};

///
/// WatchedItem
///
/// A user's subscription to one page. The notification timestamp is set
/// while the page has changes the user has not visited yet.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct WatchedItem {
    user: UserIdentity,
    target: PageTarget,
    notification_timestamp: Option<String>,
}

impl WatchedItem {
    #[must_use]
    pub const fn new(
        user: UserIdentity,
        target: PageTarget,
        notification_timestamp: Option<String>,
    ) -> Self {
        Self {
            user,
            target,
            notification_timestamp,
        }
    }

    #[must_use]
    pub const fn user(&self) -> &UserIdentity {
        &self.user
    }

    #[must_use]
    pub const fn target(&self) -> &PageTarget {
        &self.target
    }

    #[must_use]
    pub fn notification_timestamp(&self) -> Option<&str> {
        self.notification_timestamp.as_deref()
    }
}
