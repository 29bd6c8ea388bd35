use crate::{
    model::{PageTarget, UserIdentity},
    query::{Direction, FeedDirection},
    value::Value,
};
use serde::{Deserialize, Serialize};

///
/// IncludeField
///
/// Optional field groups a change-feed caller can ask for.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeField {
    Flags,
    User,
    #[serde(rename = "userid")]
    UserId,
    Comment,
    Patrol,
    Sizes,
    #[serde(rename = "loginfo")]
    LogInfo,
    Tags,
}

///
/// ChangeFilter
///
/// Boolean row filters. Each tag has a negated counterpart and a request
/// may carry at most one member of each pair.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ChangeFilter {
    #[serde(rename = "minor")]
    Minor,
    #[serde(rename = "!minor")]
    NotMinor,
    #[serde(rename = "bot")]
    Bot,
    #[serde(rename = "!bot")]
    NotBot,
    #[serde(rename = "anon")]
    Anon,
    #[serde(rename = "!anon")]
    NotAnon,
    #[serde(rename = "patrolled")]
    Patrolled,
    #[serde(rename = "!patrolled")]
    NotPatrolled,
    #[serde(rename = "unread")]
    Unread,
    #[serde(rename = "!unread")]
    NotUnread,
}

impl ChangeFilter {
    #[must_use]
    pub const fn counterpart(self) -> Self {
        match self {
            Self::Minor => Self::NotMinor,
            Self::NotMinor => Self::Minor,
            Self::Bot => Self::NotBot,
            Self::NotBot => Self::Bot,
            Self::Anon => Self::NotAnon,
            Self::NotAnon => Self::Anon,
            Self::Patrolled => Self::NotPatrolled,
            Self::NotPatrolled => Self::Patrolled,
            Self::Unread => Self::NotUnread,
            Self::NotUnread => Self::Unread,
        }
    }

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::NotMinor => "!minor",
            Self::Bot => "bot",
            Self::NotBot => "!bot",
            Self::Anon => "anon",
            Self::NotAnon => "!anon",
            Self::Patrolled => "patrolled",
            Self::NotPatrolled => "!patrolled",
            Self::Unread => "unread",
            Self::NotUnread => "!unread",
        }
    }

    #[must_use]
    pub const fn is_patrol(self) -> bool {
        matches!(self, Self::Patrolled | Self::NotPatrolled)
    }
}

///
/// ChangeFeedRequest
///
/// Raw caller options for the change feed, as received. Loosely typed
/// members are coerced by the validator; unknown keys fail deserialization.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ChangeFeedRequest {
    pub include_fields: Vec<IncludeField>,
    pub namespace_ids: Vec<Value>,
    pub rc_types: Option<Vec<Value>>,
    pub dir: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub limit: Option<Value>,
    pub filters: Vec<ChangeFilter>,
    pub only_by_user: Option<String>,
    pub not_by_user: Option<String>,
    pub watchlist_owner: Option<serde_json::Value>,
    pub watchlist_owner_token: Option<String>,
    pub all_revisions: bool,
    pub used_in_generator: bool,
}

impl ChangeFeedRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn include(mut self, field: IncludeField) -> Self {
        self.include_fields.push(field);
        self
    }

    #[must_use]
    pub fn namespaces<I, V>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.namespace_ids = namespaces.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn change_types<I, V>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rc_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn direction(mut self, dir: FeedDirection) -> Self {
        self.dir = Some(dir.to_string());
        self
    }

    #[must_use]
    pub fn start(mut self, timestamp: impl Into<String>) -> Self {
        self.start = Some(timestamp.into());
        self
    }

    #[must_use]
    pub fn end(mut self, timestamp: impl Into<String>) -> Self {
        self.end = Some(timestamp.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: impl Into<Value>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: ChangeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn only_by(mut self, user_name: impl Into<String>) -> Self {
        self.only_by_user = Some(user_name.into());
        self
    }

    #[must_use]
    pub fn not_by(mut self, user_name: impl Into<String>) -> Self {
        self.not_by_user = Some(user_name.into());
        self
    }

    /// Read another user's watchlist with their token.
    #[must_use]
    pub fn owner(mut self, owner: &UserIdentity, token: impl Into<String>) -> Self {
        self.watchlist_owner = Some(serde_json::json!({ "id": owner.id, "name": owner.name }));
        self.watchlist_owner_token = Some(token.into());
        self
    }

    #[must_use]
    pub const fn all_revisions(mut self) -> Self {
        self.all_revisions = true;
        self
    }

    #[must_use]
    pub const fn used_in_generator(mut self) -> Self {
        self.used_in_generator = true;
        self
    }
}

///
/// WatchlistRequest
///
/// Raw caller options for the plain watchlist listing.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct WatchlistRequest {
    pub namespace_ids: Vec<Value>,
    pub sort: Option<String>,
    pub filter: Option<String>,
    pub from: Option<PageTarget>,
    pub until: Option<PageTarget>,
    pub start_from: Option<PageTarget>,
    pub limit: Option<Value>,
}

impl WatchlistRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn namespaces<I, V>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.namespace_ids = namespaces.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn sort(mut self, direction: Direction) -> Self {
        self.sort = Some(direction.to_string());
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn from_target(mut self, target: PageTarget) -> Self {
        self.from = Some(target);
        self
    }

    #[must_use]
    pub fn until_target(mut self, target: PageTarget) -> Self {
        self.until = Some(target);
        self
    }

    #[must_use]
    pub fn start_from(mut self, target: PageTarget) -> Self {
        self.start_from = Some(target);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: impl Into<Value>) -> Self {
        self.limit = Some(limit.into());
        self
    }
}
