use crate::{
    model::{PageTarget, UserIdentity},
    query::{ChangeCursor, ChangeFilter, Direction, FeedDirection, IncludeField},
};
use derive_more::Display;
use std::collections::BTreeSet;

///
/// ChangeType
///
/// Kinds of change events and their stored `rc_type` codes.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ChangeType {
    #[display("edit")]
    Edit,

    #[display("new")]
    New,

    #[display("log")]
    Log,

    #[display("external")]
    External,

    #[display("categorize")]
    Categorize,
}

impl ChangeType {
    pub const ALL: [Self; 5] = [
        Self::Edit,
        Self::New,
        Self::Log,
        Self::External,
        Self::Categorize,
    ];

    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Edit => 0,
            Self::New => 1,
            Self::Log => 3,
            Self::External => 5,
            Self::Categorize => 6,
        }
    }

    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

///
/// TimeWindow
///
/// Inclusive timestamp bounds, interpreted relative to the feed direction:
/// `start` is where the walk begins, `end` where it stops.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TimeWindow {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl TimeWindow {
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

///
/// AuthorFilter
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuthorFilter {
    OnlyBy(String),
    NotBy(String),
}

impl AuthorFilter {
    #[must_use]
    pub fn user_name(&self) -> &str {
        match self {
            Self::OnlyBy(name) | Self::NotBy(name) => name,
        }
    }

    #[must_use]
    pub const fn is_negated(&self) -> bool {
        matches!(self, Self::NotBy(_))
    }
}

///
/// WatchlistScope
///
/// Whose watchlist is read: the acting user's own, or another user's
/// claimed with their token.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WatchlistScope {
    Own(UserIdentity),
    Claimed { owner: UserIdentity, token: String },
}

impl WatchlistScope {
    #[must_use]
    pub const fn owner(&self) -> &UserIdentity {
        match self {
            Self::Own(owner) | Self::Claimed { owner, .. } => owner,
        }
    }
}

///
/// ChangeFeedOptions
///
/// Validated change-feed options. Every combination reachable here
/// compiles to a consistent query.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangeFeedOptions {
    pub include: BTreeSet<IncludeField>,
    pub namespaces: BTreeSet<i32>,
    pub change_types: BTreeSet<ChangeType>,
    pub direction: Option<FeedDirection>,
    pub window: TimeWindow,
    pub limit: Option<u32>,
    pub filters: BTreeSet<ChangeFilter>,
    pub author: Option<AuthorFilter>,
    pub scope: WatchlistScope,
    pub all_revisions: bool,
    pub used_in_generator: bool,
    pub start_from: Option<ChangeCursor>,
}

impl ChangeFeedOptions {
    /// Options with nothing requested beyond the base feed of `owner`.
    #[must_use]
    pub const fn for_owner(owner: UserIdentity) -> Self {
        Self {
            include: BTreeSet::new(),
            namespaces: BTreeSet::new(),
            change_types: BTreeSet::new(),
            direction: None,
            window: TimeWindow {
                start: None,
                end: None,
            },
            limit: None,
            filters: BTreeSet::new(),
            author: None,
            scope: WatchlistScope::Own(owner),
            all_revisions: false,
            used_in_generator: false,
            start_from: None,
        }
    }

    #[must_use]
    pub fn includes(&self, field: IncludeField) -> bool {
        self.include.contains(&field)
    }

    #[must_use]
    pub fn has_filter(&self, filter: ChangeFilter) -> bool {
        self.filters.contains(&filter)
    }
}

///
/// ChangedFilter
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ChangedFilter {
    #[display("changed")]
    Changed,

    #[display("!changed")]
    NotChanged,
}

impl ChangedFilter {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "changed" => Some(Self::Changed),
            "!changed" => Some(Self::NotChanged),
            _ => None,
        }
    }
}

///
/// WatchlistOptions
///
/// Validated options for the plain watchlist listing.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WatchlistOptions {
    pub namespaces: BTreeSet<i32>,
    pub sort: Option<Direction>,
    pub filter: Option<ChangedFilter>,
    pub from: Option<PageTarget>,
    pub until: Option<PageTarget>,
    pub start_from: Option<PageTarget>,
    pub limit: Option<u32>,
}
