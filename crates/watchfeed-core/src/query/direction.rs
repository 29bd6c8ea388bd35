use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Direction
///
/// Sort direction of one ORDER BY term.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum Direction {
    #[default]
    #[display("ASC")]
    #[serde(rename = "ASC")]
    Asc,

    #[display("DESC")]
    #[serde(rename = "DESC")]
    Desc,
}

impl Direction {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }
}

///
/// FeedDirection
///
/// Chronological walk over the change feed.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedDirection {
    /// Newest first.
    #[display("older")]
    Older,

    /// Oldest first.
    #[display("newer")]
    Newer,
}

impl FeedDirection {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "older" => Some(Self::Older),
            "newer" => Some(Self::Newer),
            _ => None,
        }
    }

    /// Sort direction applied to every ordering column.
    #[must_use]
    pub const fn sort(self) -> Direction {
        match self {
            Self::Older => Direction::Desc,
            Self::Newer => Direction::Asc,
        }
    }
}
